use crate::app_state::AppState;
use limitbreak_core::CombatEvent;
use limitbreak_types::formatting::format_thousands;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Subscribe to the tracker and print every appended event until the
/// tracker is replaced or the task is aborted.
pub async fn start_watcher(state: Arc<RwLock<AppState>>) -> JoinHandle<()> {
    let mut events = {
        let s = state.read().await;
        s.tracker.subscribe()
    };

    println!("Watching combat events");

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", describe(&event));
        }
        tracing::debug!("Event watcher stopped");
    })
}

/// One-line description of an event for the terminal.
pub fn describe(event: &CombatEvent) -> String {
    let time = event.timestamp().format("%H:%M:%S%.3f");
    match event {
        CombatEvent::Damage(d) => {
            let mut flags = String::new();
            if d.is_critical {
                flags.push('!');
            }
            if d.is_direct_hit {
                flags.push('*');
            }
            format!(
                "[{time}] {} -> {} {} ({}) {}{flags} {}",
                d.source_name.as_deref().unwrap_or(&d.source_id),
                d.target_name.as_deref().unwrap_or(&d.target_id),
                d.action_name,
                d.action_id,
                format_thousands(d.damage),
                d.damage_type,
            )
        }
        CombatEvent::Heal(h) => format!(
            "[{time}] {} -> {} {} ({}) +{} (overheal {})",
            h.source_name.as_deref().unwrap_or(&h.source_id),
            h.target_name.as_deref().unwrap_or(&h.target_id),
            h.action_name,
            h.action_id,
            format_thousands(h.heal_amount),
            format_thousands(h.overheal_amount),
        ),
        CombatEvent::Status(s) => format!(
            "[{time}] {} {} {} ({}) x{} {:.1}s",
            s.target_name.as_deref().unwrap_or(&s.target_id),
            if s.is_applied { "gains" } else { "loses" },
            s.status_name,
            s.status_id,
            s.stack_count,
            s.duration,
        ),
    }
}
