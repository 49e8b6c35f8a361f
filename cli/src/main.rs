use clap::{Parser, Subcommand};
use limitbreak_cli::app_state::AppState;
use limitbreak_cli::commands;
use limitbreak_cli::readline;
use limitbreak_core::EventKind;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

const DEFAULT_EVENT_LIMIT: usize = 20;

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If LIMITBREAK_LOG_PATH is set, append to that file instead of stderr
    if let Ok(path) = std::env::var("LIMITBREAK_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();
    let state = Arc::new(RwLock::new(AppState::new()));

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, Arc::clone(&state)).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "limitbreak combat tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reload definitions and overrides (defaults to the configured directories)
    Load {
        #[arg(short, long)]
        definitions: Option<PathBuf>,
        #[arg(short, long)]
        overrides: Option<PathBuf>,
    },
    Damage {
        #[arg(short, long)]
        json: String,
    },
    Heal {
        #[arg(short, long)]
        json: String,
    },
    Status {
        #[arg(short, long)]
        json: String,
    },
    Simulate {
        #[arg(short, long, default_value_t = 100)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print appended events as they arrive (run again to stop)
    Watch,
    Stats {
        #[arg(short, long)]
        combatant: Option<String>,
        #[arg(short, long)]
        window: Option<u64>,
    },
    Healing {
        #[arg(short, long)]
        combatant: String,
        #[arg(short, long)]
        window: Option<u64>,
    },
    Events {
        #[arg(short, long)]
        kind: Option<EventKind>,
        #[arg(short, long, default_value_t = DEFAULT_EVENT_LIMIT)]
        limit: usize,
    },
    Summary,
    Skill {
        #[arg(short, long)]
        id: String,
    },
    Effect {
        #[arg(short, long)]
        id: String,
    },
    Search {
        #[arg(short, long)]
        keyword: String,
    },
    Jobs {
        #[arg(short, long)]
        name: Option<String>,
    },
    Info,
    Exit,
}

async fn respond(line: &str, state: Arc<RwLock<AppState>>) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "limitbreak".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Load {
            definitions,
            overrides,
        }) => commands::load(definitions.as_deref(), overrides.as_deref(), state).await,
        Some(Commands::Damage { json }) => commands::inject(EventKind::Damage, json, state).await,
        Some(Commands::Heal { json }) => commands::inject(EventKind::Heal, json, state).await,
        Some(Commands::Status { json }) => commands::inject(EventKind::Status, json, state).await,
        Some(Commands::Simulate { count, seed }) => commands::simulate(*count, *seed, state).await,
        Some(Commands::Watch) => commands::watch(state).await,
        Some(Commands::Stats { combatant, window }) => {
            commands::show_stats(combatant.as_deref(), *window, state).await
        }
        Some(Commands::Healing { combatant, window }) => {
            commands::show_healing(combatant, *window, state).await
        }
        Some(Commands::Events { kind, limit }) => commands::show_events(*kind, *limit, state).await,
        Some(Commands::Summary) => commands::show_summary(state).await,
        Some(Commands::Skill { id }) => commands::show_skill(id, state).await,
        Some(Commands::Effect { id }) => commands::show_effect(id, state).await,
        Some(Commands::Search { keyword }) => commands::search(keyword, state).await,
        Some(Commands::Jobs { name }) => commands::show_jobs(name.as_deref(), state).await,
        Some(Commands::Info) => commands::show_info(state).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
