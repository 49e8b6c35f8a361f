//! Fan-out of appended events to external subscribers.
//!
//! Delivery is fire-and-forget. A subscriber that fails is dropped from the
//! list; the remaining subscribers and the append path are unaffected.
//! Delivery runs outside the subscriber lock, so a subscriber may call back
//! into the broadcaster. It still runs on the ingest path and should not block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::combat_log::CombatEvent;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriberError {
    #[error("subscriber channel closed")]
    Closed,

    #[error("subscriber rejected event: {0}")]
    Rejected(String),
}

/// Receives every event appended to the log.
pub trait EventSubscriber: Send + Sync {
    fn deliver(&self, event: &Arc<CombatEvent>) -> Result<(), SubscriberError>;
}

impl EventSubscriber for mpsc::UnboundedSender<Arc<CombatEvent>> {
    fn deliver(&self, event: &Arc<CombatEvent>) -> Result<(), SubscriberError> {
        self.send(Arc::clone(event))
            .map_err(|_| SubscriberError::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Default)]
pub struct Broadcaster {
    subscribers: Mutex<Vec<(SubscriberId, Arc<dyn EventSubscriber>)>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, subscriber: Box<dyn EventSubscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::from(subscriber)));
        tracing::debug!(subscriber = %id, "Subscriber added");
        id
    }

    /// Register an unbounded channel and hand back its receiving end.
    pub fn subscribe_channel(&self) -> (SubscriberId, mpsc::UnboundedReceiver<Arc<CombatEvent>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.add(Box::new(tx)), rx)
    }

    /// Returns false if the id was not registered.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Offer `event` to every subscriber, pruning any that fail.
    /// Returns the number of successful deliveries.
    pub fn publish(&self, event: &Arc<CombatEvent>) -> usize {
        let targets = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if targets.is_empty() {
            tracing::trace!("No subscribers for combat event");
            return 0;
        }

        let mut failed = Vec::new();
        for (id, subscriber) in &targets {
            if let Err(e) = subscriber.deliver(event) {
                tracing::debug!(subscriber = %id, error = %e, "Dropping subscriber");
                failed.push(*id);
            }
        }
        if !failed.is_empty() {
            self.subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| !failed.contains(id));
        }
        targets.len() - failed.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
