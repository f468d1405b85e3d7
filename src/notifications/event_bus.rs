//! Broadcast bus carrying synchronization and failure events
//!
//! Publishing never blocks and never fails, whether or not anyone listens.
//! A subscriber that falls more than the channel capacity behind skips the
//! oldest events and keeps a count of what it missed.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::broadcast;

use super::events::{Event, EventMessage};

/// Room for the events of several synchronization runs.
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: Event) {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let tracking_id = message.event.tracking_id();

        // `send` only fails when nobody is subscribed
        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(
            "Event {} published: tracking_id={:?}, subscribers={}",
            event_type, tracking_id, delivered
        );
    }

    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
    missed: u64,
}

impl EventSubscriber {
    /// Wait for the next event. `None` once every publisher is gone and the
    /// backlog is empty.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(count)) => self.lagged(count),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next already published event without waiting.
    pub fn try_recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(count)) => self.lagged(count),
                Err(_) => return None,
            }
        }
    }

    /// Everything published so far and not yet received, oldest first.
    pub fn drain(&mut self) -> Vec<EventMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Events skipped because this subscriber fell behind.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    fn lagged(&mut self, count: u64) {
        self.missed += count;
        warn!("Event subscriber lagged, {} events missed", count);
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}
