//! Notifications module
//!
//! Observable events of the client: one "sending" and one "sent" event per
//! synchronization phase, plus a failure event for every remote operation
//! that did not succeed.
//!
//! # Usage
//! ```ignore
//! use oicp_cpo::notifications::create_event_bus;
//!
//! let event_bus = create_event_bus();
//! let mut subscriber = event_bus.subscribe();
//!
//! while let Some(message) = subscriber.recv().await {
//!     println!("{}: {:?}", message.event.event_type(), message.event.tracking_id());
//! }
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
