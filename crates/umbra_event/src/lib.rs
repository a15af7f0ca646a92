//! # umbra_event - Scene Events
//!
//! - [`SceneReadySignal`]: one-shot, replay-safe "first frame presented" event
//! - [`EventChannel`]: ordered queue for a single event type, drained once per frame
//!
//! Everything here is driven from the render thread. Locks are never held
//! while user callbacks run, so callbacks may subscribe or unsubscribe freely.

pub mod ready;
pub mod channel;

pub use ready::{ReadyCallback, SceneReadySignal};
pub use channel::EventChannel;
pub use umbra_core::{SubscriberId, Subscription};

/// Prelude
pub mod prelude {
    pub use crate::{EventChannel, ReadyCallback, SceneReadySignal, SubscriberId, Subscription};
}
