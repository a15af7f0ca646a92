//! # umbra_core - Umbra Core
//!
//! Small shared primitives used by every other crate in the workspace:
//! - **Identifiers**: subscriber IDs handed out by registries
//! - **Listeners**: ordered, identity-deduplicated callback lists
//! - **Subscriptions**: idempotent unsubscribe tokens
//!
//! Nothing in here knows about assets, frames or effects.

pub mod id;
pub mod listener;

pub use id::*;
pub use listener::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::{IdGenerator, SubscriberId};
    pub use crate::listener::{ListenerList, Subscription, Unsubscribe};
}
