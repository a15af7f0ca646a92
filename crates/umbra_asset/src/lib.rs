//! # umbra_asset - Asset Load Tracking
//!
//! Wraps the loader infrastructure's per-item callbacks into one aggregate
//! progress value:
//! - Typed load events instead of reassignable `on_*` callback slots
//! - Multiple independent subscribers
//! - Per-URL records, including failures
//!
//! ## Example
//!
//! ```ignore
//! use umbra_asset::prelude::*;
//!
//! let tracker = AssetLoadTracker::new();
//! let sub = tracker.subscribe(|event: &LoadEvent| log::info!("{:?}", event));
//!
//! // Driven by the loader
//! tracker.start("/models/prism.glb");
//! tracker.progress("/models/prism.glb", 1, 3);
//!
//! assert!(tracker.current_ratio() > 0.3);
//! ```

pub mod error;
pub mod progress;
pub mod tracker;

pub use error::LoadError;
pub use progress::{AssetKind, AssetRecord, LoadEvent, LoadProgress, LoadState};
pub use tracker::{AssetLoadTracker, LoadHandler};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::error::LoadError;
    pub use crate::progress::{AssetKind, LoadEvent, LoadProgress, LoadState};
    pub use crate::tracker::AssetLoadTracker;
}
