//! # umbra_scene - Scene Session
//!
//! Coordinates readiness for one mounted scene:
//!
//! - [`LoadingGate`]: two monotonic inputs (assets loaded, scene ready) and
//!   one debounced output (`is_loading`)
//! - [`SceneSession`]: owns the tracker, the ready signal and the gate from
//!   mount to teardown; [`SceneSession::frame`] is the scheduling turn
//! - [`SceneConfig`]: timings and pipeline options, from JSON and env
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Instant;
//! use umbra_scene::prelude::*;
//!
//! let mut session = SceneSession::mount(SceneConfig::default(), Instant::now());
//! let tracker = session.tracker();        // hand to the asset loader
//! let ready = session.ready_signal();     // hand to the render loop
//!
//! loop {
//!     let loading = session.frame(Instant::now());
//!     // show or hide the loader overlay
//! }
//! ```

pub mod config;
pub mod gate;
pub mod session;

pub use config::{ConfigError, SceneConfig};
pub use gate::{GatePhase, GateReport, GateTimings, LoadingGate, ReadinessState, SettledCallback};
pub use session::SceneSession;

/// Prelude
pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::gate::{GateReport, LoadingGate, ReadinessState};
    pub use crate::session::SceneSession;
}
