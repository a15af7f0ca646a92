//! Loading gate
//!
//! Two monotonic inputs, one debounced output:
//!
//! ```text
//!   assets_loaded ─┐
//!                  ├─ both true (or a load error) ─► Settling ─ settle delay ─► Settled
//!   scene_ready  ──┘
//! ```
//!
//! `assets_loaded` also turns true when the grace timeout elapses without any
//! load having started. Once `Settled`, the gate never goes back.
//!
//! The gate never reads a clock. Every transition takes the `Instant` at which
//! its input was observed, and [`LoadingGate::update`] advances the timers.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use umbra_asset::{LoadEvent, LoadProgress};
use umbra_core::{ListenerList, Subscription, Unsubscribe};

/// Default time to wait for the first load before treating assets as loaded
pub const DEFAULT_GRACE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default delay between readiness and hiding the loader
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Gate timer settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateTimings {
    /// How long to wait for a first load before assuming there is none
    pub grace_timeout: Duration,
    /// How long to keep the loader up after the gate opens
    pub settle_delay: Duration,
}

impl Default for GateTimings {
    fn default() -> Self {
        Self {
            grace_timeout: DEFAULT_GRACE_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// The two gate inputs. Each only ever goes from `false` to `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadinessState {
    pub assets_loaded: bool,
    pub scene_ready: bool,
}

impl ReadinessState {
    /// Both inputs are true
    pub fn is_satisfied(&self) -> bool {
        self.assets_loaded && self.scene_ready
    }
}

/// Where the gate is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePhase {
    /// Waiting for inputs
    Waiting,
    /// Inputs satisfied or dismissal forced; loader hides at `deadline`
    Settling { deadline: Instant },
    /// Loader dismissed
    Settled { at: Instant },
}

/// Snapshot handed to settled callbacks
#[derive(Clone, Debug, PartialEq)]
pub struct GateReport {
    /// Inputs at the moment the gate settled
    pub state: ReadinessState,
    /// A load error dismissed the loader
    pub forced: bool,
    /// Assets that failed to load
    pub failed_urls: Vec<String>,
    /// Last progress snapshot seen
    pub progress: LoadProgress,
    /// When the gate settled
    pub settled_at: Instant,
}

impl GateReport {
    /// The scene is shown with missing assets
    pub fn is_degraded(&self) -> bool {
        !self.failed_urls.is_empty()
    }
}

/// Settled callback
pub type SettledCallback = dyn Fn(&GateReport) + Send + Sync;

/// Decides when the loader overlay goes away
pub struct LoadingGate {
    timings: GateTimings,
    mounted_at: Instant,
    state: ReadinessState,
    assets_loaded_at: Option<Instant>,
    scene_ready_at: Option<Instant>,
    forced_at: Option<Instant>,
    phase: GatePhase,
    load_started: bool,
    indeterminate: bool,
    forced: bool,
    progress: LoadProgress,
    failed_urls: Vec<String>,
    report: Option<GateReport>,
    listeners: Arc<Mutex<ListenerList<SettledCallback>>>,
}

impl LoadingGate {
    /// Create a gate for a scene mounted at `mounted_at`
    pub fn new(timings: GateTimings, mounted_at: Instant) -> Self {
        Self {
            timings,
            mounted_at,
            state: ReadinessState::default(),
            assets_loaded_at: None,
            scene_ready_at: None,
            forced_at: None,
            phase: GatePhase::Waiting,
            load_started: false,
            indeterminate: true,
            forced: false,
            progress: LoadProgress::default(),
            failed_urls: Vec::new(),
            report: None,
            listeners: Arc::new(Mutex::new(ListenerList::new())),
        }
    }

    /// Feed one tracker event observed at `now`
    pub fn observe(&mut self, event: &LoadEvent, now: Instant) {
        self.progress = event.progress().clone();

        match event {
            LoadEvent::Started { .. } => {
                self.load_started = true;
            }
            LoadEvent::Progress { progress, .. } => {
                self.load_started = true;
                self.indeterminate = false;
                if progress.is_complete() {
                    self.mark_assets_loaded(now);
                }
            }
            LoadEvent::Completed { .. } => {
                self.load_started = true;
                self.indeterminate = false;
                self.mark_assets_loaded(now);
            }
            LoadEvent::Failed { url, error, .. } => {
                self.load_started = true;
                self.indeterminate = false;
                log::warn!("Asset failed, scene will be shown degraded: {} ({})", url, error);
                if !self.failed_urls.iter().any(|u| u == url) {
                    self.failed_urls.push(url.clone());
                }
                if !self.forced {
                    self.forced = true;
                    self.forced_at = Some(now);
                    self.arm();
                }
            }
        }
    }

    /// The first frame has been presented
    pub fn mark_scene_ready(&mut self, now: Instant) {
        if self.state.scene_ready {
            return;
        }
        self.state.scene_ready = true;
        self.scene_ready_at = Some(now);
        log::debug!("Scene ready after {:?}", now.saturating_duration_since(self.mounted_at));
        self.arm();
    }

    /// Advance timers. Returns `true` on the call that settles the gate.
    pub fn update(&mut self, now: Instant) -> bool {
        if let GatePhase::Settled { .. } = self.phase {
            return false;
        }

        let grace_deadline = self.mounted_at + self.timings.grace_timeout;
        if !self.load_started && !self.state.assets_loaded && now >= grace_deadline {
            log::info!(
                "No asset load started within {:?}, treating assets as loaded",
                self.timings.grace_timeout
            );
            self.mark_assets_loaded(grace_deadline);
        }

        match self.phase {
            GatePhase::Settling { deadline } if now >= deadline => {
                self.settle(now);
                true
            }
            _ => false,
        }
    }

    /// Call `callback` once when the gate settles.
    ///
    /// On an already settled gate the callback runs immediately and the
    /// returned subscription is inert.
    pub fn on_settled<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&GateReport) + Send + Sync + 'static,
    {
        if let Some(report) = &self.report {
            callback(report);
            return Subscription::inert();
        }

        let listener: Arc<SettledCallback> = Arc::new(callback);
        let id = self.listeners.lock().insert(listener);
        let weak: Weak<dyn Unsubscribe> = Arc::downgrade(&self.listeners) as Weak<dyn Unsubscribe>;
        Subscription::new(id, weak)
    }

    /// Whether the loader overlay should be shown
    pub fn is_loading(&self) -> bool {
        !matches!(self.phase, GatePhase::Settled { .. })
    }

    /// Current inputs
    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Current phase
    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// When the loader will hide, once the gate is settling
    pub fn settle_deadline(&self) -> Option<Instant> {
        match self.phase {
            GatePhase::Settling { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Tracker ratio as last observed, in `[0, 1]`
    pub fn progress_ratio(&self) -> f32 {
        self.progress.ratio()
    }

    /// Last observed progress snapshot
    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    /// No progress has been reported yet
    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    /// At least one asset failed
    pub fn is_degraded(&self) -> bool {
        !self.failed_urls.is_empty()
    }

    /// Assets that failed, in failure order
    pub fn failed_urls(&self) -> &[String] {
        &self.failed_urls
    }

    /// A load error is dismissing the loader regardless of scene readiness
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// Report produced when the gate settled
    pub fn report(&self) -> Option<&GateReport> {
        self.report.as_ref()
    }

    /// Number of pending settled callbacks
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn mark_assets_loaded(&mut self, at: Instant) {
        if self.state.assets_loaded {
            return;
        }
        self.state.assets_loaded = true;
        self.assets_loaded_at = Some(at);
        log::debug!("Assets loaded after {:?}", at.saturating_duration_since(self.mounted_at));
        self.arm();
    }

    /// Start the settle timer from the later of the two inputs, or from the
    /// first failure when dismissal is forced
    fn arm(&mut self) {
        if self.phase != GatePhase::Waiting {
            return;
        }

        let opened_at = match (self.assets_loaded_at, self.scene_ready_at) {
            (Some(assets), Some(ready)) => Some(assets.max(ready)),
            _ => self.forced_at,
        };

        if let Some(opened_at) = opened_at {
            let deadline = opened_at + self.timings.settle_delay;
            log::debug!("Loading gate open, loader hides in {:?}", self.timings.settle_delay);
            self.phase = GatePhase::Settling { deadline };
        }
    }

    fn settle(&mut self, now: Instant) {
        self.phase = GatePhase::Settled { at: now };

        let report = GateReport {
            state: self.state,
            forced: self.forced,
            failed_urls: self.failed_urls.clone(),
            progress: self.progress.clone(),
            settled_at: now,
        };

        if report.is_degraded() {
            log::warn!("Loader dismissed with {} failed asset(s)", report.failed_urls.len());
        } else {
            log::info!(
                "Loader dismissed after {:?}",
                now.saturating_duration_since(self.mounted_at)
            );
        }

        self.report = Some(report.clone());

        let listeners = self.listeners.lock().snapshot();
        for (id, listener) in listeners {
            if self.listeners.lock().remove(id) {
                listener(&report);
            }
        }
    }
}

impl std::fmt::Debug for LoadingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingGate")
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("forced", &self.forced)
            .field("failed_urls", &self.failed_urls)
            .finish()
    }
}
