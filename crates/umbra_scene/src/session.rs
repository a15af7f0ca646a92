//! Scene session
//!
//! One session per mounted scene. It owns the asset tracker, the ready
//! signal and the loading gate, and wires them together on every
//! [`frame`](SceneSession::frame):
//!
//! 1. deliver replayed ready callbacks
//! 2. forward tracker events to the gate, oldest first
//! 3. forward scene readiness
//! 4. advance the gate timers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use umbra_asset::AssetLoadTracker;
use umbra_core::Subscription;
use umbra_event::SceneReadySignal;
use umbra_render::{EffectChainConfig, LutResolver, RenderPipelineConfig};

use crate::config::SceneConfig;
use crate::gate::{GateReport, LoadingGate};

/// Readiness coordination for one mounted scene
pub struct SceneSession {
    config: SceneConfig,
    tracker: Arc<AssetLoadTracker>,
    signal: SceneReadySignal,
    gate: LoadingGate,
    ready_flag: Arc<AtomicBool>,
    ready_subscription: Subscription,
    torn_down: bool,
}

impl SceneSession {
    /// Mount a scene at `now`
    pub fn mount(config: SceneConfig, now: Instant) -> Self {
        let tracker = Arc::new(AssetLoadTracker::new());
        let signal = SceneReadySignal::new();
        let gate = LoadingGate::new(config.timings(), now);

        let ready_flag = Arc::new(AtomicBool::new(false));
        let flag = ready_flag.clone();
        let ready_subscription = signal.subscribe(move || {
            flag.store(true, Ordering::Release);
        });

        log::debug!(
            "Scene mounted (grace {:?}, settle {:?})",
            config.grace_timeout(),
            config.settle_delay()
        );

        Self {
            config,
            tracker,
            signal,
            gate,
            ready_flag,
            ready_subscription,
            torn_down: false,
        }
    }

    /// Tracker to hand to the asset loader
    pub fn tracker(&self) -> Arc<AssetLoadTracker> {
        self.tracker.clone()
    }

    /// Signal to hand to the render loop
    pub fn ready_signal(&self) -> SceneReadySignal {
        self.signal.clone()
    }

    /// Run one scheduling turn. Returns whether the loader should be shown.
    pub fn frame(&mut self, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }

        self.signal.process();

        for event in self.tracker.drain_events() {
            self.gate.observe(&event, now);
        }

        if self.ready_flag.load(Ordering::Acquire) {
            self.gate.mark_scene_ready(now);
        }

        self.gate.update(now);
        self.gate.is_loading()
    }

    /// Whether the loader should be shown
    pub fn is_loading(&self) -> bool {
        !self.torn_down && self.gate.is_loading()
    }

    /// Loader progress in `[0, 1]`
    pub fn progress_ratio(&self) -> f32 {
        self.gate.progress_ratio()
    }

    /// The loading gate
    pub fn gate(&self) -> &LoadingGate {
        &self.gate
    }

    /// Call `callback` once when the loader is dismissed
    pub fn on_settled<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&GateReport) + Send + Sync + 'static,
    {
        self.gate.on_settled(callback)
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Build the post-processing chain from the configured options
    pub fn build_pipeline<R: LutResolver>(&self, resolver: R) -> EffectChainConfig {
        RenderPipelineConfig::new(resolver).build(&self.config.pipeline)
    }

    /// Build the post-processing chain with lookup tables read from disk
    pub fn build_default_pipeline(&self) -> EffectChainConfig {
        self.build_pipeline(self.config.lut_resolver())
    }

    /// Check if the session has been torn down
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release subscriptions and dispose the ready signal. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.ready_subscription.unsubscribe();
        self.signal.dispose();
        log::debug!("Scene torn down");
    }
}

impl Drop for SceneSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for SceneSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSession")
            .field("gate", &self.gate)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
