//! End-to-end readiness tests driving a session frame by frame

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use umbra_asset::LoadError;
use umbra_scene::prelude::*;

const FRAME: Duration = Duration::from_millis(16);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Drives a session on a synthetic clock
struct Harness {
    session: SceneSession,
    now: Instant,
    history: Vec<(Instant, bool)>,
}

impl Harness {
    fn new(config: SceneConfig) -> Self {
        init_logging();
        let now = Instant::now();
        Self {
            session: SceneSession::mount(config, now),
            now,
            history: Vec::new(),
        }
    }

    fn frame(&mut self) -> bool {
        self.now += FRAME;
        let loading = self.session.frame(self.now);
        self.history.push((self.now, loading));
        loading
    }

    fn frame_at(&mut self, at: Instant) -> bool {
        self.now = at;
        let loading = self.session.frame(at);
        self.history.push((at, loading));
        loading
    }

    fn frames(&mut self, n: usize) {
        for _ in 0..n {
            self.frame();
        }
    }

    fn dismissed_at(&self) -> Option<Instant> {
        self.history.iter().find(|(_, loading)| !loading).map(|(t, _)| *t)
    }

    fn assert_never_reverts(&self) {
        let mut dismissed = false;
        for (_, loading) in &self.history {
            if dismissed {
                assert!(!loading, "loader came back after dismissal");
            }
            dismissed |= !loading;
        }
    }
}

#[test]
fn test_three_assets_then_first_frame() {
    let mut h = Harness::new(SceneConfig::default());
    let settle = h.session.config().settle_delay();
    let tracker = h.session.tracker();
    let signal = h.session.ready_signal();

    for (i, url) in ["/models/a.glb", "/textures/b.png", "/fonts/c.json"].iter().enumerate() {
        tracker.start(*url);
        h.frame();
        tracker.progress(*url, i as u32 + 1, 3);
        h.frame();
    }
    let assets_at = h.now;
    assert!(h.session.is_loading());
    assert!(h.session.gate().state().assets_loaded);

    h.frames(20);
    assert!(h.session.is_loading(), "dismissed before the first frame");

    signal.signal_ready();
    h.frame();
    let ready_at = h.now;
    assert!(ready_at > assets_at);

    h.frames(20);
    let dismissed = h.dismissed_at().expect("loader never dismissed");
    assert!(dismissed >= ready_at + settle);
    assert!(dismissed <= ready_at + settle + FRAME);
    assert_eq!(h.session.progress_ratio(), 1.0);
    h.assert_never_reverts();
}

#[test]
fn test_first_frame_then_assets() {
    let mut h = Harness::new(SceneConfig::default());
    let settle = h.session.config().settle_delay();
    let tracker = h.session.tracker();

    tracker.start("/models/scene.glb");
    h.session.ready_signal().signal_ready();
    h.frames(30);
    assert!(h.session.is_loading(), "dismissed before assets loaded");

    tracker.progress("/models/scene.glb", 1, 1);
    h.frame();
    let assets_at = h.now;

    h.frames(20);
    let dismissed = h.dismissed_at().expect("loader never dismissed");
    assert!(dismissed >= assets_at + settle);
    assert!(dismissed <= assets_at + settle + FRAME);
    h.assert_never_reverts();
}

#[test]
fn test_no_assets_uses_grace_timeout() {
    let mut h = Harness::new(SceneConfig::default());
    let mounted = h.now;
    h.session.ready_signal().signal_ready();

    h.frames(60);
    let dismissed = h.dismissed_at().expect("loader never dismissed");
    let config = h.session.config();
    assert!(dismissed >= mounted + config.grace_timeout() + config.settle_delay());
    assert!(h.session.gate().is_indeterminate());
    h.assert_never_reverts();
}

#[test]
fn test_slow_first_frame_still_debounces() {
    let mut h = Harness::new(SceneConfig::default());
    let mounted = h.now;
    let ms = Duration::from_millis;

    h.session.ready_signal().signal_ready();
    assert!(h.frame_at(mounted + ms(800)), "dismissed in the frame that saw readiness");
    assert!(h.session.gate().state().assets_loaded);
    assert_eq!(h.session.gate().settle_deadline(), Some(mounted + ms(950)));

    assert!(h.frame_at(mounted + ms(949)));
    assert!(!h.frame_at(mounted + ms(950)));
    h.assert_never_reverts();
}

#[test]
fn test_failed_asset_dismisses_degraded() {
    let mut h = Harness::new(SceneConfig::default());
    let tracker = h.session.tracker();
    let reports = Arc::new(AtomicUsize::new(0));

    let r = reports.clone();
    h.session.on_settled(move |report| {
        assert!(report.is_degraded());
        assert!(report.forced);
        assert!(!report.state.scene_ready);
        r.fetch_add(1, Ordering::SeqCst);
    });

    tracker.start("/lut/missing.cube");
    tracker.error_with("/lut/missing.cube", LoadError::NotFound("/lut/missing.cube".into()));

    h.frames(30);
    assert!(!h.session.is_loading());
    assert_eq!(h.session.gate().failed_urls(), ["/lut/missing.cube".to_string()]);
    assert_eq!(reports.load(Ordering::SeqCst), 1);
    h.assert_never_reverts();
}

#[test]
fn test_late_subscriber_to_ready_signal() {
    let mut h = Harness::new(SceneConfig::default());
    let signal = h.session.ready_signal();
    signal.signal_ready();
    h.frame();

    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    signal.subscribe(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    h.frames(3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_settle_delay_from_json() {
    let config = SceneConfig::from_json(r#"{ "settle_delay_ms": 0 }"#).unwrap();
    let mut h = Harness::new(config);
    let tracker = h.session.tracker();

    tracker.start("/a.glb");
    tracker.complete();
    h.session.ready_signal().signal_ready();

    assert!(!h.frame());
    h.assert_never_reverts();
}
