//! Integration tests for umbra_asset

use std::sync::Arc;

use parking_lot::Mutex;
use umbra_asset::prelude::*;

#[test]
fn test_ratio_non_decreasing_for_monotonic_progress() {
    for total in 1..=12u32 {
        let tracker = AssetLoadTracker::new();
        let mut last = tracker.current_ratio();

        for loaded in 0..=total {
            tracker.progress(format!("/asset-{}.glb", loaded), loaded, total);
            let ratio = tracker.current_ratio();
            assert!((0.0..=1.0).contains(&ratio));
            assert!(ratio >= last, "ratio dropped from {} to {} at {}/{}", last, ratio, loaded, total);
            last = ratio;
        }

        assert_eq!(last, 1.0);
        assert!(tracker.is_complete());
    }
}

#[test]
fn test_loader_sequence_for_scene_assets() {
    let tracker = AssetLoadTracker::new();
    let urls = ["/models/prism.glb", "/textures/lensflare.png", "/lut/F-6800-STD.cube"];

    for url in urls {
        tracker.start(url);
    }
    for (i, url) in urls.iter().enumerate() {
        tracker.progress(*url, i as u32 + 1, urls.len() as u32);
    }
    tracker.complete();

    let kinds: Vec<_> = tracker.records().iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&AssetKind::Model));
    assert!(kinds.contains(&AssetKind::Texture));
    assert!(kinds.contains(&AssetKind::Lut));
    assert!(!tracker.is_errored());
}

#[test]
fn test_failure_does_not_stop_other_loads() {
    let tracker = AssetLoadTracker::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    tracker.subscribe(move |event| {
        sink.lock().push(event.url().map(str::to_string));
    });

    tracker.start("/a.glb");
    tracker.start("/b.cube");
    tracker.error("/b.cube");
    tracker.progress("/a.glb", 1, 2);
    tracker.complete();

    assert_eq!(tracker.failed_urls(), vec!["/b.cube".to_string()]);
    assert_eq!(tracker.record("/b.cube").map(|r| r.state), Some(LoadState::Failed));
    assert_eq!(tracker.record("/a.glb").map(|r| r.state), Some(LoadState::Loaded));

    let seen = seen.lock();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[2].as_deref(), Some("/b.cube"));
    assert_eq!(seen[4], None);
}

#[test]
fn test_shared_handler_registered_once() {
    let tracker = AssetLoadTracker::new();
    let count = Arc::new(Mutex::new(0u32));
    let c = Arc::clone(&count);
    let handler: Arc<umbra_asset::LoadHandler> = Arc::new(move |_: &LoadEvent| *c.lock() += 1);

    tracker.subscribe_shared(Arc::clone(&handler));
    tracker.subscribe_shared(handler);
    tracker.start("/a.glb");

    assert_eq!(tracker.handler_count(), 1);
    assert_eq!(*count.lock(), 1);
}
