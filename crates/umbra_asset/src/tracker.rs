//! Asset load tracker
//!
//! The loader infrastructure calls, per asset and in order: [`start`],
//! zero or more [`progress`], then one of [`complete`] or [`error`]. The
//! tracker assumes that order but tolerates deviations: progress never moves
//! backwards and `items_loaded` never exceeds `items_total`.
//!
//! Every call records state first, then queues a [`LoadEvent`] and notifies
//! subscribers, so handlers always observe settled state.
//!
//! [`start`]: AssetLoadTracker::start
//! [`progress`]: AssetLoadTracker::progress
//! [`complete`]: AssetLoadTracker::complete
//! [`error`]: AssetLoadTracker::error

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use umbra_core::{ListenerList, Subscription, Unsubscribe};
use umbra_event::EventChannel;

use crate::error::LoadError;
use crate::progress::{AssetRecord, LoadEvent, LoadProgress, LoadState};

/// Load event handler
pub type LoadHandler = dyn Fn(&LoadEvent) + Send + Sync;

#[derive(Default)]
struct TrackerState {
    progress: LoadProgress,
    started: bool,
    completed: bool,
    errored: bool,
    records: BTreeMap<String, AssetRecord>,
}

/// Aggregates asynchronous asset loads into one progress value
pub struct AssetLoadTracker {
    state: Mutex<TrackerState>,
    handlers: Arc<Mutex<ListenerList<LoadHandler>>>,
    events: EventChannel<LoadEvent>,
}

impl AssetLoadTracker {
    /// Create an idle tracker
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            handlers: Arc::new(Mutex::new(ListenerList::new())),
            events: EventChannel::new(),
        }
    }

    /// A request for `url` started
    pub fn start(&self, url: impl Into<String>) {
        let url = url.into();
        let progress = {
            let mut state = self.state.lock();
            state.started = true;
            if !state.records.contains_key(&url) {
                state.records.insert(url.clone(), AssetRecord::loading(url.clone()));
                // A newly discovered request grows the total
                if state.progress.items_total < state.records.len() as u32 {
                    state.progress.items_total = state.records.len() as u32;
                }
            }
            state.progress.current_url = url.clone();
            state.progress.clone()
        };

        log::debug!("Asset load started: {} ({}/{})", url, progress.items_loaded, progress.items_total);
        self.publish(LoadEvent::Started { url, progress });
    }

    /// The loader finished `items_loaded` of `items_total` items; `url` is the
    /// one that just finished
    pub fn progress(&self, url: impl Into<String>, items_loaded: u32, items_total: u32) {
        let url = url.into();
        let progress = {
            let mut state = self.state.lock();
            state.started = true;

            let record = state
                .records
                .entry(url.clone())
                .or_insert_with(|| AssetRecord::loading(url.clone()));
            if record.state == LoadState::Loading {
                record.state = LoadState::Loaded;
            }

            let p = &mut state.progress;
            p.items_total = p.items_total.max(items_total);
            p.items_loaded = p.items_loaded.max(items_loaded).min(p.items_total);
            p.current_url = url.clone();
            p.clone()
        };

        log::trace!("Asset progress: {} ({}/{})", url, progress.items_loaded, progress.items_total);
        self.publish(LoadEvent::Progress { url, progress });
    }

    /// The loader reports every queued item finished
    pub fn complete(&self) {
        let progress = {
            let mut state = self.state.lock();
            state.completed = true;
            let total = state.progress.items_total;
            state.progress.items_loaded = total;
            for record in state.records.values_mut() {
                if record.state == LoadState::Loading {
                    record.state = LoadState::Loaded;
                }
            }
            state.progress.clone()
        };

        log::info!("Asset loading complete ({} item(s))", progress.items_total);
        self.publish(LoadEvent::Completed { progress });
    }

    /// `url` failed. Recorded, never raised.
    pub fn error(&self, url: impl Into<String>) {
        let url = url.into();
        let reason = LoadError::Unspecified(url.clone());
        self.error_with(url, reason);
    }

    /// `url` failed with a known reason
    pub fn error_with(&self, url: impl Into<String>, error: LoadError) {
        let url = url.into();
        let progress = {
            let mut state = self.state.lock();
            state.started = true;
            state.errored = true;

            let record = state
                .records
                .entry(url.clone())
                .or_insert_with(|| AssetRecord::loading(url.clone()));
            record.state = LoadState::Failed;
            record.error = Some(error.clone());

            if state.progress.items_total < state.records.len() as u32 {
                state.progress.items_total = state.records.len() as u32;
            }
            state.progress.current_url = url.clone();
            state.progress.clone()
        };

        log::warn!("Asset failed to load: {} ({})", url, error);
        self.publish(LoadEvent::Failed { url, error, progress });
    }

    /// `items_loaded / max(1, items_total)`, clamped to `[0, 1]`
    pub fn current_ratio(&self) -> f32 {
        self.state.lock().progress.ratio()
    }

    /// Snapshot of the aggregate progress
    pub fn progress_snapshot(&self) -> LoadProgress {
        self.state.lock().progress.clone()
    }

    /// Any request has started
    pub fn has_started(&self) -> bool {
        self.state.lock().started
    }

    /// Every discovered item finished, or the loader said so
    pub fn is_complete(&self) -> bool {
        let state = self.state.lock();
        state.completed || state.progress.is_complete()
    }

    /// Any item failed
    pub fn is_errored(&self) -> bool {
        self.state.lock().errored
    }

    /// URLs that failed, in URL order
    pub fn failed_urls(&self) -> Vec<String> {
        self.state
            .lock()
            .records
            .values()
            .filter(|record| record.state == LoadState::Failed)
            .map(|record| record.url.clone())
            .collect()
    }

    /// Record for one URL
    pub fn record(&self, url: &str) -> Option<AssetRecord> {
        self.state.lock().records.get(url).cloned()
    }

    /// All records, in URL order
    pub fn records(&self) -> Vec<AssetRecord> {
        self.state.lock().records.values().cloned().collect()
    }

    /// Subscribe to load events. Handlers run in registration order after
    /// the tracker state has been updated.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&LoadEvent) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(handler))
    }

    /// Subscribe a shared handler; the same `Arc` is only registered once
    pub fn subscribe_shared(&self, handler: Arc<LoadHandler>) -> Subscription {
        let id = self.handlers.lock().insert(handler);
        let weak: Weak<dyn Unsubscribe> = Arc::downgrade(&self.handlers) as Weak<dyn Unsubscribe>;
        Subscription::new(id, weak)
    }

    /// Number of subscribed handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Take queued events, oldest first
    pub fn drain_events(&self) -> Vec<LoadEvent> {
        self.events.drain()
    }

    /// Check if events are waiting to be drained
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn publish(&self, event: LoadEvent) {
        let handlers = self.handlers.lock().snapshot();
        for (id, handler) in handlers {
            if self.handlers.lock().contains(id) {
                handler(&event);
            }
        }
        self.events.send(event);
    }
}

impl Default for AssetLoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssetLoadTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AssetLoadTracker")
            .field("progress", &state.progress)
            .field("started", &state.started)
            .field("completed", &state.completed)
            .field("errored", &state.errored)
            .finish()
    }
}
