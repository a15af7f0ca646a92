//! Scene ready signal
//!
//! Fires once, after the render surface presents its first visible frame.
//!
//! ```ignore
//! let signal = SceneReadySignal::new();
//! let sub = signal.subscribe(|| log::info!("scene is up"));
//!
//! // render loop, after the first present
//! signal.signal_ready();
//!
//! // every frame: deliver replays to subscribers that arrived late
//! signal.process();
//! ```
//!
//! Subscribers added after the signal fired are queued and called on the
//! next [`process`](SceneReadySignal::process) turn, never inside `subscribe`.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use umbra_core::{ListenerList, SubscriberId, Subscription, Unsubscribe};

/// Readiness callback
pub type ReadyCallback = dyn Fn() + Send + Sync;

struct SignalState {
    ready: bool,
    disposed: bool,
    listeners: ListenerList<ReadyCallback>,
    /// Late subscribers waiting for the next turn
    replay: VecDeque<SubscriberId>,
}

struct SignalInner {
    state: Mutex<SignalState>,
}

impl SignalInner {
    /// Fetch a listener only if it is still registered
    fn live_listener(&self, id: SubscriberId) -> Option<Arc<ReadyCallback>> {
        let state = self.state.lock();
        if state.disposed {
            return None;
        }
        state.listeners.get(id).cloned()
    }
}

impl Unsubscribe for SignalInner {
    fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut state = self.state.lock();
        state.replay.retain(|pending| *pending != id);
        state.listeners.remove(id)
    }
}

/// One-shot readiness event shared between the render loop and the UI.
///
/// Cloning yields another handle to the same signal.
#[derive(Clone)]
pub struct SceneReadySignal {
    inner: Arc<SignalInner>,
}

impl SceneReadySignal {
    /// Create a signal in the not-ready state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                state: Mutex::new(SignalState {
                    ready: false,
                    disposed: false,
                    listeners: ListenerList::new(),
                    replay: VecDeque::new(),
                }),
            }),
        }
    }

    /// Mark the scene ready and notify current subscribers in order.
    ///
    /// Returns `true` for the call that performed the transition; every later
    /// call is a no-op returning `false`.
    pub fn signal_ready(&self) -> bool {
        let listeners = {
            let mut state = self.inner.state.lock();
            if state.ready || state.disposed {
                return false;
            }
            state.ready = true;
            state.listeners.snapshot()
        };

        log::debug!("Scene ready, notifying {} listener(s)", listeners.len());

        for (id, _) in listeners {
            // Re-check so a listener removed earlier in this dispatch is skipped
            if let Some(listener) = self.inner.live_listener(id) {
                listener();
            }
        }

        true
    }

    /// Subscribe a callback.
    ///
    /// A callback that captures a clone of this signal keeps the signal alive
    /// through its own listener list; the cycle is broken by
    /// [`unsubscribe`](Self::unsubscribe) or [`dispose`](Self::dispose).
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(callback))
    }

    /// Subscribe a shared callback.
    ///
    /// Subscribing the same `Arc` again returns a token for the existing
    /// registration and does not cause a second notification.
    pub fn subscribe_shared(&self, callback: Arc<ReadyCallback>) -> Subscription {
        let mut state = self.inner.state.lock();
        if state.disposed {
            log::debug!("Ignoring subscribe on a disposed scene ready signal");
            return Subscription::inert();
        }

        let id = match state.listeners.find(&callback) {
            Some(existing) => existing,
            None => {
                let id = state.listeners.insert(callback);
                if state.ready {
                    state.replay.push_back(id);
                }
                id
            }
        };

        let weak: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription::new(id, weak)
    }

    /// Unsubscribe by ID. Idempotent.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.unsubscribe(id)
    }

    /// Run one scheduling turn: deliver queued replays to late subscribers.
    ///
    /// Returns how many callbacks ran.
    pub fn process(&self) -> usize {
        let pending: Vec<SubscriberId> = {
            let mut state = self.inner.state.lock();
            state.replay.drain(..).collect()
        };

        let mut delivered = 0;
        for id in pending {
            if let Some(listener) = self.inner.live_listener(id) {
                listener();
                delivered += 1;
            }
        }
        delivered
    }

    /// Current state, without side effects
    pub fn is_ready(&self) -> bool {
        self.inner.state.lock().ready
    }

    /// Check whether replays are waiting for the next turn
    pub fn has_pending(&self) -> bool {
        !self.inner.state.lock().replay.is_empty()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.state.lock().listeners.len()
    }

    /// Tear the signal down. Listeners are dropped, queued replays are
    /// discarded and further subscriptions are ignored.
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.listeners.clear();
        state.replay.clear();
        log::debug!("Scene ready signal disposed");
    }

    /// Check whether [`dispose`](Self::dispose) was called
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }
}

impl Default for SceneReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneReadySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SceneReadySignal")
            .field("ready", &state.ready)
            .field("disposed", &state.disposed)
            .field("listeners", &state.listeners.len())
            .field("pending_replays", &state.replay.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_self_referencing_listener_released_by_dispose() {
        let signal = SceneReadySignal::new();
        let inner = Arc::downgrade(&signal.inner);

        let held = signal.clone();
        signal.subscribe(move || {
            let _ = held.is_ready();
        });
        signal.signal_ready();

        let handle = signal.clone();
        drop(signal);
        assert!(inner.upgrade().is_some());

        handle.dispose();
        drop(handle);
        assert!(inner.upgrade().is_none());
    }

    fn counter() -> (Arc<AtomicU32>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicU32::new(0));
        let clone = Arc::clone(&count);
        (count, move || {
            clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_signal_ready_is_idempotent() {
        let signal = SceneReadySignal::new();
        let (count, callback) = counter();
        signal.subscribe(callback);

        assert!(signal.signal_ready());
        assert!(!signal.signal_ready());
        assert!(!signal.signal_ready());

        assert!(signal.is_ready());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_subscriber_waits_for_next_turn() {
        let signal = SceneReadySignal::new();
        signal.signal_ready();

        let (count, callback) = counter();
        signal.subscribe(callback);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(signal.has_pending());

        assert_eq!(signal.process(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Nothing left to replay
        assert_eq!(signal.process(), 0);
        signal.signal_ready();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_before_replay() {
        let signal = SceneReadySignal::new();
        signal.signal_ready();

        let (count, callback) = counter();
        let sub = signal.subscribe(callback);
        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());

        assert_eq!(signal.process(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shared_callback_deduplicated() {
        let signal = SceneReadySignal::new();
        let (count, callback) = counter();
        let shared: Arc<ReadyCallback> = Arc::new(callback);

        let a = signal.subscribe_shared(Arc::clone(&shared));
        let b = signal.subscribe_shared(Arc::clone(&shared));
        assert_eq!(a.id(), b.id());
        assert_eq!(signal.listener_count(), 1);

        signal.signal_ready();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Re-subscribing after the fact does not replay a second time
        signal.subscribe_shared(shared);
        assert_eq!(signal.process(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let signal = SceneReadySignal::new();
        let (count, callback) = counter();

        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let victim_clone = Arc::clone(&victim);
        signal.subscribe(move || {
            if let Some(sub) = victim_clone.lock().as_ref() {
                sub.unsubscribe();
            }
        });
        *victim.lock() = Some(signal.subscribe(callback));

        signal.signal_ready();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(signal.listener_count(), 1);
    }

    #[test]
    fn test_subscribe_during_dispatch_is_replayed() {
        let signal = SceneReadySignal::new();
        let (count, callback) = counter();
        let callback: Arc<ReadyCallback> = Arc::new(callback);

        let handle = signal.clone();
        let inner_callback = Arc::clone(&callback);
        signal.subscribe(move || {
            handle.subscribe_shared(Arc::clone(&inner_callback));
        });

        signal.signal_ready();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        signal.process();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispose_ignores_subscribers() {
        let signal = SceneReadySignal::new();
        signal.dispose();

        let (count, callback) = counter();
        let sub = signal.subscribe(callback);
        assert!(sub.is_inert());
        assert!(!signal.signal_ready());
        assert_eq!(signal.process(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
