//! Subscriber identifiers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one registration in a listener registry.
///
/// IDs are never reused within a registry, so a stale ID can be passed to
/// `unsubscribe` safely.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(pub u64);

impl SubscriberId {
    /// Sentinel for subscriptions that were never registered
    pub const INERT: Self = Self(0);

    /// Get the raw value
    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Check whether this is the inert sentinel
    #[inline]
    pub const fn is_inert(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inert() {
            write!(f, "SubscriberId(inert)")
        } else {
            write!(f, "SubscriberId({})", self.0)
        }
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thread-safe subscriber ID generator
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a new generator. The first ID handed out is 1.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Generate the next unique ID
    pub fn next(&self) -> SubscriberId {
        SubscriberId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("next", &self.next.load(Ordering::Relaxed))
            .finish()
    }
}
