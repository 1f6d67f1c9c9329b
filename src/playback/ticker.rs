//! Host tick source abstraction.
//!
//! Players do not own a global timer. A host hands every player a shared [`TickSource`]; each
//! player subscribes while playing and unsubscribes when paused or stopped. The host then calls
//! [`crate::Player::on_tick`] on players whose subscription is live.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

/// Host ticks per second requested when playback starts.
pub const HOST_TICK_HZ: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Handle for one live listener registration.
pub struct TickSubscription(pub u64);

/// Capability to register per-frame listeners with a host scheduler.
pub trait TickSource {
    /// Register a listener that wants ticks at `target_hz`.
    fn subscribe(&self, target_hz: u32) -> TickSubscription;

    /// Remove a listener. Removing an unknown subscription is a no-op.
    fn unsubscribe(&self, sub: TickSubscription);

    /// Whether `sub` is currently registered.
    fn is_active(&self, sub: TickSubscription) -> bool;
}

/// Single-threaded reference [`TickSource`] shared between players through `Rc`.
///
/// The tick rate is set explicitly by whichever subscriber asked last; it is stored per
/// scheduler instance rather than process-wide.
#[derive(Debug, Default)]
pub struct SharedTicker {
    next_id: Cell<u64>,
    rate_hz: Cell<u32>,
    listeners: RefCell<BTreeSet<TickSubscription>>,
}

impl SharedTicker {
    /// Empty scheduler with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate most recently requested by a subscriber (0 before the first subscription).
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz.get()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Milliseconds between host ticks at the current rate.
    pub fn tick_interval_ms(&self) -> f64 {
        match self.rate_hz.get() {
            0 => 1000.0 / f64::from(HOST_TICK_HZ),
            hz => 1000.0 / f64::from(hz),
        }
    }
}

impl TickSource for SharedTicker {
    fn subscribe(&self, target_hz: u32) -> TickSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.rate_hz.set(target_hz);
        let sub = TickSubscription(id);
        self.listeners.borrow_mut().insert(sub);
        sub
    }

    fn unsubscribe(&self, sub: TickSubscription) {
        self.listeners.borrow_mut().remove(&sub);
    }

    fn is_active(&self, sub: TickSubscription) -> bool {
        self.listeners.borrow().contains(&sub)
    }
}
