use std::{
    sync::atomic::{AtomicI64, Ordering},
    thread,
    time::Duration,
};

use tracing::info;

use crate::exclusive_lock::ExclusiveLock;

/// A single integer updated through a slow read-modify-write.
///
/// The state lives in an atomic only so that the unguarded path is a logical
/// race (lost updates) rather than a data race. Loads and stores are
/// separate; nothing here is a `fetch_add`.
pub struct SharedCounter {
    state: AtomicI64,
    lock: ExclusiveLock,
    latency: Duration,
}

impl SharedCounter {
    /// `latency` is the simulated work between reading and writing back.
    pub fn new(latency: Duration) -> Self {
        Self {
            state: AtomicI64::new(0),
            lock: ExclusiveLock::new(),
            latency,
        }
    }

    pub fn value(&self) -> i64 {
        self.state.load(Ordering::Relaxed)
    }

    /// Not synchronized against in-flight updates. Callers make sure none are
    /// running.
    pub fn reset(&self) {
        self.state.store(0, Ordering::Relaxed);
    }

    /// Not safe to call concurrently: two callers can both read the same
    /// state and the later write wins.
    pub fn no_lock_update(&self, delta: i64) {
        let current = self.value();
        info!(
            "Starting updating state from {} to {}.",
            current,
            current + delta
        );
        self.update(delta);
        info!("Ending updating: current state = {}.", self.value());
    }

    pub fn guarded_update(&self, delta: i64) {
        let _guard = self.lock.lock();
        let current = self.value();
        info!(
            "Starting updating state from {} to {}.",
            current,
            current + delta
        );
        self.update(delta);
        info!("Ending updating: current state = {}.", self.value());
    }

    fn update(&self, delta: i64) {
        let mut local = self.state.load(Ordering::Relaxed);
        local += delta;
        thread::sleep(self.latency);
        self.state.store(local, Ordering::Relaxed);
    }
}
