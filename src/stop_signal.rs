use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// One-shot flag telling workers to wind down. Once set it stays set.
///
/// Clones share the same flag. Workers blocked on a channel observe it
/// through the `poll` interval of the channel's stop-aware operations.
#[derive(Clone, Default)]
pub struct StopSignal {
    set: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.set.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_signal_is_monotonic() {
        let signal = StopSignal::new();
        assert!(!signal.is_set());
        signal.set();
        assert!(signal.is_set());
        signal.set();
        assert!(signal.is_set());
    }

    #[test]
    fn test_clones_share_flag() {
        let signal = StopSignal::new();
        let other = signal.clone();
        other.set();
        assert!(signal.is_set());
    }

    #[test]
    fn test_set_is_visible_to_other_threads() {
        let signal = StopSignal::new();
        thread::scope(|s| {
            let watcher = s.spawn(|| {
                while !signal.is_set() {
                    thread::yield_now();
                }
            });
            signal.set();
            watcher.join().unwrap();
        });
    }
}
