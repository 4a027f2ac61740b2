//! Worker-count configuration for parallel queries.
//!
//! The process-wide setting lives in an atomic (`0` means "use all available
//! hardware threads"). Engines read it once per query, so a scoped override
//! installed around a call site cannot leak into unrelated queries that were
//! already running.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

static WORKERS: AtomicUsize = AtomicUsize::new(0);

/// Set the process-wide worker count (`0` = all available).
pub fn set_workers(n: usize) {
    WORKERS.store(n, Ordering::SeqCst);
}

/// The configured process-wide worker count (`0` = all available).
pub fn workers() -> usize {
    WORKERS.load(Ordering::SeqCst)
}

/// Explicit worker-count configuration an engine can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency {
    workers: usize,
}

impl Concurrency {
    /// Snapshot of the process-wide setting.
    pub fn configured() -> Self {
        Self { workers: workers() }
    }

    /// Exactly `n` workers, bypassing the process-wide setting.
    pub fn exact(n: usize) -> Self {
        Self { workers: n }
    }

    /// Resolve to a concrete thread count: `0` maps to the number of
    /// available hardware threads (at least 1).
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            thread::available_parallelism().map_or(1, usize::from)
        } else {
            self.workers
        }
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::configured()
    }
}

/// RAII override of the process-wide worker count.
///
/// Installs `n` on construction and restores the previous value when
/// dropped, on all exit paths.
#[derive(Debug)]
pub struct ScopedWorkers {
    previous: usize,
}

impl ScopedWorkers {
    pub fn new(n: usize) -> Self {
        Self {
            previous: WORKERS.swap(n, Ordering::SeqCst),
        }
    }
}

impl Drop for ScopedWorkers {
    fn drop(&mut self) {
        WORKERS.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch the process-wide setting.
    static LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_effective_never_zero() {
        assert!(Concurrency::exact(0).effective_workers() >= 1);
        assert_eq!(Concurrency::exact(3).effective_workers(), 3);
    }

    #[test]
    fn test_scoped_restore() {
        let _lock = LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let baseline = workers();
        {
            let _guard = ScopedWorkers::new(2);
            assert_eq!(workers(), 2);
            {
                let _inner = ScopedWorkers::new(5);
                assert_eq!(workers(), 5);
            }
            assert_eq!(workers(), 2);
        }
        assert_eq!(workers(), baseline);
    }

    #[test]
    fn test_scoped_restore_on_panic() {
        let _lock = LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let baseline = workers();
        let result = std::panic::catch_unwind(|| {
            let _guard = ScopedWorkers::new(7);
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(workers(), baseline);
    }
}
