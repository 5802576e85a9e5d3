//! The boundary lock

use parking_lot::Mutex;

/// Mutual exclusion over everything reachable from the host.
///
/// The protected value is only reachable inside [`BoundaryLock::with_lock`],
/// so no registry can be touched without holding the lock. Not reentrant.
pub struct BoundaryLock<T> {
    inner: Mutex<T>,
}

impl<T> BoundaryLock<T> {
    /// Wrap `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Run `body` with the lock held; released on every exit path,
    /// unwinding included
    pub fn with_lock<R>(&self, body: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        body(&mut guard)
    }

    /// Whether some thread currently holds the lock
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_released_after_panic() {
        let lock = BoundaryLock::new(0u32);
        let result = catch_unwind(AssertUnwindSafe(|| {
            lock.with_lock(|n| {
                *n += 1;
                panic!("engine failure");
            })
        }));
        assert!(result.is_err());
        assert!(!lock.is_locked());
        assert_eq!(lock.with_lock(|n| *n), 1);
    }

    #[test]
    fn test_serializes_threads() {
        let lock = Arc::new(BoundaryLock::new(Vec::new()));
        let workers: Vec<_> = (0..8)
            .map(|t| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        lock.with_lock(|v| {
                            let len = v.len();
                            v.push((t, i));
                            assert_eq!(v.len(), len + 1);
                        });
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(lock.with_lock(|v| v.len()), 800);
    }
}
