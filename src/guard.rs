//! Execution Guard
//!
//! Single-flight lock for LLM tasks. A trigger that finds the guard busy is
//! dropped, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Two-state lock: Idle or Busy
#[derive(Debug, Clone, Default)]
pub struct ExecutionGuard {
    busy: Arc<AtomicBool>,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Busy. Returns false, with no side effect, if already Busy.
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Busy -> Idle, unconditionally
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Acquire and hand back a permit that releases on drop
    pub fn try_permit(&self) -> Option<ExecutionPermit> {
        if self.try_acquire() {
            Some(ExecutionPermit {
                guard: self.clone(),
            })
        } else {
            None
        }
    }
}

/// Held for the lifetime of one task invocation
#[derive(Debug)]
pub struct ExecutionPermit {
    guard: ExecutionGuard,
}

impl Drop for ExecutionPermit {
    fn drop(&mut self) {
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_exclusive() {
        let guard = ExecutionGuard::new();
        assert!(guard.try_acquire());
        assert!(guard.is_busy());
        assert!(!guard.try_acquire());

        guard.release();
        assert!(!guard.is_busy());
        assert!(guard.try_acquire());
    }

    #[test]
    fn test_release_when_idle_is_harmless() {
        let guard = ExecutionGuard::new();
        guard.release();
        assert!(!guard.is_busy());
        assert!(guard.try_acquire());
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let guard = ExecutionGuard::new();
        {
            let permit = guard.try_permit();
            assert!(permit.is_some());
            assert!(guard.try_permit().is_none());
        }
        assert!(!guard.is_busy());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = ExecutionGuard::new();
        let other = guard.clone();
        let _permit = guard.try_permit().unwrap();
        assert!(other.is_busy());
        assert!(!other.try_acquire());
    }

    #[test]
    fn test_contended_acquire_has_one_winner() {
        let guard = ExecutionGuard::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let g = guard.clone();
                std::thread::spawn(move || g.try_acquire())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
