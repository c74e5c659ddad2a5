use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// The next unclaimed index of a work range, shared by every worker.
///
/// Each index in the range is handed out by [`Cursor::claim`] exactly once.
/// The position never decreases and never passes the end of the range.
pub trait Cursor: Sync {
    /// Claims the next index, or `None` once the range is exhausted.
    fn claim(&self) -> Option<usize>;

    fn position(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CursorKind {
    /// Integer guarded by a mutex.
    #[default]
    Locked,
    /// Bounded compare-and-swap on an atomic integer.
    Atomic,
}

#[derive(Debug)]
pub struct LockedCursor {
    next: Mutex<usize>,
    end: usize,
}

impl LockedCursor {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            next: Mutex::new(range.start.min(range.end)),
            end: range.end,
        }
    }
}

impl Cursor for LockedCursor {
    fn claim(&self) -> Option<usize> {
        // A panic elsewhere cannot leave the integer half-written.
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let tmp = *next;
        if tmp == self.end {
            return None;
        }
        *next = tmp + 1;
        Some(tmp)
    }

    fn position(&self) -> usize {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct AtomicCursor {
    next: AtomicUsize,
    end: usize,
}

impl AtomicCursor {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            next: AtomicUsize::new(range.start.min(range.end)),
            end: range.end,
        }
    }
}

impl Cursor for AtomicCursor {
    fn claim(&self) -> Option<usize> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |tmp| {
                (tmp < self.end).then_some(tmp + 1)
            })
            .ok()
    }

    fn position(&self) -> usize {
        self.next.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    fn drain(cursor: &impl Cursor) -> Vec<usize> {
        std::iter::from_fn(|| cursor.claim()).collect()
    }

    #[test]
    fn locked_cursor_walks_range_once() {
        let cursor = LockedCursor::new(1..6);
        assert_eq!(drain(&cursor), vec![1, 2, 3, 4, 5]);
        assert_eq!(cursor.claim(), None);
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn atomic_cursor_walks_range_once() {
        let cursor = AtomicCursor::new(1..6);
        assert_eq!(drain(&cursor), vec![1, 2, 3, 4, 5]);
        assert_eq!(cursor.claim(), None);
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn exhausted_cursor_stays_at_end() {
        let atomic = AtomicCursor::new(0..2);
        let locked = LockedCursor::new(0..2);
        drain(&atomic);
        drain(&locked);
        for _ in 0..10 {
            assert_eq!(atomic.claim(), None);
            assert_eq!(locked.claim(), None);
        }
        assert_eq!(atomic.position(), 2);
        assert_eq!(locked.position(), 2);
    }

    #[test]
    fn empty_and_inverted_ranges_claim_nothing() {
        let inverted = Range { start: 1, end: 0 };
        assert_eq!(LockedCursor::new(1..1).claim(), None);
        assert_eq!(AtomicCursor::new(1..1).claim(), None);
        assert_eq!(LockedCursor::new(inverted.clone()).claim(), None);
        assert_eq!(AtomicCursor::new(inverted).claim(), None);
    }

    #[test]
    fn poisoned_lock_keeps_handing_out_indices() {
        let cursor = LockedCursor::new(1..4);
        assert_eq!(cursor.claim(), Some(1));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = cursor.next.lock().unwrap();
            panic!("poison the cursor");
        }));
        assert!(result.is_err());
        assert!(cursor.next.is_poisoned());

        assert_eq!(drain(&cursor), vec![2, 3]);
    }
}
