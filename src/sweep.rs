//! Primality sweeps over a range of consecutive integers.
//!
//! The same range can be swept three ways: sequentially, by a fixed set of
//! self-scheduling worker threads pulling indices from a shared [`Cursor`],
//! and by a rayon pool. [`compare`] checks the three outcomes against each
//! other.

use std::fmt;
use std::ops::Range;

mod cursor;
mod distributor;
mod parallel;

pub use cursor::{AtomicCursor, Cursor, CursorKind, LockedCursor};
pub use distributor::{distribute, distribute_with, Distribution, WorkerReport};
pub use parallel::{build_pool, sweep_parallel};

pub const DEFAULT_LIMIT: usize = 100_000;
pub const DEFAULT_WORKERS: usize = 2;

/// First index any strategy works on. Slot 0 holds a defined value but is never swept.
pub const FIRST_INDEX: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// Two strategies disagree about the primality of `index`.
    Inconsistency {
        index: usize,
        sequential: bool,
        distributed: bool,
        parallel: bool,
    },
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
    LengthMismatch {
        expected: usize,
        found: usize,
    },
    WorkerPanicked {
        worker: usize,
    },
    /// The OS refused to start a worker thread.
    Spawn {
        worker: usize,
        reason: String,
    },
    NoWorkers,
    ThreadPool(String),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Inconsistency {
                index,
                sequential,
                distributed,
                parallel,
            } => write!(
                f,
                "Inconsistent results at index {}: sequential={}, distributed={}, auto-parallel={}",
                index, sequential, distributed, parallel
            ),
            SweepError::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for sequence of length {}", index, len)
            }
            SweepError::LengthMismatch { expected, found } => write!(
                f,
                "result sequences differ in length: expected {}, found {}",
                expected, found
            ),
            SweepError::WorkerPanicked { worker } => write!(f, "worker {} panicked", worker),
            SweepError::Spawn { worker, reason } => {
                write!(f, "failed to spawn worker {}: {}", worker, reason)
            }
            SweepError::NoWorkers => write!(f, "at least one worker thread is required"),
            SweepError::ThreadPool(reason) => write!(f, "failed to build thread pool: {}", reason),
        }
    }
}

impl std::error::Error for SweepError {}

/// Trial division up to `num / 2`.
pub fn is_prime(num: i64) -> bool {
    if num <= 1 {
        return false;
    }
    (2..=num / 2).all(|divisor| num % divisor != 0)
}

/// Consecutive integers where index `i` holds the value `i`. Read-only once built.
#[derive(Debug, Clone)]
pub struct InputSequence {
    values: Vec<i64>,
}

impl InputSequence {
    pub fn new(len: usize) -> Self {
        Self {
            values: (0..len).map(|value| value as i64).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<i64, SweepError> {
        self.values
            .get(index)
            .copied()
            .ok_or(SweepError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Indices every strategy sweeps. Empty when the sequence has at most one slot.
    pub fn work_range(&self) -> Range<usize> {
        FIRST_INDEX.min(self.len())..self.len()
    }
}

/// One primality verdict per input slot. Slot 0 is always `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdicts {
    slots: Vec<bool>,
}

impl Verdicts {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<bool, SweepError> {
        self.slots
            .get(index)
            .copied()
            .ok_or(SweepError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn set(&mut self, index: usize, prime: bool) -> Result<(), SweepError> {
        let len = self.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SweepError::IndexOutOfRange { index, len })?;
        *slot = prime;
        Ok(())
    }

    pub fn count_primes(&self) -> usize {
        self.slots.iter().filter(|prime| **prime).count()
    }

    /// Indices whose slot is `true`, in ascending order.
    pub fn primes(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, prime)| prime.then_some(index))
    }
}

impl From<Vec<bool>> for Verdicts {
    fn from(slots: Vec<bool>) -> Self {
        Self { slots }
    }
}

pub fn sweep_sequential(input: &InputSequence) -> Result<Verdicts, SweepError> {
    let mut verdicts = Verdicts::new(input.len());
    for index in input.work_range() {
        verdicts.set(index, is_prime(input.get(index)?))?;
    }
    Ok(verdicts)
}

/// Checks the three result sequences pointwise over `[1, N)`, stopping at the first mismatch.
pub fn compare(
    sequential: &Verdicts,
    distributed: &Verdicts,
    parallel: &Verdicts,
) -> Result<(), SweepError> {
    for other in [distributed, parallel] {
        if other.len() != sequential.len() {
            return Err(SweepError::LengthMismatch {
                expected: sequential.len(),
                found: other.len(),
            });
        }
    }

    for index in FIRST_INDEX..sequential.len() {
        let expected = sequential.slots[index];
        let (distributed, parallel) = (distributed.slots[index], parallel.slots[index]);
        if distributed != expected || parallel != expected {
            log::debug!("Strategies disagree at index {}.", index);
            return Err(SweepError::Inconsistency {
                index,
                sequential: expected,
                distributed,
                parallel,
            });
        }
    }
    Ok(())
}
