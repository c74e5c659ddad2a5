use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crate::cursor::{AtomicCursor, Cursor, CursorKind, LockedCursor};
use crate::{is_prime, InputSequence, SweepError, Verdicts};

/// What one worker did before observing the end of the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub claimed: usize,
    pub primes: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct Distribution {
    pub verdicts: Verdicts,
    /// Sorted by worker id.
    pub reports: Vec<WorkerReport>,
}

type Claims = Vec<(usize, bool)>;

/// Everything a worker hands back once it observes the end of the range.
#[derive(Debug)]
struct Finished {
    claims: Claims,
    report: WorkerReport,
}

/// Produces the thread builder for a worker.
type WorkerBuilder = fn(usize) -> io::Result<thread::Builder>;

fn worker_builder(worker: usize) -> io::Result<thread::Builder> {
    Ok(thread::Builder::new().name(format!("sweep-worker-{}", worker)))
}

/// Sweeps `input` with `workers` self-scheduling threads sharing one cursor of the given kind.
pub fn distribute(
    input: &InputSequence,
    workers: usize,
    kind: CursorKind,
) -> Result<Distribution, SweepError> {
    match kind {
        CursorKind::Locked => distribute_with(input, workers, &LockedCursor::new(input.work_range())),
        CursorKind::Atomic => distribute_with(input, workers, &AtomicCursor::new(input.work_range())),
    }
}

pub fn distribute_with<C: Cursor>(
    input: &InputSequence,
    workers: usize,
    cursor: &C,
) -> Result<Distribution, SweepError> {
    let (claims, reports) = collect_claims(input, workers, cursor, worker_builder)?;

    // Every worker has been joined, so all claims are visible here.
    let mut verdicts = Verdicts::new(input.len());
    for (index, prime) in claims.into_iter().flatten() {
        verdicts.set(index, prime)?;
    }
    Ok(Distribution { verdicts, reports })
}

fn collect_claims<C: Cursor>(
    input: &InputSequence,
    workers: usize,
    cursor: &C,
    builder: WorkerBuilder,
) -> Result<(Vec<Claims>, Vec<WorkerReport>), SweepError> {
    if workers == 0 {
        return Err(SweepError::NoWorkers);
    }

    let (sender, receiver) = flume::unbounded();
    let (joined, refused) = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut refused = None;
        for worker in 0..workers {
            let sender = sender.clone();
            let spawned = builder(worker).and_then(|thread_builder| {
                thread_builder.spawn_scoped(scope, move || run_worker(worker, input, cursor, &sender))
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // Workers already running drain the range on their own.
                    refused = Some(SweepError::Spawn {
                        worker,
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }
        // Join every handle before inspecting any, so a panic never escapes the scope.
        let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        (joined, refused)
    });
    drop(sender);

    if let Some(err) = refused {
        log::debug!("Stopped spawning: {}.", err);
        return Err(err);
    }
    for (worker, outcome) in joined.into_iter().enumerate() {
        if outcome.is_err() {
            log::error!("Worker {} panicked.", worker);
            return Err(SweepError::WorkerPanicked { worker });
        }
    }

    let mut finished = receiver.drain().collect::<Result<Vec<Finished>, SweepError>>()?;
    finished.sort_by_key(|done| done.report.worker);
    Ok(finished
        .into_iter()
        .map(|done| (done.claims, done.report))
        .unzip())
}

fn run_worker<C: Cursor>(
    worker: usize,
    input: &InputSequence,
    cursor: &C,
    results: &flume::Sender<Result<Finished, SweepError>>,
) {
    let started = Instant::now();
    log::debug!("Worker {} running.", worker);

    let outcome = sweep_claims(input, cursor).map(|claims| {
        let report = WorkerReport {
            worker,
            claimed: claims.len(),
            primes: claims.iter().filter(|(_, prime)| *prime).count(),
            elapsed: started.elapsed(),
        };
        log::debug!("Worker {} done after {:?}.", worker, report.elapsed);
        Finished { claims, report }
    });
    if results.send(outcome).is_err() {
        log::warn!("Worker {} finished with nobody listening for its claims.", worker);
    }
}

fn sweep_claims<C: Cursor>(input: &InputSequence, cursor: &C) -> Result<Claims, SweepError> {
    let mut claims = Vec::new();
    // The cursor is released before the oracle runs.
    while let Some(index) = cursor.claim() {
        claims.push((index, is_prime(input.get(index)?)));
    }
    Ok(claims)
}
