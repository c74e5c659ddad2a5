use std::time::Instant;

use sweep::*;

use super::{report_runtime, Strategy};

pub fn distributed(
    input: &InputSequence,
    workers: usize,
    cursor: CursorKind,
) -> anyhow::Result<Verdicts> {
    log::info!(
        "Distributing {} indices over {} workers ({:?} cursor).",
        input.work_range().len(),
        workers,
        cursor
    );

    let start = Instant::now();
    let distribution = distribute(input, workers, cursor)?;
    report_runtime(Strategy::Distributed, start.elapsed());

    for report in &distribution.reports {
        log::info!(
            "Worker {}: claimed {} indices, found {} primes, finished in {:?}.",
            report.worker,
            report.claimed,
            report.primes,
            report.elapsed
        );
    }
    log::info!(
        "distributed: {} primes found.",
        distribution.verdicts.count_primes()
    );
    Ok(distribution.verdicts)
}
