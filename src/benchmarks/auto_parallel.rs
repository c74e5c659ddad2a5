use std::time::Instant;

use anyhow::Context;
use sweep::*;

use super::{report_runtime, Strategy};

pub fn auto_parallel(input: &InputSequence, pool_threads: usize) -> anyhow::Result<Verdicts> {
    // Pool startup is not part of the measured sweep.
    let pool = build_pool(pool_threads).context("building the auto-parallel pool")?;
    log::info!(
        "Sweeping {} indices on a pool of {} threads.",
        input.work_range().len(),
        pool.current_num_threads()
    );

    let start = Instant::now();
    let verdicts = sweep_parallel(input, &pool)?;
    report_runtime(Strategy::AutoParallel, start.elapsed());

    log::info!("auto-parallel: {} primes found.", verdicts.count_primes());
    Ok(verdicts)
}
