use std::time::Instant;

use sweep::*;

use super::{report_runtime, Strategy};

pub fn sequential(input: &InputSequence) -> anyhow::Result<Verdicts> {
    log::info!("Sweeping {} indices sequentially.", input.work_range().len());

    let start = Instant::now();
    let verdicts = sweep_sequential(input)?;
    report_runtime(Strategy::Sequential, start.elapsed());

    log::info!("sequential: {} primes found.", verdicts.count_primes());
    Ok(verdicts)
}
