use rayon::prelude::*;

use crate::{is_prime, InputSequence, SweepError, Verdicts};

/// Builds the pool the auto-parallel sweep runs in. Zero threads lets rayon pick.
pub fn build_pool(threads: usize) -> Result<rayon::ThreadPool, SweepError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sweep-pool-{}", i))
        .build()
        .map_err(|err| SweepError::ThreadPool(err.to_string()))
}

pub fn sweep_parallel(input: &InputSequence, pool: &rayon::ThreadPool) -> Result<Verdicts, SweepError> {
    let range = input.work_range();
    log::debug!(
        "Sweeping {} indices on {} pool threads.",
        range.len(),
        pool.current_num_threads()
    );

    let computed: Vec<bool> = pool.install(|| {
        range
            .clone()
            .into_par_iter()
            .map(|index| input.get(index).map(is_prime))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut slots = vec![false; range.start];
    slots.extend(computed);
    Ok(Verdicts::from(slots))
}
