mod auto_parallel;
mod distributed;
mod sequential;

use std::fmt;
use std::time::Duration;

// Re-export benchmark functions directly.
pub use auto_parallel::auto_parallel;
pub use distributed::distributed;
pub use sequential::sequential;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Plain loop on the main thread.
    Sequential,
    /// Self-scheduling workers sharing a cursor.
    Distributed,
    /// Rayon parallel iterator.
    AutoParallel,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Sequential => "sequential",
            Strategy::Distributed => "distributed",
            Strategy::AutoParallel => "auto-parallel",
        };
        f.write_str(name)
    }
}

fn report_runtime(strategy: Strategy, elapsed: Duration) {
    println!(
        "Runtime of {} primality check: {} seconds.",
        strategy,
        elapsed.as_secs_f64()
    );
}
