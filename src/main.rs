mod benchmarks;

use benchmarks::Strategy;
use clap::Parser;
use std::process;
use sweep::{CursorKind, InputSequence, SweepError};

/// Exit status when the strategies disagree about some index.
const EXIT_INCONSISTENT: i32 = 3;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Strategy to run. Runs all three and compares them when omitted.
    #[arg(value_enum)]
    strategy: Option<Strategy>,

    /// Number of slots in the input sequence.
    #[arg(short = 'n', long, default_value_t = sweep::DEFAULT_LIMIT)]
    limit: usize,

    /// Worker threads for the distributed strategy.
    #[arg(short, long, default_value_t = sweep::DEFAULT_WORKERS)]
    workers: usize,

    /// How distributed workers share the cursor.
    #[arg(short, long, value_enum, default_value_t = CursorKind::Locked)]
    cursor: CursorKind,

    /// Threads in the auto-parallel pool.
    #[arg(short, long, default_value_t = num_cpus::get())]
    pool_threads: usize,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // Creates a logger, filtering out all log messages except those from this crate and its library.
    env_logger::builder()
        .filter_level(log::LevelFilter::Off)
        .filter_module(module_path!(), level)
        .filter_module("sweep", level)
        .format_timestamp_nanos()
        .init();

    if let Err(err) = run(&args) {
        match err.downcast_ref::<SweepError>() {
            Some(inconsistency @ SweepError::Inconsistency { .. }) => eprintln!("{}", inconsistency),
            _ => eprintln!("Error: {:#}", err),
        }
        process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SweepError>() {
        Some(SweepError::Inconsistency { .. }) => EXIT_INCONSISTENT,
        _ => 1,
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = InputSequence::new(args.limit);

    match args.strategy {
        Some(Strategy::Sequential) => {
            benchmarks::sequential(&input)?;
        }
        Some(Strategy::Distributed) => {
            benchmarks::distributed(&input, args.workers, args.cursor)?;
        }
        Some(Strategy::AutoParallel) => {
            benchmarks::auto_parallel(&input, args.pool_threads)?;
        }
        None => {
            let sequential = benchmarks::sequential(&input)?;
            let distributed = benchmarks::distributed(&input, args.workers, args.cursor)?;
            let parallel = benchmarks::auto_parallel(&input, args.pool_threads)?;
            sweep::compare(&sequential, &distributed, &parallel)?;
            log::info!(
                "All strategies agree on {} indices.",
                input.work_range().len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["primesweep"]).unwrap();
        assert_eq!(args.strategy, None);
        assert_eq!(args.limit, 100_000);
        assert_eq!(args.workers, 2);
        assert_eq!(args.cursor, CursorKind::Locked);
        assert_eq!(args.pool_threads, num_cpus::get());
        assert!(!args.verbose);
    }

    #[test]
    fn parses_strategy_and_flags() {
        let args = Args::try_parse_from([
            "primesweep",
            "auto-parallel",
            "-n",
            "500",
            "--workers",
            "4",
            "--cursor",
            "atomic",
            "-p",
            "3",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.strategy, Some(Strategy::AutoParallel));
        assert_eq!(args.limit, 500);
        assert_eq!(args.workers, 4);
        assert_eq!(args.cursor, CursorKind::Atomic);
        assert_eq!(args.pool_threads, 3);
        assert!(args.verbose);
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Args::try_parse_from(["primesweep", "gpu"]).is_err());
    }

    #[test]
    fn strategy_names_match_runtime_lines() {
        assert_eq!(Strategy::Sequential.to_string(), "sequential");
        assert_eq!(Strategy::Distributed.to_string(), "distributed");
        assert_eq!(Strategy::AutoParallel.to_string(), "auto-parallel");
    }

    #[test]
    fn run_small_range_agrees() {
        let args = Args::try_parse_from(["primesweep", "-n", "200", "-c", "atomic", "-p", "2"]).unwrap();
        run(&args).unwrap();
    }

    #[test]
    fn run_with_no_workers_fails() {
        let args = Args::try_parse_from(["primesweep", "distributed", "-w", "0"]).unwrap();
        let err = run(&args).unwrap_err();
        assert_eq!(err.downcast_ref::<SweepError>(), Some(&SweepError::NoWorkers));
    }

    #[test]
    fn inconsistency_exits_with_its_own_status() {
        let err = anyhow::Error::from(SweepError::Inconsistency {
            index: 7,
            sequential: true,
            distributed: false,
            parallel: true,
        });
        assert_eq!(exit_code(&err), EXIT_INCONSISTENT);
        assert_eq!(exit_code(&err.context("comparing strategies")), 3);
    }

    #[test]
    fn other_failures_exit_with_one() {
        let no_workers: anyhow::Result<()> = Err(SweepError::NoWorkers.into());
        let err = no_workers.context("running the distributed sweep").unwrap_err();
        assert_eq!(err.downcast_ref::<SweepError>(), Some(&SweepError::NoWorkers));
        assert_eq!(exit_code(&err), 1);

        let refused = anyhow::Error::from(SweepError::Spawn {
            worker: 4,
            reason: "Resource temporarily unavailable".to_string(),
        });
        assert_eq!(exit_code(&refused), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("not a sweep error")), 1);
    }
}
