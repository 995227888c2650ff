use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use log::{error, info, LevelFilter};
use thiserror::Error;
use u_tournament::export::{write_csv, ExportError};
use u_tournament::report::Report;
use u_tournament::{SearchConfig, Solver, TournamentConfig, TournamentError};

/// Schedules a round-based tournament and prints the result.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Number of participants.
    #[arg(long, default_value_t = 12)]
    participants: usize,

    /// Number of resources (tables, courts, ...).
    #[arg(long, default_value_t = 6)]
    resources: usize,

    /// Number of timeslots.
    #[arg(long, default_value_t = 8)]
    timeslots: usize,

    /// Matches every participant must play.
    #[arg(long, default_value_t = 4)]
    matches: usize,

    /// Timeslots after a match in which the same participant may not play.
    #[arg(long, default_value_t = 1)]
    min_gap: usize,

    /// Wall-clock budget for the search, in seconds.
    #[arg(long, default_value_t = 60.0)]
    max_seconds: f64,

    /// Seed for the resource preference order.
    #[arg(long)]
    seed: Option<u64>,

    /// Search subtrees in parallel (needs the `parallel` feature).
    #[arg(long)]
    parallel: bool,

    /// Search even when the capacity check proves the instance infeasible.
    #[arg(long)]
    no_precheck: bool,

    /// Write the schedule to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Log search progress.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to create {}: {source}", path.display())]
    CreateFile { path: PathBuf, source: io::Error },

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    configure_logging(args.verbose);
    if let Err(e) = run(args) {
        error!("Execution failed, error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = TournamentConfig::default()
        .with_participants(args.participants)
        .with_resources(args.resources)
        .with_timeslots(args.timeslots)
        .with_matches(args.matches)
        .with_min_gap(args.min_gap)
        .with_max_solve_seconds(args.max_seconds);

    let mut search = SearchConfig::default()
        .with_parallel(args.parallel)
        .with_capacity_precheck(!args.no_precheck);
    if let Some(seed) = args.seed {
        search = search.with_seed(seed);
    }

    let report = Solver::new(search).solve(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", Report::new(&report))?;

    if let Some(path) = args.csv {
        match report.result.solution() {
            Some(solution) => {
                let file = File::create(&path).map_err(|source| CliError::CreateFile {
                    path: path.clone(),
                    source,
                })?;
                write_csv(solution, BufWriter::new(file))?;
                info!("schedule exported to {}", path.display());
                writeln!(out, "Schedule exported to {}", path.display())?;
            }
            None => writeln!(out, "No schedule to export")?,
        }
    }
    Ok(())
}
