use std::path::PathBuf;
use clap::Parser;
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use weno_advect::checkpoint::CborWriter;
use weno_advect::config::Configuration;
use weno_advect::error::Error;
use weno_advect::solver::Solver;




/**
 * Solves u_t + u_x + u_y = 0 on the periodic unit square
 */
#[derive(Parser, Debug)]
#[clap(version)]
struct Opts {
    /// Final simulation time
    #[clap(long = "tf", default_value = "10.0")]
    final_time: f64,

    /// Courant number
    #[clap(long, default_value = "0.4")]
    cfl: f64,

    /// Number of steps between checkpoints
    #[clap(long = "si", default_value = "100")]
    checkpoint_interval: u64,

    /// Number of cells on the x axis
    #[clap(long, default_value = "50")]
    nx: i64,

    /// Number of cells on the y axis
    #[clap(long, default_value = "50")]
    ny: i64,

    /// Number of blocks the grid is partitioned into
    #[clap(short = 'w', long, default_value = "1")]
    workers: usize,

    /// Number of threads evaluating blocks
    #[clap(short = 't', long, default_value = "1")]
    threads: usize,

    /// Directory for the solution snapshots
    #[clap(short = 'o', long, default_value = ".")]
    output: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}




// ============================================================================
impl From<Opts> for Configuration {
    fn from(opts: Opts) -> Self {
        Self {
            final_time: opts.final_time,
            cfl: opts.cfl,
            checkpoint_interval: opts.checkpoint_interval,
            grid_size: (opts.nx, opts.ny),
            num_workers: opts.workers,
            num_threads: opts.threads,
            output_directory: opts.output,
        }
    }
}




// ============================================================================
fn run(config: Configuration) -> Result<(), Error> {
    let mut writer = CborWriter::new(&config.output_directory);
    let solver = Solver::new(config)?;
    let state = solver.initial_state();
    solver.run(state, &mut writer)?;
    Ok(())
}




// ============================================================================
fn main() {
    let opts = Opts::parse();

    if let Err(e) = SimpleLogger::new().with_level(opts.log_level).init() {
        eprintln!("could not install logger: {}", e);
    }

    if let Err(e) = run(opts.into()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
