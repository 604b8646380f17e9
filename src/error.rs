use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]

/**
 * Error to represent an invalid run configuration, or a failure to write or
 * read a solution snapshot. Every variant is fatal to the run.
 */
pub enum Error {
    InvalidFinalTime(f64),
    InvalidCfl(f64),
    InvalidCheckpointInterval,
    InvalidGridSize(i64, i64),
    InvalidWorkerCount(usize),
    InvalidLayout { layout: (i64, i64), size: (i64, i64) },
    HaloExceedsGrid { halo: i64, size: (i64, i64) },
    ThreadPool(String),
    Io { path: PathBuf, source: io::Error },
    Encode { path: PathBuf, message: String },
    Decode { path: PathBuf, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            InvalidFinalTime(t) => write!(fmt, "final time must be positive and finite: {}", t),
            InvalidCfl(c) => write!(fmt, "CFL number must be positive and finite: {}", c),
            InvalidCheckpointInterval => write!(fmt, "checkpoint interval must be at least one step"),
            InvalidGridSize(nx, ny) => write!(fmt, "invalid grid size: {} x {}", nx, ny),
            InvalidWorkerCount(n) => write!(fmt, "invalid number of workers: {}", n),
            InvalidLayout { layout, size } => write!(
                fmt,
                "block layout {} x {} does not fit a {} x {} grid",
                layout.0, layout.1, size.0, size.1
            ),
            HaloExceedsGrid { halo, size } => write!(
                fmt,
                "halo width {} exceeds the {} x {} grid",
                halo, size.0, size.1
            ),
            ThreadPool(message) => write!(fmt, "could not start thread pool: {}", message),
            Io { path, source } => write!(fmt, "{}: {}", path.display(), source),
            Encode { path, message } => write!(fmt, "{}: encoding failed: {}", path.display(), message),
            Decode { path, message } => write!(fmt, "{}: decoding failed: {}", path.display(), message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
