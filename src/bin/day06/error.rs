use std::io;

use thiserror::Error;

use crate::grid::GridError;
use crate::instruction::{Instruction, ParseError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    BadLine { line: usize, source: ParseError },

    #[error("instruction {index} ({instruction}) was rejected: {source}")]
    Rejected {
        index: usize,
        instruction: Instruction,
        source: GridError,
    },

    #[error("bad log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to set up logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to set up worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
