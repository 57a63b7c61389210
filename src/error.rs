//! Error types for hapmosaic.
//!
//! `GenomeError` covers the segment store itself. `Error` is what the file
//! adapters and the CLI deal in: it wraps I/O, CSV and store failures.

use thiserror::Error;

use crate::interval::Position;

/// Failures raised by [`crate::genome::Genome`] operations. All of them are
/// local to the call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// Unknown chromosome name, negative start, or `end < start`.
    #[error("invalid interval {chrom}:{start}-{end}: {reason}")]
    InvalidInterval {
        chrom: String,
        start: Position,
        end: Position,
        reason: &'static str,
    },

    /// Founder label outside the fixed founder set while validation is on.
    #[error("unknown founder: {0}")]
    UnknownFounder(String),

    /// A read-side range query that fails the interval checks.
    #[error("invalid query {chrom}:{start}-{end}: {reason}")]
    InvalidQuery {
        chrom: String,
        start: Position,
        end: Position,
        reason: &'static str,
    },
}

/// Errors from the hapfile and haplotype-table adapters.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Genome(#[from] GenomeError),

    /// Malformed record at a 1-based line number.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
