use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an extraction run.
///
/// Parse failures are not listed here: they are recovered per file by the
/// regex fallback and only surface as log records.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("The \"{}\" file does not exist.", .0.display())]
    MissingResource(PathBuf),

    #[error("Failed to read file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid fallback pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid exclude glob pattern: {pattern}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Syntax error reported by the JavaScript parser for one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at line {line})")]
pub struct ParseError {
    pub message: String,
    /// 1-based line of the offending token
    pub line: usize,
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
