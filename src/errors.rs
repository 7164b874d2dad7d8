use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `treesub`.
///
/// Everything below the entry point returns this type; `main` decides how a
/// failure is surfaced.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A rule pattern that does not compile as a regular expression.
    #[error("Pattern compilation failed for {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A data file line that cannot be turned into a rule.
    #[error("Malformed rule at {path}:{line}: {reason} (line was {content:?})")]
    MalformedRule {
        path: PathBuf,
        line: usize,
        reason: &'static str,
        content: String,
    },

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// An error that occurred during the processing of a single file.
    #[error("File processing failed for {path}: {source}")]
    Processing {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error from the `ignore` crate, which is used for directory traversal.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// The temp file could not be renamed onto its target.
    #[error("Tempfile error: {0}")]
    TempFile(#[from] tempfile::PersistError),

    /// An error related to JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, treesub::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps an error with the path of the file it concerns.
    pub fn processing(path: impl Into<PathBuf>, source: impl Into<Error>) -> Self {
        Error::Processing {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
