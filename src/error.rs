//! Error types shared by the scan pipeline.
//!
//! Scans never surface these to their callers directly: the entry points in
//! [`crate::scan`] turn any `ScanError` into a failed [`crate::ScanReport`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering, parsing or scanning a source tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Duplicate declaration of {qualified_name} in {first} and {second}")]
    DuplicateDeclaration {
        qualified_name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Source root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid reference pattern for {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Scan task failed: {0}")]
    Task(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Errors that a tolerant re-parse may get past
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DuplicateDeclaration { .. } | Self::Parse { .. })
    }
}

pub type ScanResult<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_is_retryable() {
        let err = ScanError::DuplicateDeclaration {
            qualified_name: "com.example.Foo".to_string(),
            first: PathBuf::from("a/Foo.java"),
            second: PathBuf::from("b/Foo.java"),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("com.example.Foo"));
    }

    #[test]
    fn test_missing_root_not_retryable() {
        let err = ScanError::MissingRoot(PathBuf::from("/nope"));
        assert!(!err.is_retryable());
    }
}
