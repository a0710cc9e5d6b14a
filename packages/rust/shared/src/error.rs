//! Error types for Prospector.
//!
//! Library crates use [`ProspectorError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only a few variants are fatal to a run: per-source and per-profile
//! failures are absorbed into stats/warnings by the orchestrator.

use std::path::PathBuf;

/// Top-level error type for all Prospector operations.
///
/// `Display` and `Error` are implemented by hand rather than via
/// `#[derive(thiserror::Error)]` because the `Adapter` variant's `source`
/// field is a source *name*, not an error cause, and thiserror would
/// otherwise treat any field named `source` as the `Error::source()`.
#[derive(Debug)]
pub enum ProspectorError {
    /// Configuration loading or validation error.
    Config { message: String },

    /// Input validation error (criteria, weights, ranks).
    Validation { message: String },

    /// A source adapter failed or timed out. Non-fatal; recorded in
    /// per-source stats.
    Adapter { source: String, message: String },

    /// Contact extraction failed for one profile. Non-fatal; the profile
    /// exports with empty contacts and a recorded warning.
    Extraction { profile: String, message: String },

    /// The run directory already exists. Fatal to the export step only;
    /// run data is preserved in memory and the caller may re-export.
    DuplicateRun { path: PathBuf },

    /// The export destination cannot be written. Fatal to the run.
    StorageUnwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The run was cancelled at a stage boundary.
    Cancelled { stage: String },

    /// Filesystem I/O error.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document or table serialization error.
    Serialize(String),
}

impl std::fmt::Display for ProspectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config { message } => write!(f, "config error: {message}"),
            Self::Validation { message } => write!(f, "validation error: {message}"),
            Self::Adapter { source, message } => {
                write!(f, "source '{source}' failed: {message}")
            }
            Self::Extraction { profile, message } => {
                write!(f, "contact extraction failed for '{profile}': {message}")
            }
            Self::DuplicateRun { path } => {
                write!(f, "run directory already exists: {}", path.display())
            }
            Self::StorageUnwritable { path, source } => {
                write!(f, "storage unwritable at {}: {source}", path.display())
            }
            Self::Cancelled { stage } => write!(f, "run cancelled before {stage}"),
            Self::Io { path, source } => write!(f, "I/O error at {path:?}: {source}"),
            Self::Serialize(msg) => write!(f, "serialize error: {msg}"),
        }
    }
}

impl std::error::Error for ProspectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StorageUnwritable { source, .. } | Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProspectorError>;

impl ProspectorError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an adapter failure for a named source.
    pub fn adapter(source: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Adapter {
            source: source.into(),
            message: msg.into(),
        }
    }

    /// Create an extraction failure for a named profile.
    pub fn extraction(profile: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Extraction {
            profile: profile.into(),
            message: msg.into(),
        }
    }

    /// Create a cancellation error naming the stage that was skipped.
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Mark an export destination as unwritable.
    pub fn storage_unwritable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageUnwritable {
            path: path.into(),
            source,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a serialize error from any displayable message.
    pub fn serialize(msg: impl std::fmt::Display) -> Self {
        Self::Serialize(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ProspectorError::config("missing export root");
        assert_eq!(err.to_string(), "config error: missing export root");

        let err = ProspectorError::adapter("yelp", "timed out after 20s");
        assert_eq!(err.to_string(), "source 'yelp' failed: timed out after 20s");

        let err = ProspectorError::DuplicateRun {
            path: PathBuf::from("/tmp/out/restaurants_New_York_NY_20250825_120000"),
        };
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn cancelled_names_stage() {
        let err = ProspectorError::cancelled("merging");
        assert_eq!(err.to_string(), "run cancelled before merging");
    }
}
