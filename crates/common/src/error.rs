//! Error types shared across Storyreel crates.

use std::path::PathBuf;

/// Top-level error type for Storyreel operations.
///
/// None of these are retried internally. Callers decide whether a retry
/// makes sense.
#[derive(Debug, thiserror::Error)]
pub enum StoryreelError {
    /// Malformed or missing declarative fields.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A referenced file could not be found in the asset directory.
    #[error("Missing asset '{reference}' (searched {searched})")]
    MissingAsset { reference: String, searched: PathBuf },

    /// A file exists (or was expected) but cannot be read or probed.
    #[error("Unreadable asset {path}: {message}")]
    Asset { path: PathBuf, message: String },

    /// The external engine could not be started or exited non-zero.
    #[error("Engine execution failed ({status}): {diagnostics}")]
    EngineExecution { status: String, diagnostics: String },

    /// The engine reported success but wrote nothing.
    #[error("Engine finished but produced no output at {path}")]
    OutputMissing { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StoryreelError.
pub type StoryreelResult<T> = Result<T, StoryreelError>;

impl StoryreelError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn missing_asset(reference: impl Into<String>, searched: impl Into<PathBuf>) -> Self {
        Self::MissingAsset {
            reference: reference.into(),
            searched: searched.into(),
        }
    }

    pub fn asset(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Asset {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn engine_execution(status: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self::EngineExecution {
            status: status.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Whether the error was raised by the declarative config itself.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_carries_diagnostics_verbatim() {
        let err = StoryreelError::engine_execution(
            "exit status: 1",
            "[AVFilterGraph] No such filter: 'zoompam'",
        );
        let text = err.to_string();
        assert!(text.contains("exit status: 1"));
        assert!(text.contains("No such filter: 'zoompam'"));
    }

    #[test]
    fn test_output_missing_is_distinct_from_execution_failure() {
        let err = StoryreelError::OutputMissing {
            path: PathBuf::from("/tmp/out.mp4"),
        };
        assert!(matches!(err, StoryreelError::OutputMissing { .. }));
        assert!(!matches!(err, StoryreelError::EngineExecution { .. }));
        assert!(err.to_string().contains("/tmp/out.mp4"));
    }

    #[test]
    fn test_json_errors_count_as_config_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(StoryreelError::from(json_err).is_config());
        assert!(StoryreelError::config("no timeline").is_config());
        assert!(!StoryreelError::missing_asset("img01", "/assets").is_config());
    }
}
