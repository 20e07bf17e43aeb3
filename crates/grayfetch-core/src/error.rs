//! Error types for the grayfetch pipeline.
//!
//! Startup errors (config, link source, tool discovery) abort the run.
//! Per-item errors (download, conversion) are carried as [`PipelineError`]
//! values inside the task that owns the item and never abort the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for grayfetch operations.
#[derive(Error, Debug)]
pub enum GrayfetchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The link CSV could not be read
    #[error("Link source error: {0}")]
    LinkSource(#[from] LinkSourceError),

    /// Pipeline errors that escape to the caller (tool setup only)
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors from reading the CSV of links.
#[derive(Error, Debug)]
pub enum LinkSourceError {
    /// The CSV file could not be opened
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be parsed (bad quoting, inconsistent field count, ...)
    #[error("Malformed CSV at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

/// Per-item pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Transport failure while fetching a link
    #[error("Download failed for {link}: {message}")]
    Download { link: String, message: String },

    /// Server answered with a non-success status
    #[error("Download failed for {link}: HTTP {status}")]
    HttpStatus { link: String, status: u16 },

    /// Could not create or write the staging file
    #[error("Cannot write staging file {path}: {message}")]
    StagingWrite { path: PathBuf, message: String },

    /// The conversion backend reported a failure
    #[error("Conversion failed for {path}: {message}")]
    Conversion { path: PathBuf, message: String },

    /// The conversion tool could not be found or initialized
    #[error("Conversion tool unavailable: {0}")]
    ToolUnavailable(String),
}

/// Convenience type alias for grayfetch results.
pub type Result<T> = std::result::Result<T, GrayfetchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_wraps_into_top_level() {
        let err: GrayfetchError = PipelineError::ToolUnavailable("convert".into()).into();
        assert!(err.to_string().contains("Conversion tool unavailable: convert"));
    }

    #[test]
    fn test_http_status_message_names_link() {
        let err = PipelineError::HttpStatus {
            link: "http://example.com/a.jpg".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Download failed for http://example.com/a.jpg: HTTP 404"
        );
    }
}
