//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where downloaded originals are written before conversion
    pub staging_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("inputs"),
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of conversion workers (0 = one per available CPU)
    pub workers: usize,

    /// Extension given to staged downloads (`image<id>.<ext>`)
    pub staging_extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            staging_extension: "jpg".to_string(),
        }
    }
}

/// Download stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Treat non-2xx HTTP responses as download failures.
    /// When false, whatever body the server returns is staged.
    pub reject_error_status: bool,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            reject_error_status: false,
            user_agent: format!("grayfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Which conversion backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterBackend {
    /// External ImageMagick binary
    #[default]
    Magick,
    /// In-process conversion with the `image` crate
    Builtin,
}

impl std::fmt::Display for ConverterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConverterBackend::Magick => write!(f, "magick"),
            ConverterBackend::Builtin => write!(f, "builtin"),
        }
    }
}

/// Conversion stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Conversion backend
    pub backend: ConverterBackend,

    /// ImageMagick binary (empty = search PATH for `magick`, then `convert`)
    pub binary: String,

    /// Target colorspace passed to `-set colorspace`
    pub colorspace: String,

    /// Suffix appended to the file stem of each output
    pub output_suffix: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            backend: ConverterBackend::Magick,
            binary: String::new(),
            colorspace: "Gray".to_string(),
            output_suffix: "-grayscaled".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
