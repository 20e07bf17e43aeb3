//! Configuration validation.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.pipeline.staging_extension;
        if ext.is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.staging_extension must not be empty".into(),
            ));
        }
        if ext.contains(['/', '\\', '.']) {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.staging_extension must be a bare extension, got {ext:?}"
            )));
        }
        let suffix = &self.converter.output_suffix;
        if suffix.is_empty() {
            return Err(ConfigError::ValidationError(
                "converter.output_suffix must not be empty".into(),
            ));
        }
        if suffix.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "converter.output_suffix must not contain a path separator, got {suffix:?}"
            )));
        }
        if self.converter.colorspace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "converter.colorspace must not be empty".into(),
            ));
        }
        if self.general.staging_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.staging_dir must not be empty".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}
