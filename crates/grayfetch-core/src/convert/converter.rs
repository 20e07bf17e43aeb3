//! Converter trait, output naming, and backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ConverterBackend, ConverterConfig};
use crate::error::PipelineResult;

/// A grayscale conversion capability.
///
/// `initialize` and `terminate` bracket the whole pipeline run: the pipeline
/// calls each exactly once, before the first and after the last conversion.
/// `grayscale` is called concurrently from every worker and must not rely on
/// state shared between calls.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Process-wide setup. Failure aborts the run before any download starts.
    async fn initialize(&self) -> PipelineResult<()> {
        Ok(())
    }

    /// Convert `input` to grayscale and write the result to `output`.
    async fn grayscale(&self, input: &Path, output: &Path) -> PipelineResult<()>;

    /// Process-wide teardown.
    async fn terminate(&self) {}

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Derive the output path for a staged input.
///
/// `inputs/image3.jpg` with suffix `-grayscaled` becomes
/// `<output_dir>/image3-grayscaled.jpg`. Inputs without an extension get
/// none on the output either.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    output_dir.join(file_name)
}

/// Builds the configured conversion backend.
pub struct ConverterFactory;

impl ConverterFactory {
    /// Create a converter from config.
    ///
    /// For the ImageMagick backend this resolves the binary on PATH, so a
    /// missing tool is reported here rather than on the first conversion.
    pub fn create(config: &ConverterConfig) -> PipelineResult<Arc<dyn Converter>> {
        match config.backend {
            ConverterBackend::Magick => {
                let converter = super::magick::MagickConverter::discover(
                    &config.binary,
                    &config.colorspace,
                )?;
                Ok(Arc::new(converter))
            }
            ConverterBackend::Builtin => Ok(Arc::new(super::builtin::BuiltinConverter::new())),
        }
    }
}
