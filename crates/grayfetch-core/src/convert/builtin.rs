//! In-process grayscale conversion using the `image` crate.
//!
//! Used when ImageMagick is not installed. Output format is inferred from
//! the output file extension.

use std::path::Path;

use async_trait::async_trait;

use super::converter::Converter;
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

impl BuiltinConverter {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous decode → grayscale → encode (runs in spawn_blocking).
    fn grayscale_sync(input: &Path, output: &Path) -> PipelineResult<()> {
        let img = image::ImageReader::open(input)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| PipelineError::Conversion {
                path: input.to_path_buf(),
                message: format!("Cannot open image: {e}"),
            })?
            .decode()
            .map_err(|e| PipelineError::Conversion {
                path: input.to_path_buf(),
                message: format!("Cannot decode image: {e}"),
            })?;

        img.grayscale()
            .save(output)
            .map_err(|e| PipelineError::Conversion {
                path: input.to_path_buf(),
                message: format!("Cannot write {}: {e}", output.display()),
            })
    }
}

#[async_trait]
impl Converter for BuiltinConverter {
    async fn grayscale(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let input_owned = input.to_path_buf();
        let output_owned = output.to_path_buf();
        tokio::task::spawn_blocking(move || Self::grayscale_sync(&input_owned, &output_owned))
            .await
            .map_err(|e| PipelineError::Conversion {
                path: input.to_path_buf(),
                message: format!("Task join error: {e}"),
            })?
    }

    fn name(&self) -> &'static str {
        "builtin"
    }
}
