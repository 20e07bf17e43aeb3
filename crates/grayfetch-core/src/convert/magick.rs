//! ImageMagick backend: runs the `magick`/`convert` binary per image.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::converter::Converter;
use crate::error::{PipelineError, PipelineResult};

/// Binaries tried, in order, when no explicit binary is configured.
const CANDIDATES: &[&str] = &["magick", "convert"];

/// Converts images by invoking the ImageMagick command-line tool.
///
/// Each call runs `<binary> <input> -set colorspace <colorspace> <output>`
/// as a child process and waits for it. There is no timeout: a hung child
/// holds its worker until it exits.
#[derive(Debug, Clone)]
pub struct MagickConverter {
    binary_path: PathBuf,
    colorspace: String,
}

impl MagickConverter {
    /// Create a converter with an explicit binary path.
    pub fn new(binary_path: PathBuf, colorspace: impl Into<String>) -> Self {
        Self {
            binary_path,
            colorspace: colorspace.into(),
        }
    }

    /// Resolve the binary via PATH.
    ///
    /// An empty `binary` searches for `magick`, then `convert`.
    pub fn discover(binary: &str, colorspace: &str) -> PipelineResult<Self> {
        if !binary.is_empty() {
            let path = which::which(binary).map_err(|e| {
                PipelineError::ToolUnavailable(format!("{binary}: {e}"))
            })?;
            return Ok(Self::new(path, colorspace));
        }

        CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|path| Self::new(path, colorspace))
            .ok_or_else(|| {
                PipelineError::ToolUnavailable(
                    "ImageMagick not found in PATH (tried `magick`, `convert`)".to_string(),
                )
            })
    }

    fn command_args<'a>(&'a self, input: &'a Path, output: &'a Path) -> [&'a OsStr; 5] {
        [
            input.as_os_str(),
            OsStr::new("-set"),
            OsStr::new("colorspace"),
            OsStr::new(&self.colorspace),
            output.as_os_str(),
        ]
    }
}

#[async_trait]
impl Converter for MagickConverter {
    async fn initialize(&self) -> PipelineResult<()> {
        let output = Command::new(&self.binary_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| {
                PipelineError::ToolUnavailable(format!(
                    "failed to execute {}: {e}",
                    self.binary_path.display()
                ))
            })?;

        if !output.status.success() {
            return Err(PipelineError::ToolUnavailable(format!(
                "{} -version exited with {}",
                self.binary_path.display(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.lines().next().unwrap_or("unknown version");
        tracing::debug!("Using {} ({})", self.binary_path.display(), version.trim());
        Ok(())
    }

    async fn grayscale(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let result = Command::new(&self.binary_path)
            .args(self.command_args(input, output))
            .output()
            .await
            .map_err(|e| PipelineError::Conversion {
                path: input.to_path_buf(),
                message: format!("failed to execute {}: {e}", self.binary_path.display()),
            })?;

        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        Err(PipelineError::Conversion {
            path: input.to_path_buf(),
            message: format!("{} ({})", result.status, stderr.trim()),
        })
    }

    async fn terminate(&self) {
        tracing::debug!("Released {}", self.binary_path.display());
    }

    fn name(&self) -> &'static str {
        "magick"
    }
}
