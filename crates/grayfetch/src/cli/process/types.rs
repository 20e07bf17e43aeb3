//! CLI enum types for the process command.

use clap::ValueEnum;
use grayfetch_core::ConverterBackend;

/// Grayscale conversion backend.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Backend {
    /// ImageMagick command-line tool
    Magick,
    /// In-process conversion, no external tool needed
    Builtin,
}

impl From<Backend> for ConverterBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Magick => ConverterBackend::Magick,
            Backend::Builtin => ConverterBackend::Builtin,
        }
    }
}
