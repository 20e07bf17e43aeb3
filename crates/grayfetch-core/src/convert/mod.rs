//! Grayscale conversion backends.
//!
//! The pipeline treats conversion as an opaque path-in/path-out call behind
//! the [`Converter`] trait. Two backends are provided: the ImageMagick CLI
//! and an in-process fallback built on the `image` crate.

pub(crate) mod builtin;
pub(crate) mod converter;
pub(crate) mod magick;

pub use builtin::BuiltinConverter;
pub use converter::{output_path_for, Converter, ConverterFactory};
pub use magick::MagickConverter;
