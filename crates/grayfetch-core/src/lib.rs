//! Grayfetch Core - concurrent image download and grayscale conversion.
//!
//! Takes a list of image URLs, downloads every one of them concurrently into
//! a staging directory, and hands each downloaded file to a fixed-size pool
//! of workers that write a grayscale copy into an output directory.
//!
//! # Architecture
//!
//! ```text
//! CSV → Links → Download (N tasks) → Staging channel → Convert (K workers) → Output
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use grayfetch_core::{links, Config, ConverterFactory, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> grayfetch_core::Result<()> {
//!     let config = Config::load()?;
//!     let converter = ConverterFactory::create(&config.converter)?;
//!     let pipeline = Pipeline::new(&config, converter)?;
//!
//!     let links = links::read_links("links.csv".as_ref())?;
//!     let summary = pipeline.run(links, "outputs".as_ref()).await?;
//!     println!("Converted {} of {}", summary.converted, summary.total_links);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod convert;
pub mod error;
pub mod links;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, ConverterBackend};
pub use convert::{BuiltinConverter, Converter, ConverterFactory, MagickConverter};
pub use error::{
    ConfigError, GrayfetchError, LinkSourceError, PipelineError, PipelineResult, Result,
};
pub use pipeline::{EventHook, Pipeline};
pub use types::{FailureStage, ItemFailure, Link, LocalImage, PipelineEvent, PipelineSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
