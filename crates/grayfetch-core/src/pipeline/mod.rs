//! The concurrent download-and-convert pipeline.
//!
//! ```text
//! links ─► dispatch ─► N × download ─► staging channel ─► K × worker ─► converter
//! ```
//!
//! - **download**: fetch one link to a staging file
//! - **dispatch**: spawn one download task per link (unbounded)
//! - **staging**: unbounded MPMC handoff of downloaded files
//! - **workers**: fixed-size pool draining the staging channel
//! - **shutdown**: closes the channel once all downloads are done
//! - **processor**: wires the stages together

pub mod dispatch;
pub mod download;
pub mod processor;
pub mod shutdown;
pub mod staging;
pub mod workers;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::types::PipelineEvent;

// Re-exports for convenient access
pub use dispatch::{dispatch_downloads, DownloadReport};
pub use download::Downloader;
pub use processor::Pipeline;
pub use shutdown::{Draining, ShutdownCoordinator};
pub use staging::{staging_channel, StagingReceiver, StagingSender};
pub use workers::{ConversionPool, ConversionReport};

/// Callback receiving per-item progress events.
pub type EventHook = Arc<dyn Fn(PipelineEvent) + Send + Sync>;

pub(crate) fn emit(hook: &Option<EventHook>, event: PipelineEvent) {
    if let Some(hook) = hook {
        hook(event);
    }
}
