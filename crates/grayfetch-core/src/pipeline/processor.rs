//! Pipeline orchestration: wires downloads, staging, and conversion together.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::dispatch::dispatch_downloads;
use super::download::Downloader;
use super::shutdown::ShutdownCoordinator;
use super::staging::staging_channel;
use super::workers::ConversionPool;
use super::EventHook;
use crate::config::Config;
use crate::convert::Converter;
use crate::error::Result;
use crate::types::{FailureStage, Link, PipelineEvent, PipelineSummary};

/// The download-and-grayscale pipeline.
///
/// A `Pipeline` can be run any number of times; each run brackets its work
/// with one `initialize`/`terminate` pair on the converter.
pub struct Pipeline {
    downloader: Arc<Downloader>,
    converter: Arc<dyn Converter>,
    workers: usize,
    output_suffix: String,
    events: Option<EventHook>,
}

impl Pipeline {
    /// Create a pipeline from config and a conversion backend.
    pub fn new(config: &Config, converter: Arc<dyn Converter>) -> Result<Self> {
        let downloader = Downloader::new(config)?;
        Ok(Self::from_parts(
            downloader,
            converter,
            config.worker_count(),
            &config.converter.output_suffix,
        ))
    }

    /// Assemble a pipeline from pre-built parts.
    pub fn from_parts(
        downloader: Downloader,
        converter: Arc<dyn Converter>,
        workers: usize,
        output_suffix: &str,
    ) -> Self {
        Self {
            downloader: Arc::new(downloader),
            converter,
            workers: workers.max(1),
            output_suffix: output_suffix.to_string(),
            events: None,
        }
    }

    /// Override the number of conversion workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Install a per-item progress callback.
    pub fn with_events<F>(mut self, on_event: F) -> Self
    where
        F: Fn(PipelineEvent) + Send + Sync + 'static,
    {
        self.events = Some(Arc::new(on_event));
        self
    }

    /// Number of conversion workers a run will use.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn converter_name(&self) -> &'static str {
        self.converter.name()
    }

    /// Download every link and write grayscale copies into `output_dir`.
    ///
    /// Only a converter initialization failure is returned as an error.
    /// Per-item failures are logged and reported in the summary.
    pub async fn run(&self, links: Vec<Link>, output_dir: &Path) -> Result<PipelineSummary> {
        let start = Instant::now();
        let total_links = links.len();

        self.converter.initialize().await?;
        tracing::debug!(
            "Starting pipeline: {} link(s), {} {} worker(s)",
            total_links,
            self.workers,
            self.converter.name()
        );

        let (sender, receiver) = staging_channel();
        let coordinator = ShutdownCoordinator::new(sender);
        let producer = coordinator.producer();

        let pool = ConversionPool::new(
            self.workers,
            self.converter.clone(),
            output_dir.to_path_buf(),
            self.output_suffix.clone(),
            self.events.clone(),
        );

        let downloads = async {
            let report = dispatch_downloads(
                links,
                self.downloader.clone(),
                producer,
                self.events.clone(),
            )
            .await;
            // Every download task has been joined: no send can be in flight.
            let draining = coordinator.close();
            (report, draining)
        };

        let ((download_report, draining), conversion_report) =
            tokio::join!(downloads, pool.run(receiver));
        draining.finish();

        self.converter.terminate().await;

        let mut failures = download_report.failures;
        failures.extend(conversion_report.failures);
        let download_failures = failures
            .iter()
            .filter(|f| f.stage == FailureStage::Download)
            .count();

        let summary = PipelineSummary {
            total_links,
            downloaded: download_report.downloaded,
            download_failures,
            converted: conversion_report.converted,
            conversion_failures: failures.len() - download_failures,
            failures,
            elapsed: start.elapsed(),
        };
        tracing::debug!(
            "Pipeline finished in {:?}: {} converted, {} failed",
            summary.elapsed,
            summary.converted,
            summary.failed()
        );
        Ok(summary)
    }
}
