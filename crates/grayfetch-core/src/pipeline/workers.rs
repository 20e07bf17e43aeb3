//! Conversion worker pool: a fixed number of workers draining the staging
//! channel.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::FutureExt;

use super::staging::StagingReceiver;
use super::{emit, EventHook};
use crate::convert::{output_path_for, Converter};
use crate::types::{FailureStage, ItemFailure, LocalImage, PipelineEvent};

/// Outcome of the conversion stage.
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Output files written
    pub converted: usize,
    /// Staged images that produced no output
    pub failures: Vec<ItemFailure>,
}

impl ConversionReport {
    fn merge(&mut self, other: ConversionReport) {
        self.converted += other.converted;
        self.failures.extend(other.failures);
    }
}

/// State shared by every worker in the pool.
struct WorkerContext {
    converter: Arc<dyn Converter>,
    output_dir: PathBuf,
    output_suffix: String,
    events: Option<EventHook>,
}

/// Fixed-size pool of conversion workers.
///
/// Each worker converts one image at a time, so at most `size` conversions
/// are in flight.
pub struct ConversionPool {
    size: usize,
    ctx: Arc<WorkerContext>,
}

impl ConversionPool {
    /// Create a pool of `size` workers (at least one).
    pub fn new(
        size: usize,
        converter: Arc<dyn Converter>,
        output_dir: PathBuf,
        output_suffix: impl Into<String>,
        events: Option<EventHook>,
    ) -> Self {
        Self {
            size: size.max(1),
            ctx: Arc::new(WorkerContext {
                converter,
                output_dir,
                output_suffix: output_suffix.into(),
                events,
            }),
        }
    }

    /// Run every worker until the channel is closed and drained.
    pub async fn run(&self, receiver: StagingReceiver) -> ConversionReport {
        let mut handles = Vec::with_capacity(self.size);
        for worker in 0..self.size {
            let receiver = receiver.clone();
            let ctx = self.ctx.clone();
            handles.push(tokio::spawn(async move {
                worker_loop(worker, receiver, &ctx).await
            }));
        }
        drop(receiver);

        let mut report = ConversionReport::default();
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(worker_report) => report.merge(worker_report),
                Err(e) => tracing::error!("Conversion worker {worker} panicked: {e}"),
            }
        }
        report
    }
}

async fn worker_loop(
    worker: usize,
    receiver: StagingReceiver,
    ctx: &WorkerContext,
) -> ConversionReport {
    let mut report = ConversionReport::default();
    while let Some(image) = receiver.recv().await {
        let (id, link, input) = (image.id, image.link.clone(), image.path.clone());
        // A panicking converter costs one item, not the worker.
        match AssertUnwindSafe(convert_one(image, ctx)).catch_unwind().await {
            Ok(None) => report.converted += 1,
            Ok(Some(failure)) => report.failures.push(failure),
            Err(_) => {
                let message = "converter panicked".to_string();
                tracing::error!("Conversion failed for {:?}: {message}", input);
                emit(
                    &ctx.events,
                    PipelineEvent::ConversionFailed {
                        id,
                        input,
                        message: message.clone(),
                    },
                );
                report.failures.push(ItemFailure {
                    id,
                    link,
                    stage: FailureStage::Conversion,
                    message,
                });
            }
        }
    }
    tracing::trace!("Worker {worker} exiting: staging channel drained");
    report
}

async fn convert_one(image: LocalImage, ctx: &WorkerContext) -> Option<ItemFailure> {
    let output = output_path_for(&image.path, &ctx.output_dir, &ctx.output_suffix);
    tracing::info!("processing: {:?} to {:?}", image.path, output);

    match ctx.converter.grayscale(&image.path, &output).await {
        Ok(()) => {
            emit(
                &ctx.events,
                PipelineEvent::Converted {
                    id: image.id,
                    input: image.path,
                    output,
                },
            );
            None
        }
        Err(e) => {
            tracing::error!("{e}");
            let message = e.to_string();
            emit(
                &ctx.events,
                PipelineEvent::ConversionFailed {
                    id: image.id,
                    input: image.path,
                    message: message.clone(),
                },
            );
            Some(ItemFailure {
                id: image.id,
                link: image.link,
                stage: FailureStage::Conversion,
                message,
            })
        }
    }
}
