//! The `grayfetch process` command.

mod report;
mod setup;
pub mod types;

pub use types::Backend;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use grayfetch_core::{Config, Converter, Link, Pipeline};

use report::{create_progress_bar, print_summary, track_progress};
use setup::setup_run;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// CSV file of image links
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for grayscale outputs (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of conversion workers (0 = one per CPU)
    #[arg(short, long, env = "GRAYFETCH_WORKERS")]
    pub workers: Option<usize>,

    /// Directory for downloaded originals (default from config: "inputs")
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Conversion backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub summary_json: bool,
}

/// Everything a run needs, assembled by `setup_run()`.
pub(crate) struct ProcessContext {
    pub config: Config,
    pub links: Vec<Link>,
    pub output_dir: PathBuf,
    pub converter: Arc<dyn Converter>,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_run(&args, config)?;

    if ctx.links.is_empty() {
        tracing::warn!("No links found in {:?}", args.input);
    }

    let progress = create_progress_bar(ctx.links.len() as u64);
    let pipeline = Pipeline::new(&ctx.config, ctx.converter)?
        .with_events(track_progress(progress.clone()));
    tracing::info!(
        "Processing {} link(s) with {} worker(s)",
        ctx.links.len(),
        pipeline.workers()
    );

    let summary = pipeline.run(ctx.links, &ctx.output_dir).await?;
    progress.finish_and_clear();

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &ctx.output_dir);
    }

    if !summary.is_complete() {
        tracing::warn!(
            "{} of {} link(s) did not produce an output",
            summary.failed(),
            summary.total_links
        );
    }

    Ok(())
}
