//! Progress bar and end-of-run summary.

use std::fmt::Write as _;
use std::path::Path;

use grayfetch_core::{PipelineEvent, PipelineSummary};
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar counting links that reached a final state.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("downloading...");
    pb
}

/// Event hook that advances `pb` once per link, whether it converted or failed.
pub fn track_progress(pb: ProgressBar) -> impl Fn(PipelineEvent) + Send + Sync + 'static {
    move |event| match event {
        PipelineEvent::Downloaded { .. } => {}
        PipelineEvent::DownloadFailed { .. }
        | PipelineEvent::Converted { .. }
        | PipelineEvent::ConversionFailed { .. } => {
            pb.inc(1);
            pb.set_message(format!("{:.1} img/sec", pb.per_sec()));
        }
    }
}

/// Print a formatted summary table to stderr.
pub fn print_summary(summary: &PipelineSummary, output_dir: &Path) {
    eprint!("{}", format_summary(summary, output_dir));
}

fn format_summary(summary: &PipelineSummary, output_dir: &Path) -> String {
    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.converted as f64 / secs
    } else {
        0.0
    };

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  ====================================");
    let _ = writeln!(out, "               Summary");
    let _ = writeln!(out, "  ====================================");
    let _ = writeln!(out, "    Downloaded:   {:>8}", summary.downloaded);
    let _ = writeln!(out, "    Converted:    {:>8}", summary.converted);
    if summary.download_failures > 0 {
        let _ = writeln!(out, "    Download failed:  {:>4}", summary.download_failures);
    }
    if summary.conversion_failures > 0 {
        let _ = writeln!(out, "    Convert failed:   {:>4}", summary.conversion_failures);
    }
    let _ = writeln!(out, "  ------------------------------------");
    let _ = writeln!(out, "    Total links:  {:>8}", summary.total_links);
    let _ = writeln!(out, "    Duration:     {:>7.1}s", secs);
    let _ = writeln!(out, "    Rate:         {:>7.1} img/sec", rate);
    let _ = writeln!(out, "    Output:       {}", output_dir.display());
    let _ = writeln!(out, "  ====================================");

    if !summary.failures.is_empty() {
        let mut failures: Vec<_> = summary.failures.iter().collect();
        failures.sort_by_key(|f| f.id);
        let _ = writeln!(out, "    Failed links:");
        for failure in failures {
            let _ = writeln!(out, "      #{} [{}] {}", failure.id, failure.stage, failure.link);
        }
    }
    out
}
