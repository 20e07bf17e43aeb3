//! Startup: config overrides, directories, link loading, converter selection.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use grayfetch_core::config::expand_path;
use grayfetch_core::{links, Config, Converter, ConverterFactory};

use super::{ProcessArgs, ProcessContext};

/// Validate input, prepare directories, and assemble everything needed for a run.
///
/// Every error returned here is fatal and happens before any download starts.
pub fn setup_run(args: &ProcessArgs, mut config: Config) -> anyhow::Result<ProcessContext> {
    apply_overrides(&mut config, args);

    let input = expand_path(&args.input);
    let links = links::read_links(&input)?;
    tracing::info!("Read {} link(s) from {:?}", links.len(), input);

    let output_dir = expand_path(&args.output);
    prepare_dirs(&output_dir, &config.staging_dir())?;

    let converter: Arc<dyn Converter> = ConverterFactory::create(&config.converter)
        .with_context(|| {
            format!(
                "Cannot set up the {} converter\n\n  Hint: install ImageMagick or pass --backend builtin.",
                config.converter.backend
            )
        })?;
    tracing::debug!("Using {} converter", converter.name());

    Ok(ProcessContext {
        config,
        links,
        output_dir,
        converter,
    })
}

/// Fold command-line flags into the loaded config.
pub(crate) fn apply_overrides(config: &mut Config, args: &ProcessArgs) {
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
    if let Some(dir) = &args.staging_dir {
        config.general.staging_dir = dir.clone();
    }
    if let Some(backend) = args.backend {
        config.converter.backend = backend.into();
    }
}

/// Create the output and staging directories if they are missing.
pub(crate) fn prepare_dirs(output_dir: &Path, staging_dir: &Path) -> anyhow::Result<()> {
    for dir in [output_dir, staging_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory {:?}", dir))?;
    }
    Ok(())
}
