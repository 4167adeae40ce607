//! The tagging run: discover images, detect objects, merge tags, report.

mod batch;
mod setup;

use clap::Args;
use std::path::PathBuf;

use autotag_core::{Config, ImageTagger, ProcessOptions};

use batch::{print_summary, process_batch, write_summary};
use setup::{load_engine, probe_exiftool, setup_processor};

/// Arguments for a tagging run.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Directory (scanned recursively for .jpg files) or a single image
    #[arg(required = true)]
    pub input: PathBuf,

    /// ONNX detection model (defaults to {model_dir}/{detection.model}.onnx)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Minimum confidence for a detection to become a tag
    #[arg(long, value_parser = parse_confidence)]
    pub confidence: Option<f32>,

    /// Detect and report only; never read or write image metadata
    #[arg(long)]
    pub dry_run: bool,

    /// Write the JSON summary to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Everything a run needs once config and CLI overrides are resolved.
pub(crate) struct ProcessContext {
    pub tagger: ImageTagger,
    pub options: ProcessOptions,
    pub config: Config,
    pub model_path: PathBuf,
    pub pretty: bool,
}

/// Execute a tagging run.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_processor(&args, config)?;

    tracing::info!("Searching for images in: {}", args.input.display());
    let files = ctx.tagger.discover(&args.input);
    tracing::info!("Found {} images.", files.len());

    if files.is_empty() {
        tracing::warn!("No images found. Exiting.");
        return Ok(());
    }

    let engine = load_engine(&ctx)?;
    probe_exiftool(&ctx).await;

    let report = process_batch(&ctx, &engine, &files).await;
    tracing::info!(
        "Processed {} images with detected objects.",
        report.summary.len()
    );

    write_summary(&report.summary, args.output.as_deref(), ctx.pretty)?;
    print_summary(&report.stats, report.elapsed);

    Ok(())
}

/// Parse a confidence threshold in `[0, 1]`.
fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("confidence must be between 0.0 and 1.0, got {value}"))
    }
}
