//! Run setup: CLI overrides, model loading, metadata tool probe.

use anyhow::Context;

use autotag_core::{Config, DetectionEngine, ImageTagger, PipelineError, ProcessOptions};

use super::{ProcessArgs, ProcessContext};
use crate::cli::expand_path;

/// Apply CLI overrides to the config and assemble the run context.
///
/// The model is not loaded here, so a run with nothing to process never
/// touches it.
pub fn setup_processor(args: &ProcessArgs, mut config: Config) -> anyhow::Result<ProcessContext> {
    if !args.input.exists() {
        tracing::warn!("Input path does not exist: {}", args.input.display());
    }

    if let Some(confidence) = args.confidence {
        config.detection.confidence_threshold = confidence;
    }
    config
        .validate()
        .context("Invalid configuration after applying command-line options")?;

    let model_path = match &args.model {
        Some(path) => expand_path(path),
        None => config.model_path(),
    };

    let options = ProcessOptions {
        dry_run: args.dry_run,
    };
    let pretty = config.output.pretty && !args.compact;

    Ok(ProcessContext {
        tagger: ImageTagger::new(&config),
        options,
        config,
        model_path,
        pretty,
    })
}

/// Load the detection model. Failure here aborts the run.
pub fn load_engine(ctx: &ProcessContext) -> anyhow::Result<DetectionEngine> {
    let engine = DetectionEngine::load(&ctx.config, &ctx.model_path).map_err(|e| match e {
        PipelineError::ModelNotFound(path) => anyhow::anyhow!(
            "Model not found: {}\n\n  \
             Hint: export a YOLOv8 model to ONNX (e.g. `yolo export model={}.pt format=onnx`)\n  \
             and place it there, or pass --model <FILE>.",
            path.display(),
            ctx.config.detection.model
        ),
        other => anyhow::Error::new(other).context("Failed to load detection model"),
    })?;

    tracing::debug!(
        "Detection thresholds: confidence >= {}, IoU {}",
        engine.thresholds().confidence,
        engine.thresholds().iou
    );
    Ok(engine)
}

/// Check that exiftool can be launched. A missing tool is only a warning:
/// every read and write then fails per image and the batch carries on.
pub async fn probe_exiftool(ctx: &ProcessContext) {
    if ctx.options.dry_run {
        tracing::debug!("Dry run: metadata will not be read or written");
        return;
    }
    match ctx.tagger.exiftool().version().await {
        Ok(version) => tracing::debug!("exiftool version {version}"),
        Err(e) => tracing::warn!("{e}. Tags cannot be read or written."),
    }
}
