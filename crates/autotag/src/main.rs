//! autotag CLI - detect objects in JPEG images and write them into XMP tags.
//!
//! Walks a directory for `.jpg` files, runs a YOLO detector over each one,
//! merges the detected labels into the image's `XMP:Subject` list through
//! exiftool, and prints a JSON summary of filename to labels.
//!
//! # Usage
//!
//! ```bash
//! # Tag every JPEG under ./photos
//! autotag ./photos
//!
//! # Detect only, do not touch the files
//! autotag ./photos --dry-run --output labels.json
//!
//! # Use a different model and threshold
//! autotag ./photos --model ~/models/yolov8n.onnx --confidence 0.5
//! ```

use clap::Parser;

mod cli;
mod logging;

/// autotag - detect objects in JPEG images and record them as keyword tags.
#[derive(Parser, Debug)]
#[command(name = "autotag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "AUTOTAG_CONFIG")]
    config: Option<std::path::PathBuf>,

    #[command(flatten)]
    process: cli::process::ProcessArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => {
            let path = cli::expand_path(path);
            autotag_core::Config::load_from(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config from {}: {e}", path.display())
            })?
        }
        None => match autotag_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Config file: {}",
                    autotag_core::Config::default_path().display()
                );
                autotag_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("autotag v{}", autotag_core::VERSION);

    cli::process::execute(cli.process, config).await
}
