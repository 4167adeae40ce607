//! autotag core: detect objects in JPEG images and record them as keyword tags.
//!
//! # Architecture
//!
//! A linear per-file pipeline, run sequentially over a directory:
//!
//! ```text
//! Discover → Validate → Decode → Detect (YOLO) → Read tags → Merge → Write tags → Summary
//! ```
//!
//! Detection runs locally through ONNX Runtime. Tags are read and written by
//! an external `exiftool` process; failures there are logged per file and
//! never stop the batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use autotag_core::{Config, DetectionEngine, ImageTagger, ProcessOptions, Summary};
//!
//! #[tokio::main]
//! async fn main() -> autotag_core::Result<()> {
//!     let config = Config::load()?;
//!     let tagger = ImageTagger::new(&config);
//!     let engine = DetectionEngine::load(&config, &config.model_path())?;
//!
//!     let mut summary = Summary::new();
//!     for file in tagger.discover("./photos".as_ref()) {
//!         let tagged = tagger.process(&engine, &file.path, &ProcessOptions::default()).await?;
//!         summary.record(&tagged.image);
//!     }
//!     println!("{}", autotag_core::output::to_json(&summary, true)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod tags;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use detection::{DetectionEngine, Detector};
pub use error::{ConfigError, PipelineError, PipelineResult, Result, TaggerError};
pub use output::{OutputWriter, Summary};
pub use pipeline::{
    DiscoveredFile, ExifTool, ImageTagger, MetadataOutcome, ProcessOptions, TaggedImage,
};
pub use tags::TagSet;
pub use types::{BoundingBox, Detection, ProcessedImage, ProcessingStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
