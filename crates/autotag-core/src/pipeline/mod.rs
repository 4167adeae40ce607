//! Image processing pipeline components.
//!
//! This module contains all the stages of the per-image pipeline:
//! - **discovery**: Find JPEG files in directories
//! - **validate**: Pre-processing validation
//! - **decode**: Load and decode images
//! - **metadata**: Read and write tags through exiftool
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod discovery;
pub mod metadata;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use metadata::ExifTool;
pub use processor::{ImageTagger, MetadataOutcome, ProcessOptions, TaggedImage};
pub use validate::Validator;
