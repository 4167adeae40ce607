//! Error types for the autotag pipeline.
//!
//! Errors are organized by stage so a failed image can be reported with the
//! file path and the step that went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for autotag operations.
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Model inference or output decoding failed
    #[error("Detection failed for {path}: {message}")]
    Detection { path: PathBuf, message: String },

    /// The ONNX model file is missing
    #[error("Model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Reading existing tags through the metadata tool failed
    #[error("Failed to read metadata from {path}: {message}")]
    MetadataRead { path: PathBuf, message: String },

    /// Writing merged tags through the metadata tool failed
    #[error("Failed to write metadata to {path}: {message}")]
    MetadataWrite { path: PathBuf, message: String },

    /// The metadata tool could not be launched at all
    #[error("Metadata tool {tool:?} is unavailable: {message}")]
    ToolUnavailable { tool: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Not a JPEG file
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl PipelineError {
    /// Short stage name for log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode { .. }
            | Self::FileTooLarge { .. }
            | Self::ImageTooLarge { .. }
            | Self::UnsupportedFormat { .. }
            | Self::FileNotFound(_) => "decode",
            Self::Detection { .. } | Self::ModelNotFound(_) => "detect",
            Self::MetadataRead { .. } => "read",
            Self::MetadataWrite { .. } | Self::ToolUnavailable { .. } => "write",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Convenience type alias for autotag results.
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
