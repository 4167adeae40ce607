//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where ONNX models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.autotag/models"),
        }
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions to pick up, compared case-sensitively (like a `*.jpg` glob)
    pub extensions: Vec<String>,

    /// Follow symbolic links while walking
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string()],
            follow_links: true,
        }
    }
}

/// Object detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Model name, resolved to `{model_dir}/{model}.onnx`
    pub model: String,

    /// Minimum class confidence for a detection to count (inclusive)
    pub confidence_threshold: f32,

    /// IoU above which overlapping boxes of the same class are suppressed
    pub iou_threshold: f32,

    /// Square input resolution expected by the model
    pub input_size: u32,

    /// Maximum detections kept per image after NMS
    pub max_detections: usize,

    /// Optional class-name file (one name per line) overriding the model's names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_file: Option<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model: "yolov8x".to_string(),
            confidence_threshold: 0.4,
            iou_threshold: 0.45,
            input_size: 640,
            max_detections: 300,
            labels_file: None,
        }
    }
}

/// Metadata tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Path or name of the exiftool executable
    pub exiftool_path: String,

    /// Tag that holds the keyword list
    pub tag: String,

    /// Separator between tags in the serialized list
    pub separator: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            exiftool_path: "exiftool".to_string(),
            tag: "XMP:Subject".to_string(),
            separator: ", ".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
            decode_timeout_ms: 10000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the summary with a 4-space indent
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
