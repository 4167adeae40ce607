//! Core data types produced by the autotag pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tags::TagSet;

/// Axis-aligned box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Build a box from center coordinates and size.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);
        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Intersection over union; 0.0 for degenerate boxes.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = self.intersection(other);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// A single detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class index in the model's lookup table
    pub class_id: usize,

    /// Human-readable class name
    pub label: String,

    /// Class confidence from 0.0 to 1.0
    pub confidence: f32,

    /// Location in the source image
    pub bbox: BoundingBox,
}

/// Outcome of running one image through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedImage {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion (the summary key)
    pub file_name: String,

    /// Unique labels detected at or above the confidence threshold
    pub labels: TagSet,

    /// Every kept detection, after NMS
    pub detections: Vec<Detection>,

    /// Existing tags merged with `labels`, as written back to the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_tags: Option<TagSet>,

    /// Whether the merged tags were written to the file
    pub metadata_written: bool,
}

impl ProcessedImage {
    /// Whether any object passed the confidence threshold.
    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }
}

/// Counters accumulated over a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Images that went through detection
    pub processed: u64,

    /// Images with at least one confident detection
    pub tagged: u64,

    /// Images whose metadata was updated
    pub written: u64,

    /// Images that failed before detection finished
    pub failed: u64,

    /// Metadata read failures (treated as no existing tags)
    pub read_errors: u64,

    /// Metadata write failures (file left unchanged)
    pub write_errors: u64,
}
