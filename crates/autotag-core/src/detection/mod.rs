//! Object detection with a YOLO model running locally via ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use autotag_core::detection::{DetectionEngine, Detector};
//! use autotag_core::Config;
//!
//! let config = Config::default();
//! let engine = DetectionEngine::load(&config, &config.model_path())?;
//! let detections = engine.detect(&decoded.image, path)?;
//! let labels = DetectionEngine::labels(&detections);
//! ```

pub mod labels;
pub mod postprocess;
pub mod preprocess;
pub(crate) mod yolo;

use std::collections::BTreeSet;
use std::path::Path;

use image::DynamicImage;

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::Detection;

pub use self::labels::ClassNames;
pub use self::postprocess::Thresholds;

use self::preprocess::preprocess;
use self::yolo::YoloSession;

/// Turns a decoded image into thresholded detections.
///
/// [`DetectionEngine`] is the ONNX-backed implementation; the pipeline only
/// depends on this trait.
pub trait Detector {
    fn detect(&self, image: &DynamicImage, path: &Path) -> Result<Vec<Detection>, PipelineError>;
}

/// Engine that turns an image into thresholded detections.
///
/// Loaded once per run and read-only afterwards.
pub struct DetectionEngine {
    session: YoloSession,
    names: ClassNames,
    thresholds: Thresholds,
    input_size: u32,
}

impl DetectionEngine {
    /// Load a YOLO ONNX model and resolve its class table.
    ///
    /// Class names come from, in order: the configured labels file, the
    /// model's embedded `names` metadata, the built-in COCO list.
    pub fn load(config: &Config, model_path: &Path) -> Result<Self, PipelineError> {
        if !model_path.exists() {
            return Err(PipelineError::ModelNotFound(model_path.to_path_buf()));
        }

        tracing::info!("Loading detection model from {:?}", model_path);
        let session = YoloSession::load(model_path)?;

        let names = match config.labels_file() {
            Some(path) => ClassNames::from_file(&path)?,
            None => match session.embedded_names().and_then(ClassNames::from_metadata_dict) {
                Some(names) => names,
                None => {
                    tracing::warn!(
                        "Model carries no class names; falling back to the COCO class list"
                    );
                    ClassNames::coco()
                }
            },
        };
        tracing::info!("Detection model loaded ({} classes)", names.len());

        Ok(Self {
            session,
            names,
            thresholds: Thresholds {
                confidence: config.detection.confidence_threshold,
                iou: config.detection.iou_threshold,
                max_detections: config.detection.max_detections,
            },
            input_size: config.detection.input_size,
        })
    }

    /// Unique labels of a detection list, sorted.
    pub fn labels(detections: &[Detection]) -> BTreeSet<String> {
        postprocess::labels(detections)
    }

    /// The class table in use.
    pub fn class_names(&self) -> &ClassNames {
        &self.names
    }

    /// The thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

impl Detector for DetectionEngine {
    /// Detect objects in an image, keeping only those at or above the confidence threshold.
    fn detect(&self, image: &DynamicImage, path: &Path) -> Result<Vec<Detection>, PipelineError> {
        let (tensor, letterbox) = preprocess(image, self.input_size);
        let output = self.session.run(&tensor, path)?;

        postprocess::decode(
            &output.data,
            &output.shape,
            &letterbox,
            &self.names,
            &self.thresholds,
        )
        .ok_or_else(|| PipelineError::Detection {
            path: path.to_path_buf(),
            message: format!("Unexpected prediction shape: {:?}", output.shape),
        })
    }
}
