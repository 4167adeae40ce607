//! YOLO ONNX model session management and inference.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

/// ONNX metadata key holding the class table in YOLO exports.
const NAMES_METADATA_KEY: &str = "names";

/// Wraps an ONNX Runtime session for a YOLO detector.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct YoloSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Class table embedded in the model, if any.
    embedded_names: Option<String>,
}

/// Raw prediction tensor: flat data plus its shape.
pub struct RawOutput {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl YoloSession {
    /// Load a YOLO detector from an ONNX file.
    pub fn load(model_path: &Path) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::Detection {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Detection {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "images".to_string());

        let embedded_names = match session.metadata() {
            Ok(metadata) => metadata.custom(NAMES_METADATA_KEY),
            Err(e) => {
                tracing::debug!("Model metadata unavailable: {e}");
                None
            }
        };

        tracing::debug!(
            "Loaded YOLO model from {:?} (input: {:?}, outputs: {:?}, embedded names: {})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>(),
            embedded_names.is_some()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            embedded_names,
        })
    }

    /// The raw `names` metadata value, if the export carried one.
    pub fn embedded_names(&self) -> Option<&str> {
        self.embedded_names.as_deref()
    }

    /// Run inference on a preprocessed `[1, 3, S, S]` tensor and return the first output.
    pub fn run(&self, preprocessed: &Array4<f32>, path: &Path) -> Result<RawOutput, PipelineError> {
        // Pass (shape, flat data) to ort rather than relying on its ndarray interop.
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Detection {
                path: path.to_path_buf(),
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Detection {
            path: path.to_path_buf(),
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Detection {
            path: path.to_path_buf(),
            message: format!("ONNX inference failed: {e}"),
        })?;

        // Detection heads have a single output; take the first one.
        let (_, prediction) = outputs
            .iter()
            .next()
            .ok_or_else(|| PipelineError::Detection {
                path: path.to_path_buf(),
                message: "Model produced no outputs".to_string(),
            })?;

        let (shape, data) =
            prediction
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Detection {
                    path: path.to_path_buf(),
                    message: format!("Failed to extract prediction tensor: {e}"),
                })?;

        Ok(RawOutput {
            data: data.to_vec(),
            shape: shape.iter().map(|&d| d.max(0) as usize).collect(),
        })
    }
}
