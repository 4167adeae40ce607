//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// JPEG start-of-image marker followed by the first marker prefix.
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Validates files before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File starts with the JPEG magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)
    }

    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 3];
        let bytes_read = file.read(&mut header).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file header: {}", e),
        })?;

        if bytes_read < header.len() {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !Self::is_jpeg_header(&header) {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: "not a JPEG (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    fn is_jpeg_header(header: &[u8; 3]) -> bool {
        *header == JPEG_MAGIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_jpeg() {
        assert!(Validator::is_jpeg_header(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_magic_bytes_png_rejected() {
        assert!(!Validator::is_jpeg_header(&[0x89, b'P', b'N']));
    }

    #[test]
    fn test_validate_missing_file() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator
            .validate(Path::new("/nonexistent/file.jpg"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_rejects_misnamed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.jpg");
        std::fs::write(&path, b"GIF89a not really").unwrap();

        let err = Validator::new(LimitsConfig::default())
            .validate(&path)
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_validate_rejects_tiny_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.jpg");
        std::fs::write(&path, [0xFF]).unwrap();

        let err = Validator::new(LimitsConfig::default())
            .validate(&path)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_reports_header_read_error() {
        // Opening a directory succeeds on Unix, reading from it fails
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("album.jpg");
        std::fs::create_dir(&path).unwrap();

        let err = Validator::new(LimitsConfig::default())
            .validate(&path)
            .unwrap_err();
        match err {
            PipelineError::Decode { message, .. } => {
                assert!(message.starts_with("Cannot read file header"), "{message}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_jpeg_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

        assert!(Validator::new(LimitsConfig::default()).validate(&path).is_ok());
    }
}
