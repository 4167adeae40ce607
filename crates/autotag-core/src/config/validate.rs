//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let detection = &self.detection;
        if !(0.0..=1.0).contains(&detection.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "detection.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&detection.iou_threshold) {
            return Err(ConfigError::ValidationError(
                "detection.iou_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if detection.input_size == 0 {
            return Err(ConfigError::ValidationError(
                "detection.input_size must be > 0".into(),
            ));
        }
        if detection.max_detections == 0 {
            return Err(ConfigError::ValidationError(
                "detection.max_detections must be > 0".into(),
            ));
        }
        if detection.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "detection.model must not be empty".into(),
            ));
        }
        if self.discovery.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "discovery.extensions must list at least one extension".into(),
            ));
        }
        if self.metadata.exiftool_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "metadata.exiftool_path must not be empty".into(),
            ));
        }
        if self.metadata.tag.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "metadata.tag must not be empty".into(),
            ));
        }
        if self.metadata.separator.is_empty() {
            return Err(ConfigError::ValidationError(
                "metadata.separator must not be empty".into(),
            ));
        }
        if self.metadata.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "metadata.timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_invalid_confidence() {
        let mut config = Config::default();
        config.detection.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));

        config.detection.confidence_threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_validate_accepts_threshold_bounds() {
        let mut config = Config::default();
        config.detection.confidence_threshold = 0.0;
        assert!(config.validate().is_ok());
        config.detection.confidence_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.discovery.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("discovery.extensions"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.metadata.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("metadata.timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_blank_tag() {
        let mut config = Config::default();
        config.metadata.tag = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("metadata.tag"));
    }
}
