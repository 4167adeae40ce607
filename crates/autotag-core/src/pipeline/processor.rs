//! Pipeline orchestration: validate, decode, detect, merge and write back.

use std::path::Path;

use crate::config::Config;
use crate::detection::{DetectionEngine, Detector};
use crate::error::PipelineError;
use crate::tags::TagSet;
use crate::types::{Detection, ProcessedImage};

use super::decode::ImageDecoder;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::metadata::ExifTool;
use super::validate::Validator;

/// Options for controlling per-image behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Detect and report, but never read or write image metadata
    pub dry_run: bool,
}

/// What happened to the image's metadata after detection.
#[derive(Debug)]
pub enum MetadataOutcome {
    /// Nothing detected, or dry run: metadata was not touched
    Untouched,
    /// Merged tags were written
    Written { merged: TagSet },
    /// Reading existing tags failed; the write went ahead with detected labels only
    WrittenWithoutExisting {
        merged: TagSet,
        read_error: PipelineError,
    },
    /// The write failed; the file is unchanged
    WriteFailed {
        merged: TagSet,
        read_error: Option<PipelineError>,
        write_error: PipelineError,
    },
}

/// Result of processing one image: the record plus the metadata outcome.
#[derive(Debug)]
pub struct TaggedImage {
    pub image: ProcessedImage,
    pub metadata: MetadataOutcome,
}

/// Runs the per-file pipeline.
///
/// The detector is loaded separately and passed in, so discovery can run
/// (and an empty run can finish) without loading a model.
pub struct ImageTagger {
    decoder: ImageDecoder,
    validator: Validator,
    discovery: FileDiscovery,
    exiftool: ExifTool,
}

impl ImageTagger {
    /// Create a new tagger with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.discovery.clone()),
            exiftool: ExifTool::new(config.metadata.clone()),
        }
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    /// The metadata tool handle.
    pub fn exiftool(&self) -> &ExifTool {
        &self.exiftool
    }

    /// Validate, decode and run detection on one file.
    pub async fn detect<D: Detector + ?Sized>(
        &self,
        detector: &D,
        path: &Path,
    ) -> Result<Vec<Detection>, PipelineError> {
        self.validator.validate(path)?;
        let decoded = self.decoder.decode(path).await?;
        tracing::trace!("Decoded {:?} ({}x{})", path, decoded.width, decoded.height);
        detector.detect(&decoded.image, path)
    }

    /// Process one image end to end.
    ///
    /// Only validation, decode and detection errors are returned. Metadata
    /// failures are reported in [`MetadataOutcome`] and never abort the image.
    pub async fn process<D: Detector + ?Sized>(
        &self,
        detector: &D,
        path: &Path,
        options: &ProcessOptions,
    ) -> Result<TaggedImage, PipelineError> {
        let start = std::time::Instant::now();
        tracing::info!("Processing {}", path.display());

        let detections = self.detect(detector, path).await?;
        let labels: TagSet = DetectionEngine::labels(&detections).into_iter().collect();

        if labels.is_empty() {
            tracing::info!(
                "No high-confidence objects detected in {}",
                path.display()
            );
        } else {
            tracing::info!(
                "Detected in {}: {}",
                path.display(),
                labels.to_metadata_string(self.exiftool.separator())
            );
        }

        let metadata = self.apply_metadata(path, &labels, options).await;

        let (merged_tags, metadata_written) = match &metadata {
            MetadataOutcome::Untouched => (None, false),
            MetadataOutcome::Written { merged }
            | MetadataOutcome::WrittenWithoutExisting { merged, .. } => {
                (Some(merged.clone()), true)
            }
            MetadataOutcome::WriteFailed { merged, .. } => (Some(merged.clone()), false),
        };

        tracing::debug!("Processed {:?} in {:?}", path, start.elapsed());

        Ok(TaggedImage {
            image: ProcessedImage {
                file_path: path.to_path_buf(),
                file_name: file_name(path),
                labels,
                detections,
                merged_tags,
                metadata_written,
            },
            metadata,
        })
    }

    /// Update the file's tags for a set of detected labels.
    ///
    /// With no labels, or in a dry run, exiftool is never invoked.
    pub async fn apply_metadata(
        &self,
        path: &Path,
        labels: &TagSet,
        options: &ProcessOptions,
    ) -> MetadataOutcome {
        if labels.is_empty() || options.dry_run {
            return MetadataOutcome::Untouched;
        }
        self.merge_and_write(path, labels).await
    }

    /// Merge detected labels with the stored tags and write the union back.
    ///
    /// A failed read is treated as "no existing tags"; a failed write leaves
    /// the file as it was.
    pub async fn merge_and_write(&self, path: &Path, labels: &TagSet) -> MetadataOutcome {
        let (existing, read_error) = match self.exiftool.read_tags(path).await {
            Ok(existing) => (existing, None),
            Err(e) => {
                tracing::warn!("Failed to retrieve metadata for {}: {e}", path.display());
                (TagSet::new(), Some(e))
            }
        };

        let merged = existing.union(labels);
        tracing::debug!(
            "Writing metadata to {}: {}",
            path.display(),
            merged.to_metadata_string(self.exiftool.separator())
        );

        match self.exiftool.write_tags(path, &merged).await {
            Ok(()) => match read_error {
                None => MetadataOutcome::Written { merged },
                Some(read_error) => MetadataOutcome::WrittenWithoutExisting { merged, read_error },
            },
            Err(write_error) => {
                tracing::error!("Failed to write metadata to {}: {write_error}", path.display());
                MetadataOutcome::WriteFailed {
                    merged,
                    read_error,
                    write_error,
                }
            }
        }
    }
}

/// Filename portion of a path, used as the summary key.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
