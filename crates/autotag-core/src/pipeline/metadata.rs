//! Reading and writing keyword tags through an external `exiftool` process.
//!
//! Two invocation forms are used:
//!
//! ```text
//! exiftool -sep ", " -XMP:Subject -s3 <file>                              # read
//! exiftool -sep ", " "-XMP:Subject=a, b" -overwrite_original <file>       # write
//! ```
//!
//! Each call is a separate process bounded by a timeout. Failures are
//! returned to the caller, which decides whether they are fatal.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::config::MetadataConfig;
use crate::error::PipelineError;
use crate::tags::TagSet;

/// Which direction a call goes, for error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Handle to the external metadata tool.
pub struct ExifTool {
    config: MetadataConfig,
}

impl ExifTool {
    /// Create a new handle with the given settings.
    pub fn new(config: MetadataConfig) -> Self {
        Self { config }
    }

    /// The configured tag name (e.g. `XMP:Subject`).
    pub fn tag(&self) -> &str {
        &self.config.tag
    }

    /// The configured list separator.
    pub fn separator(&self) -> &str {
        &self.config.separator
    }

    /// Arguments for reading the configured tag as a plain value.
    pub fn read_args(&self, path: &Path) -> Vec<OsString> {
        vec![
            "-sep".into(),
            self.config.separator.clone().into(),
            format!("-{}", self.config.tag).into(),
            "-s3".into(),
            path.as_os_str().to_owned(),
        ]
    }

    /// Arguments for overwriting the configured tag in place.
    pub fn write_args(&self, path: &Path, tags: &TagSet) -> Vec<OsString> {
        vec![
            "-sep".into(),
            self.config.separator.clone().into(),
            format!(
                "-{}={}",
                self.config.tag,
                tags.to_metadata_string(&self.config.separator)
            )
            .into(),
            "-overwrite_original".into(),
            path.as_os_str().to_owned(),
        ]
    }

    /// Report the tool version; used at startup to check it can be launched.
    pub async fn version(&self) -> Result<String, PipelineError> {
        let output = self
            .spawn(vec!["-ver".into()])
            .await
            .map_err(|e| PipelineError::ToolUnavailable {
                tool: self.config.exiftool_path.clone(),
                message: e.to_string(),
            })?
            .ok_or_else(|| PipelineError::ToolUnavailable {
                tool: self.config.exiftool_path.clone(),
                message: format!("no answer within {}ms", self.config.timeout_ms),
            })?;

        if !output.status.success() {
            return Err(PipelineError::ToolUnavailable {
                tool: self.config.exiftool_path.clone(),
                message: failure_message(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Read the tags currently stored in `path`.
    ///
    /// An image without the tag yields an empty set.
    pub async fn read_tags(&self, path: &Path) -> Result<TagSet, PipelineError> {
        let output = self.run(self.read_args(path), path, Access::Read).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(TagSet::from_metadata(&stdout, &self.config.separator))
    }

    /// Overwrite the tag in `path` with `tags`, modifying the file in place.
    pub async fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), PipelineError> {
        self.run(self.write_args(path, tags), path, Access::Write)
            .await
            .map(|_| ())
    }

    /// Run the tool for one file and map every failure mode to a stage error.
    async fn run(
        &self,
        args: Vec<OsString>,
        path: &Path,
        access: Access,
    ) -> Result<Output, PipelineError> {
        let to_error = |message: String| match access {
            Access::Read => PipelineError::MetadataRead {
                path: path.to_path_buf(),
                message,
            },
            Access::Write => PipelineError::MetadataWrite {
                path: path.to_path_buf(),
                message,
            },
        };

        let output = match self.spawn(args).await {
            Ok(Some(output)) => output,
            Ok(None) => {
                return Err(PipelineError::Timeout {
                    path: path.to_path_buf(),
                    stage: match access {
                        Access::Read => "metadata read".to_string(),
                        Access::Write => "metadata write".to_string(),
                    },
                    timeout_ms: self.config.timeout_ms,
                })
            }
            Err(e) => {
                return Err(to_error(format!(
                    "failed to run {}: {e}",
                    self.config.exiftool_path
                )))
            }
        };

        if output.status.success() {
            Ok(output)
        } else {
            Err(to_error(failure_message(&output)))
        }
    }

    /// Spawn the tool and collect its output. `Ok(None)` means the timeout hit.
    async fn spawn(&self, args: Vec<OsString>) -> std::io::Result<Option<Output>> {
        tracing::trace!("{} {:?}", self.config.exiftool_path, args);

        let child = Command::new(&self.config.exiftool_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match timeout(Duration::from_millis(self.config.timeout_ms), child).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// Trimmed stderr, or the exit status when stderr is empty.
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exiftool exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}
