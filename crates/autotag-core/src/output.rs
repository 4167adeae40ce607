//! The run summary and its JSON output.
//!
//! The summary maps each image's filename to the labels detected in it.
//! Images without confident detections are left out.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::types::ProcessedImage;

/// Filename to detected labels, in filename order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Summary {
    entries: BTreeMap<String, Vec<String>>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an image's labels under its filename.
    ///
    /// Images with no labels are skipped. Returns the labels previously
    /// stored under the same filename, if a file with that name was already
    /// recorded from another directory.
    pub fn record(&mut self, image: &ProcessedImage) -> Option<Vec<String>> {
        if !image.has_labels() {
            return None;
        }
        self.entries
            .insert(image.file_name.clone(), image.labels.to_vec())
    }

    /// Labels recorded for a filename.
    pub fn get(&self, file_name: &str) -> Option<&[String]> {
        self.entries.get(file_name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Writes JSON values, pretty-printed with a 4-space indent or compact.
pub struct OutputWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    /// Write one value followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut self.writer, formatter);
            item.serialize(&mut ser).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Convenience function to serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> io::Result<String> {
    let mut writer = OutputWriter::new(Vec::new(), pretty);
    writer.write(item)?;
    String::from_utf8(writer.into_inner()).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagSet;
    use std::path::PathBuf;

    fn image(name: &str, labels: &[&str]) -> ProcessedImage {
        ProcessedImage {
            file_path: PathBuf::from("/photos").join(name),
            file_name: name.to_string(),
            labels: labels.iter().copied().collect::<TagSet>(),
            detections: vec![],
            merged_tags: None,
            metadata_written: false,
        }
    }

    #[test]
    fn test_summary_skips_unlabelled() {
        let mut summary = Summary::new();
        summary.record(&image("empty.jpg", &[]));
        summary.record(&image("dog.jpg", &["dog", "person"]));

        assert_eq!(summary.len(), 1);
        assert!(summary.get("empty.jpg").is_none());
        assert_eq!(
            summary.get("dog.jpg").unwrap(),
            &["dog".to_string(), "person".to_string()]
        );
    }

    #[test]
    fn test_summary_same_name_replaces() {
        let mut summary = Summary::new();
        assert!(summary.record(&image("img.jpg", &["cat"])).is_none());
        let previous = summary.record(&image("img.jpg", &["car"]));

        assert_eq!(previous, Some(vec!["cat".to_string()]));
        assert_eq!(summary.get("img.jpg").unwrap(), &["car".to_string()]);
    }

    #[test]
    fn test_empty_summary_is_empty_object() {
        assert_eq!(to_json(&Summary::new(), false).unwrap(), "{}\n");
    }

    #[test]
    fn test_pretty_output_uses_four_spaces() {
        let mut summary = Summary::new();
        summary.record(&image("a.jpg", &["dog"]));

        let json = to_json(&summary, true).unwrap();
        assert_eq!(
            json,
            "{\n    \"a.jpg\": [\n        \"dog\"\n    ]\n}\n"
        );
    }

    #[test]
    fn test_compact_output() {
        let mut summary = Summary::new();
        summary.record(&image("b.jpg", &["tie", "person"]));
        summary.record(&image("a.jpg", &["cup"]));

        let json = to_json(&summary, false).unwrap();
        assert_eq!(json, "{\"a.jpg\":[\"cup\"],\"b.jpg\":[\"person\",\"tie\"]}\n");
    }
}
