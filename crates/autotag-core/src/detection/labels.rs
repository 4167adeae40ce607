//! Class-id to name lookup for detection models.
//!
//! YOLO exports embed their class table in the ONNX custom metadata under the
//! `names` key, written as a dict literal: `{0: 'person', 1: 'bicycle', ...}`.
//! When a model carries no table, a plain text file (one name per line) or the
//! 80-class COCO list is used instead.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::PipelineError;

/// The 80 COCO classes, in the order YOLO models are trained on them.
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Lookup table from class id to display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    names: BTreeMap<usize, String>,
}

impl ClassNames {
    /// The built-in COCO table.
    pub fn coco() -> Self {
        Self {
            names: COCO_CLASSES
                .iter()
                .enumerate()
                .map(|(i, n)| (i, n.to_string()))
                .collect(),
        }
    }

    /// Parse the dict literal stored in YOLO ONNX metadata.
    ///
    /// Returns `None` if the value is not a well-formed, non-empty dict.
    pub fn from_metadata_dict(value: &str) -> Option<Self> {
        let body = value.trim().strip_prefix('{')?.strip_suffix('}')?;
        let mut names = BTreeMap::new();
        let mut chars = body.chars().peekable();

        loop {
            while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
                chars.next();
            }
            if chars.peek().is_none() {
                break;
            }

            let mut id = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                id.push(c);
                chars.next();
            }
            let id: usize = id.parse().ok()?;

            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            if chars.next()? != ':' {
                return None;
            }
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }

            let quote = chars.next().filter(|c| *c == '\'' || *c == '"')?;
            let mut name = String::new();
            loop {
                match chars.next()? {
                    '\\' => name.push(chars.next()?),
                    c if c == quote => break,
                    c => name.push(c),
                }
            }
            names.insert(id, name);
        }

        if names.is_empty() {
            None
        } else {
            Some(Self { names })
        }
    }

    /// Read names from a text file, one per line; blank lines are skipped.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Detection {
            path: path.to_path_buf(),
            message: format!("Cannot read labels file: {e}"),
        })?;
        let names: BTreeMap<usize, String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
            .map(|(i, l)| (i, l.to_string()))
            .collect();
        if names.is_empty() {
            return Err(PipelineError::Detection {
                path: path.to_path_buf(),
                message: "Labels file is empty".to_string(),
            });
        }
        Ok(Self { names })
    }

    /// Name for a class id.
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Name for a class id, or `class_<id>` for ids outside the table.
    pub fn name_or_id(&self, class_id: usize) -> String {
        self.get(class_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("class_{class_id}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coco_table() {
        let names = ClassNames::coco();
        assert_eq!(names.len(), 80);
        assert_eq!(names.get(0), Some("person"));
        assert_eq!(names.get(79), Some("toothbrush"));
        assert_eq!(names.get(80), None);
    }

    #[test]
    fn test_parse_metadata_dict() {
        let names =
            ClassNames::from_metadata_dict("{0: 'person', 1: 'traffic light', 2: \"it's\"}")
                .unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names.get(1), Some("traffic light"));
        assert_eq!(names.get(2), Some("it's"));
    }

    #[test]
    fn test_parse_metadata_dict_with_comma_in_name() {
        let names = ClassNames::from_metadata_dict("{0: 'a, b', 1: 'c'}").unwrap();
        assert_eq!(names.get(0), Some("a, b"));
        assert_eq!(names.get(1), Some("c"));
    }

    #[test]
    fn test_parse_metadata_dict_escaped_quote() {
        let names = ClassNames::from_metadata_dict(r"{0: 'it\'s'}").unwrap();
        assert_eq!(names.get(0), Some("it's"));
    }

    #[test]
    fn test_parse_metadata_dict_rejects_garbage() {
        assert!(ClassNames::from_metadata_dict("").is_none());
        assert!(ClassNames::from_metadata_dict("{}").is_none());
        assert!(ClassNames::from_metadata_dict("[0, 1]").is_none());
        assert!(ClassNames::from_metadata_dict("{zero: 'person'}").is_none());
        assert!(ClassNames::from_metadata_dict("{0: 'unterminated}").is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "cat\n\n dog \n").unwrap();

        let names = ClassNames::from_file(&path).unwrap();
        assert_eq!(names.get(0), Some("cat"));
        assert_eq!(names.get(1), Some("dog"));
    }

    #[test]
    fn test_from_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(ClassNames::from_file(&path).is_err());
    }

    #[test]
    fn test_name_or_id() {
        let names = ClassNames::coco();
        assert_eq!(names.name_or_id(16), "dog");
        assert_eq!(names.name_or_id(500), "class_500");
    }
}
