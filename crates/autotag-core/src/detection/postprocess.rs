//! Decoding raw YOLO output into thresholded, de-duplicated detections.
//!
//! YOLOv8-style heads produce one tensor of shape `[1, 4 + C, A]`: for each of
//! `A` anchors, a center-format box followed by `C` per-class scores. Some
//! exports transpose this to `[1, A, 4 + C]`; both layouts are accepted.

use std::collections::BTreeSet;

use crate::types::{BoundingBox, Detection};

use super::labels::ClassNames;
use super::preprocess::Letterbox;

/// Thresholds applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum class confidence (inclusive)
    pub confidence: f32,
    /// IoU above which a lower-scoring box of the same class is dropped
    pub iou: f32,
    /// Maximum detections kept
    pub max_detections: usize,
}

/// Memory layout of the prediction tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `[1, 4 + C, A]`: attributes major
    AttributesFirst { attrs: usize, anchors: usize },
    /// `[1, A, 4 + C]`: anchors major
    AnchorsFirst { attrs: usize, anchors: usize },
}

impl Layout {
    /// Infer the layout from the output shape.
    ///
    /// The attribute axis is the smaller of the last two: anchors number in
    /// the thousands while classes rarely exceed a few hundred.
    fn from_shape(shape: &[usize]) -> Option<Self> {
        let dims: Vec<usize> = match shape {
            [1, a, b] => vec![*a, *b],
            [a, b] => vec![*a, *b],
            _ => return None,
        };
        let (a, b) = (dims[0], dims[1]);
        if a.min(b) <= 4 {
            return None;
        }
        if a <= b {
            Some(Self::AttributesFirst {
                attrs: a,
                anchors: b,
            })
        } else {
            Some(Self::AnchorsFirst {
                attrs: b,
                anchors: a,
            })
        }
    }

    fn attrs(&self) -> usize {
        match *self {
            Self::AttributesFirst { attrs, .. } | Self::AnchorsFirst { attrs, .. } => attrs,
        }
    }

    fn anchors(&self) -> usize {
        match *self {
            Self::AttributesFirst { anchors, .. } | Self::AnchorsFirst { anchors, .. } => anchors,
        }
    }

    /// Value of attribute `attr` for anchor `anchor`.
    fn at(&self, data: &[f32], anchor: usize, attr: usize) -> f32 {
        match *self {
            Self::AttributesFirst { anchors, .. } => data[attr * anchors + anchor],
            Self::AnchorsFirst { attrs, .. } => data[anchor * attrs + attr],
        }
    }
}

/// Decode a raw prediction tensor into detections in source-image coordinates.
///
/// Per anchor only the best-scoring class is considered; it is kept iff its
/// score is at least `thresholds.confidence`. Survivors go through per-class
/// NMS and are returned by descending confidence.
///
/// Returns `None` if the shape is not a recognizable YOLO head or the data
/// length does not match it.
pub fn decode(
    data: &[f32],
    shape: &[usize],
    letterbox: &Letterbox,
    names: &ClassNames,
    thresholds: &Thresholds,
) -> Option<Vec<Detection>> {
    let layout = Layout::from_shape(shape)?;
    let (attrs, anchors) = (layout.attrs(), layout.anchors());
    if data.len() < attrs * anchors {
        return None;
    }

    let num_classes = attrs - 4;
    let mut candidates = Vec::new();

    for anchor in 0..anchors {
        let (class_id, confidence) = (0..num_classes)
            .map(|c| (c, layout.at(data, anchor, 4 + c)))
            .fold((0, f32::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });

        if !passes_threshold(confidence, thresholds.confidence) {
            continue;
        }

        let cx = layout.at(data, anchor, 0);
        let cy = layout.at(data, anchor, 1);
        let w = layout.at(data, anchor, 2);
        let h = layout.at(data, anchor, 3);
        let model_box = BoundingBox::from_center(cx, cy, w, h);

        candidates.push(Detection {
            class_id,
            label: names.name_or_id(class_id),
            confidence,
            bbox: BoundingBox {
                x1: letterbox.unmap_x(model_box.x1),
                y1: letterbox.unmap_y(model_box.y1),
                x2: letterbox.unmap_x(model_box.x2),
                y2: letterbox.unmap_y(model_box.y2),
            },
        });
    }

    Some(non_max_suppression(
        candidates,
        thresholds.iou,
        thresholds.max_detections,
    ))
}

/// The confidence gate: a score equal to the threshold is accepted.
pub fn passes_threshold(confidence: f32, threshold: f32) -> bool {
    confidence >= threshold
}

/// Greedy per-class NMS, keeping at most `max_detections`.
pub fn non_max_suppression(
    mut candidates: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Unique labels of a detection list.
pub fn labels(detections: &[Detection]) -> BTreeSet<String> {
    detections.iter().map(|d| d.label.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds {
        confidence: 0.4,
        iou: 0.45,
        max_detections: 300,
    };

    fn identity_letterbox() -> Letterbox {
        Letterbox::compute(640, 640, 640)
    }

    /// Build an attributes-first tensor from per-anchor rows of `[cx, cy, w, h, scores...]`.
    fn attributes_first(rows: &[Vec<f32>]) -> (Vec<f32>, Vec<usize>) {
        let attrs = rows[0].len();
        let anchors = rows.len();
        let mut data = vec![0.0; attrs * anchors];
        for (a, row) in rows.iter().enumerate() {
            for (k, v) in row.iter().enumerate() {
                data[k * anchors + a] = *v;
            }
        }
        (data, vec![1, attrs, anchors])
    }

    fn row(cx: f32, scores: &[f32]) -> Vec<f32> {
        let mut r = vec![cx, 100.0, 40.0, 40.0];
        r.extend_from_slice(scores);
        r
    }

    /// Pad to enough anchors that the attribute axis is the smaller one.
    fn padded(mut rows: Vec<Vec<f32>>, classes: usize) -> Vec<Vec<f32>> {
        while rows.len() < 4 + classes + 1 {
            rows.push(row(600.0, &vec![0.0; classes]));
        }
        rows
    }

    #[test]
    fn test_below_threshold_excluded() {
        let names = ClassNames::coco();
        let mut scores = vec![0.0; 80];
        scores[0] = 0.39;
        let (data, shape) = attributes_first(&padded(vec![row(100.0, &scores)], 80));

        let dets = decode(&data, &shape, &identity_letterbox(), &names, &THRESHOLDS).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(passes_threshold(0.4, 0.4));
        assert!(!passes_threshold(0.3999, 0.4));
    }

    #[test]
    fn test_best_class_per_anchor() {
        let names = ClassNames::coco();
        let mut scores = vec![0.0; 80];
        scores[16] = 0.9; // dog
        scores[15] = 0.5; // cat, lower than dog on the same anchor
        let (data, shape) = attributes_first(&padded(vec![row(100.0, &scores)], 80));

        let dets = decode(&data, &shape, &identity_letterbox(), &names, &THRESHOLDS).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "dog");
        assert!((dets[0].bbox.x1 - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_nms_merges_overlapping_same_class() {
        let names = ClassNames::coco();
        let mut person = vec![0.0; 80];
        person[0] = 0.8;
        let mut person_weaker = vec![0.0; 80];
        person_weaker[0] = 0.7;
        let mut car = vec![0.0; 80];
        car[2] = 0.6;

        let rows = padded(
            vec![
                row(100.0, &person),
                row(102.0, &person_weaker),
                row(101.0, &car),
                row(400.0, &person_weaker),
            ],
            80,
        );
        let (data, shape) = attributes_first(&rows);

        let dets = decode(&data, &shape, &identity_letterbox(), &names, &THRESHOLDS).unwrap();
        let found: Vec<_> = dets.iter().map(|d| (d.label.as_str(), d.confidence)).collect();
        assert_eq!(found, vec![("person", 0.8), ("person", 0.7), ("car", 0.6)]);
        assert_eq!(
            labels(&dets).into_iter().collect::<Vec<_>>(),
            vec!["car", "person"]
        );
    }

    #[test]
    fn test_anchors_first_layout() {
        let names = ClassNames::coco();
        let mut scores = vec![0.0; 80];
        scores[2] = 0.95;
        let rows = padded(vec![row(100.0, &scores)], 80);
        // Anchors-first needs more anchors than attributes, which padding guarantees
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        let shape = vec![1, rows.len(), 84];
        assert!(rows.len() > 84);

        let dets = decode(&data, &shape, &identity_letterbox(), &names, &THRESHOLDS).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "car");
    }

    #[test]
    fn test_unknown_class_gets_placeholder_name() {
        let names = ClassNames::from_metadata_dict("{0: 'only'}").unwrap();
        let (data, shape) = attributes_first(&padded(vec![row(100.0, &[0.1, 0.9])], 2));

        let dets = decode(&data, &shape, &identity_letterbox(), &names, &THRESHOLDS).unwrap();
        assert_eq!(dets[0].label, "class_1");
    }

    #[test]
    fn test_max_detections_cap() {
        let names = ClassNames::coco();
        let mut scores = vec![0.0; 80];
        scores[0] = 0.9;
        let rows: Vec<_> = (0..100).map(|i| row(i as f32 * 50.0, &scores)).collect();
        let (data, shape) = attributes_first(&rows);

        let thresholds = Thresholds {
            max_detections: 3,
            ..THRESHOLDS
        };
        let dets = decode(&data, &shape, &identity_letterbox(), &names, &thresholds).unwrap();
        assert_eq!(dets.len(), 3);
    }

    #[test]
    fn test_rejects_bad_shape() {
        let names = ClassNames::coco();
        let lb = identity_letterbox();
        assert!(decode(&[0.0; 8], &[1, 2, 4], &lb, &names, &THRESHOLDS).is_none());
        assert!(decode(&[0.0; 8], &[1, 84, 8400], &lb, &names, &THRESHOLDS).is_none());
        assert!(decode(&[0.0; 8], &[8], &lb, &names, &THRESHOLDS).is_none());
    }
}
