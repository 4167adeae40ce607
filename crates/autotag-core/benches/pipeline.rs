//! Benchmarks for the CPU-side stages of the autotag pipeline.
//!
//! Run with: cargo bench -p autotag-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::DynamicImage;

use autotag_core::detection::postprocess::{self, Thresholds};
use autotag_core::detection::preprocess::{preprocess, Letterbox};
use autotag_core::detection::ClassNames;
use autotag_core::TagSet;

/// A YOLOv8 640 head: 84 attributes over 8400 anchors, with a sprinkle of hits.
fn synthetic_prediction() -> (Vec<f32>, Vec<usize>) {
    let (attrs, anchors) = (84usize, 8400usize);
    let mut data = vec![0.01f32; attrs * anchors];
    for anchor in (0..anchors).step_by(97) {
        data[anchor] = (anchor % 640) as f32;
        data[anchors + anchor] = ((anchor / 640) * 40 % 640) as f32;
        data[2 * anchors + anchor] = 40.0;
        data[3 * anchors + anchor] = 40.0;
        let class = anchor % 80;
        data[(4 + class) * anchors + anchor] = 0.3 + (anchor % 7) as f32 * 0.1;
    }
    (data, vec![1, attrs, anchors])
}

fn benchmark_decode_output(c: &mut Criterion) {
    let (data, shape) = synthetic_prediction();
    let names = ClassNames::coco();
    let letterbox = Letterbox::compute(1920, 1080, 640);
    let thresholds = Thresholds {
        confidence: 0.4,
        iou: 0.45,
        max_detections: 300,
    };

    c.bench_function("yolo_decode_8400", |b| {
        b.iter(|| {
            let _ = postprocess::decode(
                black_box(&data),
                &shape,
                &letterbox,
                &names,
                &thresholds,
            );
        })
    });
}

fn benchmark_preprocess(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);

    c.bench_function("letterbox_640", |b| {
        b.iter(|| {
            let _ = preprocess(black_box(&img), 640);
        })
    });
}

fn benchmark_tag_merge(c: &mut Criterion) {
    let existing = TagSet::from_metadata(
        "vacation, beach, family, 2019, sunset, dog, umbrella, person",
        ", ",
    );
    let detected: TagSet = ["person", "dog", "surfboard", "boat", "umbrella"]
        .into_iter()
        .collect();

    c.bench_function("tag_merge", |b| {
        b.iter(|| {
            let merged = black_box(&existing).union(black_box(&detected));
            let _ = merged.to_metadata_string(", ");
        })
    });
}

criterion_group!(
    benches,
    benchmark_decode_output,
    benchmark_preprocess,
    benchmark_tag_merge
);
criterion_main!(benches);
