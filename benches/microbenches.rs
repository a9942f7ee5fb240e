//! Criterion microbenches for label parsing, rewriting and COCO parsing.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeMap;
use std::hint::black_box;

use kwtools::coco::{from_coco_slice, from_coco_str};
use kwtools::labels::{parse_labels, ClassId};
use kwtools::rewrite::{rewrite_label_text, RewriteMode};

// Include test fixtures at compile time (no file I/O during benchmark)
const COCO_FIXTURE: &str = include_str!("../tests/fixtures/sample.coco.json");

/// A label file of a few hundred lines with some noise mixed in.
fn label_fixture(with_confidence: bool) -> String {
    let mut text = String::new();
    for i in 0..500 {
        let class = i % 7;
        let x = (i % 100) as f64 / 100.0;
        if with_confidence {
            text.push_str(&format!("{} {:.3} 0.500 0.100 0.200 0.93\n", class, x));
        } else {
            text.push_str(&format!("{} {:.3} 0.500 0.100 0.200\n", class, x));
        }
        if i % 50 == 0 {
            text.push_str("garbage line\n\n");
        }
    }
    text
}

fn bench_label_parse(c: &mut Criterion) {
    let text = label_fixture(false);
    let mut group = c.benchmark_group("label_parse");
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("parse_labels", |b| {
        b.iter(|| black_box(parse_labels(black_box(&text))))
    });

    group.finish();
}

fn bench_label_rewrite(c: &mut Criterion) {
    let plain = label_fixture(false);
    let scored = label_fixture(true);
    let remap = RewriteMode::RemapClasses(BTreeMap::from([
        (ClassId::new(0), ClassId::new(5)),
        (ClassId::new(2), ClassId::new(7)),
    ]));

    let mut group = c.benchmark_group("label_rewrite");
    group.throughput(Throughput::Bytes(plain.len() as u64));

    group.bench_function("remap_classes", |b| {
        b.iter(|| black_box(rewrite_label_text(black_box(&plain), &remap)))
    });
    group.bench_function("strip_confidence", |b| {
        b.iter(|| {
            black_box(rewrite_label_text(
                black_box(&scored),
                &RewriteMode::StripConfidence,
            ))
        })
    });

    group.finish();
}

fn bench_coco_parse(c: &mut Criterion) {
    let bytes = COCO_FIXTURE.as_bytes();
    let mut group = c.benchmark_group("coco_parse");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("from_coco_str", |b| {
        b.iter(|| {
            let doc = from_coco_str(black_box(COCO_FIXTURE)).unwrap();
            black_box(doc)
        })
    });
    group.bench_function("from_coco_slice", |b| {
        b.iter(|| {
            let doc = from_coco_slice(black_box(bytes)).unwrap();
            black_box(doc)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_label_parse,
    bench_label_rewrite,
    bench_coco_parse,
);
criterion_main!(benches);
