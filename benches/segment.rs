//! Criterion benchmarks for the segmentation engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use listsift::parser::scanner::segments;

fn synthetic_archive(messages: usize) -> String {
    let mut input = String::new();
    for i in 0..messages {
        input.push_str(&format!(
            "From: user{i}@example.com\nSubject: message {i}\nDate: Wed, 22 Nov 2000 07:15:50 +0000\n\nbody line one of message {i}\nbody line two\n\nanother paragraph\n\n"
        ));
    }
    input
}

fn synthetic_digest(messages: usize) -> String {
    let mut input = String::from(
        "From: Humanist Discussion Group <humanist@lists.example.org>\nSubject: digest\n\n",
    );
    for i in 0..messages {
        input.push_str(&format!(
            "--[{i}]------------------------------------------------------------\n        Date: Wed, 22 Nov 2000 07:15:50 +0000\n        From: person{i}@example.ac.uk\n        Subject: contribution {i}\n\nbody of contribution {i}\n\n"
        ));
    }
    input
}

fn bench_segment(c: &mut Criterion) {
    let from_framed = synthetic_archive(1000);
    let digest = synthetic_digest(1000);

    let mut group = c.benchmark_group("segment");

    group.throughput(Throughput::Bytes(from_framed.len() as u64));
    group.bench_function("from_framed_1k", |b| {
        b.iter(|| black_box(segments(black_box(from_framed.as_bytes())).count()))
    });

    group.throughput(Throughput::Bytes(digest.len() as u64));
    group.bench_function("digest_1k", |b| {
        b.iter(|| black_box(segments(black_box(digest.as_bytes())).count()))
    });

    group.finish();
}

criterion_group!(benches, bench_segment);
criterion_main!(benches);
