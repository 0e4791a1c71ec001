//! # Analysis Benchmarks
//!
//! Performance benchmarks for the O(n²) relation extraction and the
//! analyses that consume its output.
//!
//! Run with: `cargo bench -p kenning-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kenning_core::{
    KnowledgePoint, PointId, RelationType, analyze_relations, build_graph, detect_gaps,
    find_key_points, generate_path, similarity,
};
use std::hint::black_box;

const WORDS: [&str; 12] = [
    "energy", "matter", "force", "motion", "cells", "genes", "atoms", "bonds", "waves", "light",
    "heat", "charge",
];

/// Create `size` points spread over 5 categories with overlapping vocabulary
/// and tags.
fn create_points(size: usize) -> Vec<KnowledgePoint> {
    (0..size)
        .map(|i| {
            let content = (0..6)
                .map(|k| WORDS[(i + k * 3) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ");
            KnowledgePoint::new(format!("kp-{i}"), content)
                .with_category(format!("category-{}", i % 5))
                .with_tags([WORDS[i % 4], WORDS[(i + 1) % 4], "basics"])
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_similarity(c: &mut Criterion) {
    let a = "photosynthesis converts light energy into chemical energy stored in glucose";
    let b = "chemical energy in glucose comes from light captured during photosynthesis";
    c.bench_function("similarity", |bench| {
        bench.iter(|| black_box(similarity(black_box(a), black_box(b))));
    });
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_relations");

    for size in [50, 200, 500].iter() {
        let points = create_points(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(analyze_relations(&points)));
        });
    }

    group.finish();
}

fn bench_consumers(c: &mut Criterion) {
    let points = create_points(200);
    let relations = analyze_relations(&points);
    let all_types = RelationType::all();
    let targets: Vec<PointId> = points.iter().rev().take(10).map(|p| p.id.clone()).collect();

    c.bench_function("build_graph_200", |b| {
        b.iter(|| black_box(build_graph(&points, &relations, &all_types)));
    });
    c.bench_function("find_key_points_200", |b| {
        b.iter(|| black_box(find_key_points(&relations, 5)));
    });
    c.bench_function("detect_gaps_200", |b| {
        b.iter(|| black_box(detect_gaps(&points, &relations)));
    });
    c.bench_function("generate_path_200", |b| {
        b.iter(|| black_box(generate_path(&points, &relations, &targets)));
    });
}

criterion_group!(benches, bench_similarity, bench_extraction, bench_consumers);
criterion_main!(benches);
