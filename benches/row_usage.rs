//! Benchmarks for occupancy bitmap marking.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xlwrite::RowUsage;

/// Benchmark marking every column one at a time.
fn bench_single_column_marks(c: &mut Criterion) {
    c.bench_function("mark_16384_single_columns", |b| {
        b.iter(|| {
            let mut usage = RowUsage::new();
            for col in 0u16..16_384 {
                assert!(usage.try_mark(black_box(col), col));
            }
            usage
        })
    });
}

/// Benchmark marking the full domain in one call.
fn bench_full_domain_mark(c: &mut Criterion) {
    c.bench_function("mark_full_domain_once", |b| {
        b.iter(|| {
            let mut usage = RowUsage::new();
            assert!(usage.try_mark(black_box(0), 16_383));
            usage
        })
    });
}

/// Benchmark a typical report row: a handful of short spans, then conflict
/// probes against them.
fn bench_spans_with_conflict_probes(c: &mut Criterion) {
    c.bench_function("mark_spans_and_probe_conflicts", |b| {
        b.iter(|| {
            let mut usage = RowUsage::new();
            for start in (0u16..1_024).step_by(8) {
                assert!(usage.try_mark(black_box(start), start + 3));
            }
            for start in (0u16..1_024).step_by(8) {
                assert!(!usage.try_mark(black_box(start), start + 7));
            }
            usage
        })
    });
}

criterion_group!(
    benches,
    bench_single_column_marks,
    bench_full_domain_mark,
    bench_spans_with_conflict_probes
);
criterion_main!(benches);
