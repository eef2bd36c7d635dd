//! Matching benchmarks.
//!
//! 1. Literal search (fast path vs. case-insensitive VM path)
//! 2. Capture-heavy find-all over a log-like subject
//! 3. A pathological nested quantifier bounded by a step budget

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

use regexrs::{MatchLimits, Regex, RegexBuilder, RegexOptions};

fn haystack(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("2024-01-{:02} INFO worker-{} finished job {} in {}ms\n", i % 28 + 1, i % 7, i, i * 3 % 1000))
        .collect()
}

fn bench_literal(c: &mut Criterion) {
    let mut group = c.benchmark_group("match/literal");
    group.measurement_time(Duration::from_secs(5));

    let text = haystack(2_000) + "needle";
    group.throughput(Throughput::Bytes(text.len() as u64));

    let exact = Regex::with_options("needle", RegexOptions::empty()).unwrap();
    let folded = Regex::with_options("needle", RegexOptions::CASE_INSENSITIVE).unwrap();
    for (name, regex) in [("exact", &exact), ("case_insensitive", &folded)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| black_box(regex.find_first(black_box(text))));
        });
    }
    group.finish();
}

fn bench_captures(c: &mut Criterion) {
    let mut group = c.benchmark_group("match/captures");
    group.measurement_time(Duration::from_secs(5));

    let regex = Regex::new(
        "(\\d{4})-(\\d{2})-(\\d{2}) (\\w+) ([\\w-]+) finished job (\\d+) in (\\d+)ms",
        RegexOptions::empty(),
        &["year", "month", "day", "level", "worker", "job", "ms"],
    )
    .unwrap();

    for lines in [10usize, 100, 1_000] {
        let text = haystack(lines);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("find_all", lines), &text, |b, text| {
            b.iter(|| regex.find_all(black_box(text)).filter_map(|m| m.group_named("ms")).count());
        });
        group.bench_with_input(BenchmarkId::new("replace_all", lines), &text, |b, text| {
            b.iter(|| regex.replace_all(black_box(text), "${worker}: $6"));
        });
    }
    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("match/pathological");
    group.sample_size(20);

    let regex = RegexBuilder::new("(a+)+$")
        .options(RegexOptions::empty())
        .limits(MatchLimits::default().with_step_budget(100_000))
        .build()
        .unwrap();
    let subject = format!("{}!", "a".repeat(28));
    group.bench_function("budgeted", |b| {
        b.iter(|| regex.try_find_at(black_box(&subject), 0).is_err());
    });
    group.finish();
}

criterion_group!(benches, bench_literal, bench_captures, bench_pathological);
criterion_main!(benches);
