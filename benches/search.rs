//! Performance benchmarks for spelunk
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use spelunk::query::parse_query;
use spelunk::text::{index_all, index_all_ignore_case, PermuteCache};

/// A few hundred KB of prose-like content with scattered needles.
fn build_haystack() -> String {
    let mut haystack = String::with_capacity(400_000);
    for i in 0..4000 {
        haystack.push_str("it is a truth universally acknowledged that a single man ");
        if i % 97 == 0 {
            haystack.push_str("test ");
        }
        haystack.push_str("in possession of a good fortune must be in want of a wife\n");
    }
    haystack
}

fn bench_index_all_vs_regex(c: &mut Criterion) {
    let haystack = build_haystack();
    let regex = regex::bytes::Regex::new("test").unwrap();

    let mut group = c.benchmark_group("literal_find_all");
    group.bench_function("index_all", |b| {
        b.iter(|| {
            let matches: Vec<[usize; 2]> =
                index_all(black_box(haystack.as_bytes()), black_box(b"test")).collect();
            matches
        })
    });
    group.bench_function("regex_find_all", |b| {
        b.iter(|| {
            let matches: Vec<[usize; 2]> = regex
                .find_iter(black_box(haystack.as_bytes()))
                .map(|m| [m.start(), m.end()])
                .collect();
            matches
        })
    });
    group.finish();
}

fn bench_index_all_ignore_case(c: &mut Criterion) {
    let haystack = build_haystack();
    let cache = PermuteCache::default();

    let mut group = c.benchmark_group("ignore_case");
    for needle in ["te", "test", "universally acknowledged"] {
        group.bench_with_input(BenchmarkId::from_parameter(needle), &needle, |b, &n| {
            b.iter(|| {
                index_all_ignore_case(
                    black_box(haystack.as_bytes()),
                    black_box(n),
                    -1,
                    &cache,
                )
            })
        });
    }
    group.finish();
}

/// The adversarial case for the prefix-probe strategy: a haystack of
/// nothing but two-byte runes, every one of them a candidate prefix
/// byte, with a single real match embedded.
fn bench_ignore_case_wide_rune_floor(c: &mut Criterion) {
    let mut haystack = "Ⱥ".repeat(1024);
    haystack.push_str("Ⱥtest");
    haystack.push_str(&"Ⱥ".repeat(1021));
    assert_eq!(haystack.len(), 4096);
    let cache = PermuteCache::default();

    c.bench_function("ignore_case_wide_rune_floor", |b| {
        b.iter(|| {
            let matches =
                index_all_ignore_case(black_box(haystack.as_bytes()), "Ⱥtest", -1, &cache);
            assert_eq!(matches.len(), 1);
            matches
        })
    });
}

fn bench_query_parsing(c: &mut Criterion) {
    let queries: Vec<Vec<String>> = [
        vec!["simple"],
        vec!["two", "words"],
        vec!["\"exact", "phrase\""],
        vec!["darcy", "NOT", "collins", "wickham~1", "/pr[e-i]de/"],
    ]
    .iter()
    .map(|q| q.iter().map(|t| t.to_string()).collect())
    .collect();

    let mut group = c.benchmark_group("query_parsing");
    for query in &queries {
        group.bench_with_input(
            BenchmarkId::from_parameter(query.join(" ")),
            query,
            |b, q| b.iter(|| parse_query(black_box(q))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_index_all_vs_regex,
    bench_index_all_ignore_case,
    bench_ignore_case_wide_rune_floor,
    bench_query_parsing
);
criterion_main!(benches);
