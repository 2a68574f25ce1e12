//! Filter evaluation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use metafilter_core::proto::FilterNode;
use metafilter_core::{AttributeDef, AttributeRegistry, AttributeType, FilterEvaluator, Record};
use serde_json::json;

fn registry() -> AttributeRegistry {
    AttributeRegistry::new()
        .with_attribute(AttributeDef::new("title", AttributeType::String))
        .with_attribute(AttributeDef::new("description", AttributeType::String))
        .with_attribute(AttributeDef::new("tags", AttributeType::String).multivalued())
        .with_attribute(AttributeDef::new("location", AttributeType::Geometry))
        .with_attribute(AttributeDef::new("created", AttributeType::Date))
        .with_attribute(AttributeDef::new("resolution", AttributeType::Integer))
}

fn records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("title", format!("Record {} alpha", i))
                .with("description", "a coastal survey of the northern shelf")
                .with("tags", json!(["resource", format!("batch-{}", i % 10)]))
                .with(
                    "location",
                    format!("POINT({} {})", (i % 180) as f64 - 90.0, (i % 90) as f64 - 45.0),
                )
                .with("created", format!("2020-01-{:02}T00:00:00Z", i % 28 + 1))
                .with("resolution", i % 100)
        })
        .collect()
}

fn compile(cql: &str) -> FilterNode {
    metafilter_lang::parse_and_compile(cql).unwrap()
}

fn bench_leaf(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate/leaf");

    let registry = registry();
    let evaluator = FilterEvaluator::new(&registry);
    let data = records(1_000);

    let cases = [
        ("eq", "resolution = 42"),
        ("range", "resolution >= 20"),
        ("ilike", "title ILIKE '*alpha*'"),
        ("any_text", "anyText ILIKE 'survey'"),
        ("before", "created BEFORE 2020-01-15T00:00:00Z"),
        ("intersects", "INTERSECTS(anyGeo, POLYGON((-10 -10, -10 10, 10 10, 10 -10, -10 -10)))"),
        ("dwithin", "DWITHIN(anyGeo, POINT(0 0), 500, kilometers)"),
    ];

    for (name, cql) in cases {
        let tree = compile(cql);
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, tree| {
            b.iter(|| black_box(evaluator.filter(tree, &data).unwrap().len()));
        });
    }

    group.finish();
}

fn bench_combinator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate/combinator");

    let registry = registry();
    let evaluator = FilterEvaluator::new(&registry);
    let data = records(1_000);

    let tree = compile(
        "(anyText ILIKE 'alpha' OR tags = 'batch-3') AND resolution < 50 \
         AND NOT (created AFTER 2020-01-20)",
    );
    group.bench_function("mixed", |b| {
        b.iter(|| black_box(evaluator.filter(&tree, &data).unwrap().len()));
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate/parse");

    for cql in [
        "title ILIKE 'alpha*'",
        "(a = 1 OR b = 2) AND NOT c ILIKE 'x*' AND DWITHIN(anyGeo, POINT(1 2), 5, km)",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(cql.len()), cql, |b, cql| {
            b.iter(|| black_box(compile(cql)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_leaf, bench_combinator, bench_parse);
criterion_main!(benches);
