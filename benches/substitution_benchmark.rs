//! Benchmarks for variable substitution and scope merging.
//!
//! These measure placeholder resolution over call URLs, headers, and
//! bodies to keep an eye on regex and lookup costs as scopes grow.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::BTreeMap;

use courier::variables::scope::placeholder_names;
use courier::variables::{merged_scope, substitute, substitute_pairs};

/// Build a variable scope with a given number of filler entries plus the
/// handful of names the benchmark templates reference.
fn generate_scope(num_vars: usize) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for i in 0..num_vars {
        vars.insert(format!("var_{}", i), format!("value_{}", i));
    }
    vars.insert("host".to_string(), "https://api.example.com".to_string());
    vars.insert("token".to_string(), "bearer_token_12345".to_string());
    vars.insert("api-key".to_string(), "api_key_67890".to_string());
    vars.insert("userId".to_string(), "user_123".to_string());
    vars
}

/// Build a template with a given number of placeholder references.
fn generate_template(num_refs: usize) -> String {
    let mut template = String::from("{host}/api/v1/users/{userId}?key={api-key}&auth={token}");
    for i in 0..num_refs {
        template.push_str(&format!("&p{}={{var_{}}}", i, i % 100));
    }
    template
}

fn bench_substitute_simple(c: &mut Criterion) {
    let vars = generate_scope(10);
    let template = "{host}/users/{userId}?api_key={api-key}";

    c.bench_function("substitute_simple", |b| {
        b.iter(|| substitute(black_box(template), black_box(&vars)))
    });
}

fn bench_substitute_large_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitute_large_scope");

    for scope_size in [10, 100, 500, 1000].iter() {
        let vars = generate_scope(*scope_size);
        let template = generate_template(10);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_vars", scope_size)),
            scope_size,
            |b, _| b.iter(|| substitute(black_box(&template), black_box(&vars))),
        );
    }

    group.finish();
}

fn bench_substitute_many_refs(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitute_many_refs");

    for num_refs in [10, 50, 100, 500].iter() {
        let vars = generate_scope(100);
        let template = generate_template(*num_refs);

        group.throughput(Throughput::Elements(*num_refs as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_refs", num_refs)),
            num_refs,
            |b, _| b.iter(|| substitute(black_box(&template), black_box(&vars))),
        );
    }

    group.finish();
}

/// Scanning a template for the names it references, as `add` does when
/// seeding a new variable set.
fn bench_placeholder_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("placeholder_names");

    for num_refs in [10, 50, 100, 500].iter() {
        let template = generate_template(*num_refs);

        group.throughput(Throughput::Elements(*num_refs as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_refs", num_refs)),
            num_refs,
            |b, _| b.iter(|| placeholder_names(black_box(&template))),
        );
    }

    group.finish();
}

fn bench_substitute_missing_vars(c: &mut Criterion) {
    let vars = generate_scope(10);
    let template = "{host}/users/{missingVar1}/posts/{missingVar2}?key={api-key}";

    c.bench_function("substitute_missing_vars", |b| {
        b.iter(|| substitute(black_box(template), black_box(&vars)))
    });
}

fn bench_substitute_no_vars(c: &mut Criterion) {
    let vars = generate_scope(10);
    let template = "https://api.example.com/users/123?auth=token123&accept=json";

    c.bench_function("substitute_no_vars", |b| {
        b.iter(|| substitute(black_box(template), black_box(&vars)))
    });
}

fn bench_substitute_large_body(c: &mut Criterion) {
    let vars = generate_scope(50);

    let mut body = String::from("{\n");
    for i in 0..100 {
        body.push_str(&format!("  \"field_{}\": \"{{var_{}}}\",\n", i, i % 50));
    }
    body.push_str("}");

    let mut group = c.benchmark_group("substitute_large_body");
    group.throughput(Throughput::Bytes(body.len() as u64));

    group.bench_function("substitute_large_body", |b| {
        b.iter(|| substitute(black_box(&body), black_box(&vars)))
    });

    group.finish();
}

/// Substituting a realistic header list, as the pipeline does per call.
fn bench_substitute_headers(c: &mut Criterion) {
    let vars = generate_scope(50);
    let headers: Vec<(String, String)> = vec![
        ("Authorization".to_string(), "Bearer {token}".to_string()),
        ("X-API-Key".to_string(), "{api-key}".to_string()),
        ("X-User".to_string(), "{userId}".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ];

    c.bench_function("substitute_headers", |b| {
        b.iter(|| substitute_pairs(black_box(&headers), black_box(&vars)))
    });
}

fn bench_merged_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("merged_scope");

    for scope_size in [10, 100, 500, 1000].iter() {
        let persisted = generate_scope(*scope_size);
        let mut extracted = BTreeMap::new();
        for i in 0..(*scope_size / 10) {
            extracted.insert(format!("var_{}", i), format!("extracted_{}", i));
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_vars", scope_size)),
            scope_size,
            |b, _| b.iter(|| merged_scope(black_box(&persisted), black_box(&extracted))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_substitute_simple,
    bench_substitute_large_scope,
    bench_substitute_many_refs,
    bench_placeholder_names,
    bench_substitute_missing_vars,
    bench_substitute_no_vars,
    bench_substitute_large_body,
    bench_substitute_headers,
    bench_merged_scope
);

criterion_main!(benches);
