use criterion::{Criterion, criterion_group, criterion_main};

use vigil_core::record::EventRecord;
use vigil_events::engine::{active_agents, count_by_type, sort_by_timestamp_desc, top_users};
use vigil_events::filter::{filter_by_recency, search};

fn sample_events(count: usize) -> Vec<EventRecord> {
    let types = ["user_login", "process_start", "file_access", "auth_failure"];
    let severities = ["low", "medium", "high"];
    (0..count)
        .map(|i| {
            EventRecord::new()
                .with(
                    "timestamp",
                    format!("2026-08-{:02}T{:02}:00:00", 1 + i % 28, i % 24),
                )
                .with("event_type", types[i % types.len()])
                .with("severity", severities[i % severities.len()])
                .with("hostname", format!("host-{}", i % 10))
                .with("user", format!("user-{}", i % 20))
                .with("process", format!("proc-{}", i % 15))
                .with("command", format!("/usr/bin/proc-{} --flag", i % 15))
        })
        .collect()
}

fn bench_sort(c: &mut Criterion) {
    let events = sample_events(10_000);
    c.bench_function("sort_by_timestamp_desc_10k", |b| {
        b.iter(|| {
            let mut copy = events.clone();
            sort_by_timestamp_desc(&mut copy);
            copy
        })
    });
}

fn bench_recency(c: &mut Criterion) {
    let events = sample_events(10_000);
    c.bench_function("filter_by_recency_10k", |b| {
        b.iter(|| filter_by_recency(events.clone(), 24))
    });
}

fn bench_search(c: &mut Criterion) {
    let events = sample_events(10_000);
    let mut group = c.benchmark_group("search_10k");
    group.bench_function("regex", |b| {
        b.iter(|| search(events.clone(), "user-1[0-9]"))
    });
    group.bench_function("substring_fallback", |b| {
        b.iter(|| search(events.clone(), "user-1["))
    });
    group.finish();
}

fn bench_aggregations(c: &mut Criterion) {
    let events = sample_events(10_000);
    let mut group = c.benchmark_group("aggregate_10k");
    group.bench_function("active_agents", |b| b.iter(|| active_agents(&events)));
    group.bench_function("top_users", |b| b.iter(|| top_users(&events, 10)));
    group.bench_function("count_by_type", |b| b.iter(|| count_by_type(&events)));
    group.finish();
}

criterion_group!(
    benches,
    bench_sort,
    bench_recency,
    bench_search,
    bench_aggregations
);
criterion_main!(benches);
