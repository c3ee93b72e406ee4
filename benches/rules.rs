//! Naming Engine Benchmarks
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --bench rules
//! ```
//!
//! # Metrics Measured
//! - Rule set application over growing rule counts
//! - Full upload item resolution with thumbnail matching

use camino::Utf8PathBuf;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use ytbulk::models::{DiscoveredFile, RuleSet, RunConfig};
use ytbulk::services::naming::{apply_rules, build_upload_item};

const DESCRIPTION: &str = "Recorded live at VENUE on DATE.\n\
    Band: BAND\n\
    Subscribe for more sessions from VENUE!\n";

fn rule_set(count: usize) -> RuleSet {
    let fixed = [("VENUE", "the Roxy"), ("DATE", "2024-05-01"), ("BAND", "The Examples")]
        .map(|(find, replace)| (find.to_string(), replace.to_string()));

    (0..count)
        .map(|i| (format!("TOKEN{}", i), format!("value {}", i)))
        .chain(fixed)
        .collect()
}

fn bench_apply_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_rules");

    for count in [0usize, 4, 16, 64] {
        let rules = rule_set(count);
        group.throughput(Throughput::Bytes(DESCRIPTION.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rules, |b, rules| {
            b.iter(|| apply_rules(black_box(rules), black_box(DESCRIPTION)))
        });
    }

    group.finish();
}

fn bench_build_upload_item(c: &mut Criterion) {
    let config = RunConfig::builder("/videos")
        .title_prefix("Live: ")
        .title_rules(RuleSet::new().with("_", " "))
        .description_rules(rule_set(8))
        .thumbnail_suffix("-thumb")
        .build()
        .expect("valid benchmark config");

    let candidates: Vec<Utf8PathBuf> = (0..500)
        .map(|i| Utf8PathBuf::from(format!("/videos/track_{:03}-thumb.jpg", i)))
        .collect();
    let file = DiscoveredFile::from_path("/videos/track_250.mp4").expect("file name");

    c.bench_function("build_upload_item/500_candidates", |b| {
        b.iter(|| {
            build_upload_item(
                black_box(&config),
                black_box(&file),
                black_box(DESCRIPTION),
                black_box(&candidates),
            )
        })
    });
}

criterion_group!(benches, bench_apply_rules, bench_build_upload_item);
criterion_main!(benches);
