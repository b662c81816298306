use chrono::{DateTime, TimeDelta, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scancheck::loader::{load_roster_bytes, HeaderPolicy, RosterFormat};
use scancheck::validator::{MatchPolicy, Roster, ScanValidator, ValidatorConfig};
use std::time::Duration;

fn codes(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{:012}", 400_000_000_000u64 + i as u64)).collect()
}

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

// 1. Submit throughput against rosters of growing size
fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit");

    for roster_size in [100, 10_000, 100_000] {
        let roster_codes = codes(roster_size);
        let roster = Roster::from_codes(&roster_codes, MatchPolicy::exact());
        // Half on the roster, half unknown, each scanned twice
        let mut stream = codes(roster_size * 2);
        stream.extend_from_within(..);

        group.bench_with_input(
            BenchmarkId::from_parameter(roster_size),
            &stream,
            |b, stream| {
                b.iter(|| {
                    let mut validator = ScanValidator::with_roster(
                        ValidatorConfig::default().with_cooldown(Duration::ZERO),
                        roster.clone(),
                    );
                    let t0 = base_time();
                    for (i, code) in stream.iter().enumerate() {
                        black_box(validator.submit(code, t0 + TimeDelta::milliseconds(i as i64)));
                    }
                    black_box(validator.progress());
                })
            },
        );
    }
    group.finish();
}

// 2. Cooldown suppression of a label held in front of the camera
fn bench_cooldown(c: &mut Criterion) {
    let roster = Roster::from_codes(["A1"], MatchPolicy::exact());
    c.bench_function("cooldown_30fps_10s", |b| {
        b.iter(|| {
            let mut validator = ScanValidator::with_roster(ValidatorConfig::default(), roster.clone());
            let t0 = base_time();
            for frame in 0..300 {
                black_box(validator.submit("A1", t0 + TimeDelta::milliseconds(frame * 33)));
            }
        })
    });
}

// 3. Roster parsing
fn bench_load_csv(c: &mut Criterion) {
    let mut csv = String::from("barcode,description\n");
    for code in codes(50_000) {
        csv.push_str(&code);
        csv.push_str(",item\n");
    }
    let bytes = csv.into_bytes();

    c.bench_function("load_csv_50k", |b| {
        b.iter(|| {
            let loaded =
                load_roster_bytes(bytes.clone(), RosterFormat::Delimited(b','), HeaderPolicy::Auto)
                    .unwrap();
            black_box(loaded.into_roster(MatchPolicy::exact()));
        })
    });
}

criterion_group!(benches, bench_submit, bench_cooldown, bench_load_csv);
criterion_main!(benches);
