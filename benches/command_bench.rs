//! Benchmarks for command encoding and reply decoding
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Duration;
use tidemark::reply::{decode_datapoints, decode_series_info};
use tidemark::{
    AggregationType, Command, CreateOptions, Filter, MRangeOptions, ReducerType, Timestamp, Value,
};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    group.bench_function("create_full_options", |b| {
        b.iter(|| {
            let options = CreateOptions::new()
                .retention(Duration::from_secs(3600))
                .chunk_size(4096)
                .label("sensor_id", "2")
                .label("region", "eu");
            tidemark::command::Create::new(black_box("temp:3:11"), options).args()
        })
    });

    group.bench_function("mrange_full_options", |b| {
        b.iter(|| {
            let options = MRangeOptions::new()
                .filter_by_value(-40.0, 85.0)
                .with_labels()
                .count(100)
                .aggregation(AggregationType::Avg, Duration::from_secs(60))
                .group_by("region", ReducerType::Max);
            tidemark::command::MRange::forward(
                Timestamp::Earliest,
                Timestamp::Latest,
                vec![
                    Filter::equal("sensor_id", ["2", "3"]),
                    Filter::not_equal("deprecated", ["true"]),
                ],
                options,
            )
            .args()
        })
    });

    group.finish();
}

fn range_reply(samples: usize) -> Value {
    Value::Array(
        (0..samples)
            .map(|i| {
                Value::Array(vec![
                    Value::Int(i as i64 * 1000),
                    Value::Bytes(format!("{}.5", i).into_bytes()),
                ])
            })
            .collect(),
    )
}

fn info_reply() -> Value {
    Value::Array(vec![
        Value::text("totalSamples"),
        Value::Int(100),
        Value::text("memoryUsage"),
        Value::Int(4184),
        Value::text("firstTimestamp"),
        Value::Int(1_000),
        Value::text("lastTimestamp"),
        Value::Int(99_000),
        Value::text("retentionTime"),
        Value::Int(86_400_000),
        Value::text("chunkCount"),
        Value::Int(1),
        Value::text("chunkSize"),
        Value::Int(4096),
        Value::text("chunkType"),
        Value::Bytes(b"compressed".to_vec()),
        Value::text("labels"),
        Value::Array(vec![Value::Array(vec![
            Value::text("sensor_id"),
            Value::text("2"),
        ])]),
        Value::text("rules"),
        Value::Array(vec![Value::Array(vec![
            Value::text("temp:1m"),
            Value::Int(60_000),
            Value::text("AVG"),
        ])]),
    ])
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [100, 1000, 10000] {
        let reply = range_reply(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("range_{}", size), |b| {
            b.iter(|| decode_datapoints(black_box(&reply)).unwrap())
        });
    }

    let reply = info_reply();
    group.bench_function("series_info", |b| {
        b.iter(|| decode_series_info(black_box(&reply)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
