use benchviz::elements::BenchmarkRow;
use benchviz::phases::collection;
use criterion::{black_box, criterion_group, BatchSize, Criterion};

const OPERATIONS: [&str; 4] = ["PUT", "GET", "DEL", "SCAN"];

fn make_rows(file: usize, sizes: usize) -> Vec<BenchmarkRow> {
    let source_file = format!("performance_results_{}.csv", file);
    (0..sizes)
        .flat_map(|s| OPERATIONS.iter().map(move |op| (s, *op)))
        .map(|(s, op)| {
            let data_size = 10_u64.pow(s as u32 % 6 + 1) * (s as u64 / 6 + 1);
            let base = (s + 1) as f64;
            BenchmarkRow {
                operation: op.to_string(),
                data_size,
                avg_latency: base * 1.5,
                p50_latency: base * 1.2,
                p95_latency: base * 2.5,
                p99_latency: base * 4.0,
                throughput: 1_000_000.0 / base,
                source_file: source_file.clone(),
            }
        })
        .collect()
}

fn benchmark_merge_overlapping(c: &mut Criterion) {
    c.bench_function("merge_8_overlapping_files", |b| {
        b.iter_batched(
            || (0..8).map(|f| make_rows(f, 60)).collect::<Vec<_>>(),
            |row_sets| black_box(collection::merge_rows(row_sets)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(merge, benchmark_merge_overlapping);
