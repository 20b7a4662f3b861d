use benchviz::elements::DEFAULT_ITERATIONS;
use benchviz::phases::thread_log::{self, SAMPLE_LOG};
use criterion::{black_box, criterion_group, Criterion};

fn make_log(repeats: usize) -> String {
    let mut log = String::with_capacity(SAMPLE_LOG.len() * repeats);
    for _ in 0..repeats {
        log.push_str(SAMPLE_LOG);
        log.push_str("stray output between runs\n");
    }
    log
}

fn benchmark_parse_sample(c: &mut Criterion) {
    c.bench_function("parse_sample_log", |b| {
        b.iter(|| {
            let scan = thread_log::parse_thread_log(black_box(SAMPLE_LOG));
            black_box(thread_log::summarize(scan, DEFAULT_ITERATIONS).expect("sample log has samples"))
        })
    });
}

fn benchmark_parse_noisy(c: &mut Criterion) {
    let log = make_log(500);
    c.bench_function("parse_noisy_log_500", |b| {
        b.iter(|| black_box(thread_log::parse_thread_log(black_box(&log))))
    });
}

criterion_group!(parse, benchmark_parse_sample, benchmark_parse_noisy);
