use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rb_interval_set::{Interval, IntervalSet};
use std::hint::black_box;

struct IntervalGenerator {
    rng: StdRng,
    limit: i64,
}
impl IntervalGenerator {
    fn new(limit: i64) -> Self {
        Self {
            rng: StdRng::from_seed([0; 32]),
            limit,
        }
    }

    /// Short intervals, so most inserts stay disjoint instead of collapsing.
    fn next(&mut self) -> Interval {
        let low = self.rng.gen_range(0..self.limit);
        let high = self.rng.gen_range(low..=(low + 4).min(self.limit));
        Interval::new(low, high)
    }
}

// insert helper fn
fn interval_set_insert(count: usize, bench: &mut Bencher) {
    let mut gen = IntervalGenerator::new(count as i64 * 10);
    let intervals: Vec<_> = std::iter::repeat_with(|| gen.next()).take(count).collect();
    bench.iter(|| {
        let mut set = IntervalSet::new();
        for i in &intervals {
            black_box(set.insert(*i));
        }
    });
}

// insert and delete helper fn
fn interval_set_insert_delete(count: usize, bench: &mut Bencher) {
    let mut gen = IntervalGenerator::new(count as i64 * 10);
    let intervals: Vec<_> = std::iter::repeat_with(|| gen.next()).take(count).collect();
    bench.iter(|| {
        let mut set = IntervalSet::new();
        for i in &intervals {
            black_box(set.insert(*i));
        }
        while let Some(id) = set.first() {
            black_box(set.delete(id));
        }
    });
}

// point search helper fn
fn interval_set_search(count: usize, bench: &mut Bencher) {
    let limit = count as i64 * 10;
    let mut gen = IntervalGenerator::new(limit);
    let set: IntervalSet = std::iter::repeat_with(|| gen.next()).take(count).collect();
    let mut rng = StdRng::from_seed([1; 32]);
    let points: Vec<i64> = std::iter::repeat_with(|| rng.gen_range(0..limit))
        .take(count)
        .collect();
    bench.iter(|| {
        for p in &points {
            black_box(set.interval_search(*p));
        }
    });
}

// pop_value helper fn
fn interval_set_consume(count: usize, bench: &mut Bencher) {
    let mut gen = IntervalGenerator::new(count as i64 * 10);
    let intervals: Vec<_> = std::iter::repeat_with(|| gen.next()).take(count).collect();
    bench.iter(|| {
        let mut set: IntervalSet = intervals.iter().copied().collect();
        while let Some(v) = set.pop_value() {
            black_box(v);
        }
    });
}

fn bench_interval_set_insert(c: &mut Criterion) {
    c.bench_function("bench_interval_set_insert_100", |b| {
        interval_set_insert(100, b)
    });
    c.bench_function("bench_interval_set_insert_1000", |b| {
        interval_set_insert(1000, b)
    });
    c.bench_function("bench_interval_set_insert_10,000", |b| {
        interval_set_insert(10_000, b)
    });
    c.bench_function("bench_interval_set_insert_100,000", |b| {
        interval_set_insert(100_000, b)
    });
}

fn bench_interval_set_insert_delete(c: &mut Criterion) {
    c.bench_function("bench_interval_set_insert_delete_100", |b| {
        interval_set_insert_delete(100, b)
    });
    c.bench_function("bench_interval_set_insert_delete_1000", |b| {
        interval_set_insert_delete(1000, b)
    });
    c.bench_function("bench_interval_set_insert_delete_10,000", |b| {
        interval_set_insert_delete(10_000, b)
    });
}

fn bench_interval_set_search(c: &mut Criterion) {
    c.bench_function("bench_interval_set_search_1000", |b| {
        interval_set_search(1000, b)
    });
    c.bench_function("bench_interval_set_search_100,000", |b| {
        interval_set_search(100_000, b)
    });
}

fn bench_interval_set_consume(c: &mut Criterion) {
    c.bench_function("bench_interval_set_consume_100", |b| {
        interval_set_consume(100, b)
    });
    c.bench_function("bench_interval_set_consume_1000", |b| {
        interval_set_consume(1000, b)
    });
}

fn criterion_config() -> Criterion {
    Criterion::default().configure_from_args().without_plots()
}

criterion_group! {
    name = benches_basic_op;
    config = criterion_config();
    targets = bench_interval_set_insert, bench_interval_set_insert_delete,
}

criterion_group! {
    name = benches_query;
    config = criterion_config();
    targets = bench_interval_set_search, bench_interval_set_consume
}

criterion_main!(benches_basic_op, benches_query);
