//! Queue operation benchmarks.
//!
//! Every path is O(1); these keep it that way across policies and fill levels.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pressure::{Item, OverflowPolicy, Queue, QueueConfig};
use pressure_bench::{Op, Workload};

const CAPACITY: u32 = 1024;

fn queue(policy: OverflowPolicy) -> Queue<Vec<Item>> {
    let config = QueueConfig::with_capacity(CAPACITY)
        .with_policy(policy)
        .with_watermarks(CAPACITY / 4, CAPACITY * 3 / 4, CAPACITY * 9 / 10);
    Queue::new(config, vec![Item::EMPTY; CAPACITY as usize]).expect("valid bench config")
}

fn full_queue(policy: OverflowPolicy) -> Queue<Vec<Item>> {
    let q = queue(policy);
    for i in 0..u64::from(CAPACITY) {
        q.enqueue(i, i).expect("room while filling");
    }
    q
}

// ============================================================================
// Steady State
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_round_trip");
    group.throughput(Throughput::Elements(1));

    for fill in [0, CAPACITY / 2, CAPACITY - 1] {
        group.bench_with_input(BenchmarkId::from_parameter(fill), &fill, |b, &fill| {
            let q = queue(OverflowPolicy::Reject);
            for i in 0..u64::from(fill) {
                q.enqueue(i, i).expect("room while filling");
            }
            let mut ts = 0u64;
            b.iter(|| {
                ts += 1;
                let _ = black_box(q.enqueue(black_box(ts), ts));
                let _ = black_box(q.dequeue());
            });
        });
    }

    group.finish();
}

fn bench_peek(c: &mut Criterion) {
    let q = full_queue(OverflowPolicy::Reject);
    c.bench_function("queue_peek", |b| {
        b.iter(|| black_box(q.peek()));
    });
}

fn bench_stats(c: &mut Criterion) {
    let q = full_queue(OverflowPolicy::DropOldest);
    c.bench_function("queue_stats", |b| {
        b.iter(|| black_box(q.stats()));
    });
}

// ============================================================================
// Saturated Overflow
// ============================================================================

fn bench_overflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_overflow");
    group.throughput(Throughput::Elements(1));

    for policy in OverflowPolicy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, &policy| {
            let q = full_queue(policy);
            let mut ts = 0u64;
            b.iter(|| {
                ts += 1;
                let _ = black_box(q.enqueue(black_box(ts), ts));
            });
        });
    }

    group.finish();
}

// ============================================================================
// Mixed Workload
// ============================================================================

fn bench_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_workload");
    const STEPS: usize = 10_000;
    group.throughput(Throughput::Elements(STEPS as u64));

    for ratio in [0.3, 0.5, 0.7] {
        let ops: Vec<Op> = {
            let mut workload = Workload::new(0xC0FFEE, ratio);
            (0..STEPS).map(|_| workload.next_op()).collect()
        };
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ops, |b, ops| {
            b.iter_batched(
                || queue(OverflowPolicy::DropOldest),
                |q| {
                    for op in ops {
                        match *op {
                            Op::Enqueue { payload, timestamp } => {
                                let _ = black_box(q.enqueue(payload, timestamp));
                            }
                            Op::Dequeue => {
                                let _ = black_box(q.dequeue());
                            }
                        }
                    }
                    q
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_round_trip,
    bench_peek,
    bench_stats,
    bench_overflow,
    bench_workload
);
criterion_main!(benches);
