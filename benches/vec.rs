use bedrock_collections::{DynArray, SmallVec, StableVec};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_vec(c: &mut Criterion) {
    let n = 16;
    {
        let mut group = c.benchmark_group("Vec vs DynArray vs SmallVec (Push 16)");
        group.bench_function("std::vec::Vec", |b| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..n {
                    v.push(black_box(i as i32));
                }
                v
            })
        });

        group.bench_function("DynArray<i32>", |b| {
            b.iter(|| {
                let mut v = DynArray::new();
                for i in 0..n {
                    v.push(black_box(i as i32));
                }
                v
            })
        });

        group.bench_function("SmallVec<i32, 16>", |b| {
            b.iter(|| {
                let mut v: SmallVec<i32, 16> = SmallVec::new();
                for i in 0..n {
                    v.push(black_box(i as i32));
                }
                v
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("Vec vs SmallVec (Promote 4 -> 64)");
        group.bench_function("std::vec::Vec", |b| {
            b.iter(|| {
                let mut v = Vec::with_capacity(4);
                for i in 0..64 {
                    v.push(black_box(i as i32));
                }
                v
            })
        });

        group.bench_function("SmallVec<i32, 4>", |b| {
            b.iter(|| {
                let mut v: SmallVec<i32, 4> = SmallVec::new();
                for i in 0..64 {
                    v.push(black_box(i as i32));
                }
                v
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("Vec vs StableVec (Access 1024)");
        let v_std: Vec<i32> = (0..1024).collect();
        let v_stable: StableVec<i32> = (0..1024).collect();

        group.bench_function("std::vec::Vec", |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for i in 0..1024 {
                    sum += black_box(v_std[i]) as i64;
                }
                sum
            })
        });

        group.bench_function("StableVec<i32>", |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for i in 0..1024 {
                    sum += black_box(v_stable[i]) as i64;
                }
                sum
            })
        });
        group.finish();
    }
}

criterion_group!(benches, bench_vec);
criterion_main!(benches);
