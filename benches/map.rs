use bedrock_collections::{FlatMap, TreeMap, UnorderedMap};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::collections::{BTreeMap, HashMap};

fn bench_unordered_map(c: &mut Criterion) {
    let n = 1024;
    {
        let mut group = c.benchmark_group("HashMap vs UnorderedMap (Insert 1024)");
        group.bench_function("std::collections::HashMap", |b| {
            b.iter(|| {
                let mut m = HashMap::new();
                for i in 0..n {
                    m.insert(black_box(i as i32), black_box(i as i32));
                }
                m
            })
        });

        group.bench_function("UnorderedMap<i32, i32>", |b| {
            b.iter(|| {
                let mut m: UnorderedMap<i32, i32> = UnorderedMap::new();
                for i in 0..n {
                    m.insert(black_box(i as i32), black_box(i as i32));
                }
                m
            })
        });

        group.bench_function("UnorderedMap<i32, i32> (reserved)", |b| {
            b.iter(|| {
                let mut m: UnorderedMap<i32, i32> = UnorderedMap::with_capacity(n);
                for i in 0..n {
                    m.insert(black_box(i as i32), black_box(i as i32));
                }
                m
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("HashMap vs UnorderedMap (Get 1024)");
        let m_std: HashMap<i32, i32> = (0..n as i32).map(|i| (i, i)).collect();
        let m_ours: UnorderedMap<i32, i32> = (0..n as i32).map(|i| (i, i)).collect();

        group.bench_function("std::collections::HashMap", |b| {
            b.iter(|| {
                for i in 0..n {
                    black_box(m_std.get(&black_box(i as i32)));
                }
            })
        });

        group.bench_function("UnorderedMap<i32, i32>", |b| {
            b.iter(|| {
                for i in 0..n {
                    black_box(m_ours.get(&black_box(i as i32)));
                }
            })
        });
        group.finish();
    }
}

fn bench_tree_map(c: &mut Criterion) {
    let n = 1024;
    {
        let mut group = c.benchmark_group("BTreeMap vs TreeMap vs FlatMap (Insert 1024)");
        group.bench_function("std::collections::BTreeMap", |b| {
            b.iter(|| {
                let mut m = BTreeMap::new();
                for i in 0..n {
                    m.insert(black_box((i * 7919 % n) as i32), i);
                }
                m
            })
        });

        group.bench_function("TreeMap<i32, usize>", |b| {
            b.iter(|| {
                let mut m = TreeMap::new();
                for i in 0..n {
                    m.insert(black_box((i * 7919 % n) as i32), i);
                }
                m
            })
        });

        group.bench_function("FlatMap<i32, usize>", |b| {
            b.iter(|| {
                let mut m = FlatMap::new();
                for i in 0..n {
                    m.insert(black_box((i * 7919 % n) as i32), i);
                }
                m
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("BTreeMap vs TreeMap (Iterate 1024)");
        let m_std: BTreeMap<i32, i32> = (0..n as i32).map(|i| (i, i)).collect();
        let m_ours: TreeMap<i32, i32> = (0..n as i32).map(|i| (i, i)).collect();

        group.bench_function("std::collections::BTreeMap", |b| {
            b.iter(|| m_std.iter().map(|(_, v)| *v as i64).sum::<i64>())
        });

        group.bench_function("TreeMap<i32, i32>", |b| {
            b.iter(|| m_ours.iter().map(|(_, v)| *v as i64).sum::<i64>())
        });
        group.finish();
    }
}

criterion_group!(benches, bench_unordered_map, bench_tree_map);
criterion_main!(benches);
