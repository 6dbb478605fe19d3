use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use probing_map::ProbingMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (ProbingMap<String, u64>, Vec<String>) {
    let mut m = ProbingMap::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.put(k.clone(), i as u64);
    }
    (m, keys)
}

fn bench_put_fresh_100k(c: &mut Criterion) {
    c.bench_function("probing::put_fresh_100k", |b| {
        b.iter_batched(
            ProbingMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_presized_100k(c: &mut Criterion) {
    c.bench_function("probing::put_presized_100k", |b| {
        b.iter_batched(
            || ProbingMap::<String, u64>::with_capacity(160_000),
            |mut m| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("probing::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled(5, 110_000);
                // Precompute 10k unique victims via LCG
                let n = keys.len();
                let mut sel = std::collections::HashSet::with_capacity(10_000);
                let mut s = 0x9e3779b97f4a7c15u64;
                while sel.len() < 10_000 {
                    s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                    sel.insert((s as usize) % n);
                }
                let victims: Vec<String> = sel.into_iter().map(|i| keys[i].clone()).collect();
                (m, victims)
            },
            |(mut m, victims)| {
                for k in &victims {
                    let _ = m.remove(k.as_str());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("probing::get_hit_10k_on_100k", |b| {
        let (m, keys) = filled(7, 100_000);
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                let _ = black_box(m.get(k.as_str()));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("probing::get_miss_10k_on_100k", |b| {
        let (m, _keys) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap());
                let _ = black_box(m.get(k.as_str()));
            }
        })
    });
}

// Lookups after heavy churn: half the keys removed, so probes walk through
// many tombstones.
fn bench_get_through_tombstones(c: &mut Criterion) {
    c.bench_function("probing::get_hit_10k_after_50pct_removed", |b| {
        let (mut m, keys) = filled(13, 100_000);
        for k in keys.iter().step_by(2) {
            let _ = m.remove(k.as_str());
        }
        let survivors: Vec<&String> = keys.iter().skip(1).step_by(2).take(10_000).collect();
        b.iter(|| {
            for k in &survivors {
                let _ = black_box(m.get(k.as_str()));
            }
        })
    });
}

fn bench_iter_and_count(c: &mut Criterion) {
    c.bench_function("probing::iter_all_100k", |b| {
        let (m, _keys) = filled(999, 100_000);
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in m.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("probing::count_100k", |b| {
        let (m, _keys) = filled(1001, 100_000);
        b.iter(|| black_box(m.count(&42)))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_put;
    config = bench_config();
    targets = bench_put_fresh_100k, bench_put_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_random_10k,
              bench_get_hit_10k,
              bench_get_miss_10k,
              bench_get_through_tombstones,
              bench_iter_and_count
}
criterion_main!(benches_put, benches_ops);
