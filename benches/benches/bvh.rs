// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use canopy_bvh::{Aabb, Bvh, Config};

fn sized_config(leaves: usize) -> Config {
    Config {
        capacity: leaves * 2 + 16,
        validate: false,
        ..Config::default()
    }
}

fn gen_grid_rects(n: usize, cell: f32) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f32 * cell;
            let y0 = y as f32 * cell;
            out.push(Aabb::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1_u64 << 24) as f32)
    }
}

fn gen_random_rects(count: usize, max_w: f32, max_h: f32, rect_w: f32, rect_h: f32) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f32() * (max_w - rect_w).max(1.0);
        let y0 = rng.next_f32() * (max_h - rect_h).max(1.0);
        out.push(Aabb::from_xywh(x0, y0, rect_w, rect_h));
    }
    out
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f32) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f32() * 2000.0, rng.next_f32() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f32() - 0.5) * spread;
            let dy = (rng.next_f32() - 0.5) * spread;
            out.push(Aabb::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn bench_insert_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_query");
    for &n in &[8_usize, 16, 32] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || Bvh::<u32>::with_config(sized_config(rects.len())),
                |mut tree| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = tree.insert(r, i as u32).unwrap();
                    }
                    let mut out = Vec::new();
                    tree.query_aabb(&Aabb::from_xywh(100.0, 100.0, 400.0, 400.0), &mut out);
                    black_box(out.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let rects = gen_random_rects(1024, 2000.0, 2000.0, 12.0, 12.0);
    group.bench_function("random_1024", |b| {
        b.iter_batched(
            || Bvh::<u32>::with_config(sized_config(rects.len())),
            |mut tree| {
                for (i, r) in rects.iter().copied().enumerate() {
                    let _ = tree.insert(r, i as u32).unwrap();
                }
                let mut out = Vec::new();
                tree.query_aabb(&Aabb::from_xywh(800.0, 800.0, 400.0, 400.0), &mut out);
                black_box(out.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_update_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_heavy");
    let rects = gen_random_rects(512, 2000.0, 2000.0, 12.0, 12.0);
    group.bench_function("nudge_all_then_jump_some", |b| {
        b.iter_batched(
            || {
                let mut tree = Bvh::<u32>::with_config(sized_config(rects.len()));
                let handles: Vec<_> = rects
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, r)| tree.insert(r, i as u32).unwrap())
                    .collect();
                (tree, handles)
            },
            |(mut tree, handles)| {
                // most moves stay inside the fat boxes
                for (j, (&h, r)) in handles.iter().zip(&rects).enumerate() {
                    let dx = (j % 5) as f32 - 2.0;
                    let dy = ((j * 7) % 5) as f32 - 2.0;
                    let moved = Aabb::new(r.min_x + dx, r.min_y + dy, r.max_x + dx, r.max_y + dy);
                    let _ = tree.update(h, moved).unwrap();
                }
                // a few escape and relink
                for (&h, r) in handles.iter().zip(&rects).step_by(17) {
                    let jumped =
                        Aabb::new(r.min_x + 300.0, r.min_y, r.max_x + 300.0, r.max_y);
                    let _ = tree.update(h, jumped).unwrap();
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_raycast(c: &mut Criterion) {
    let mut group = c.benchmark_group("raycast");
    let rects = gen_clustered_rects(16, 64, 128.0);
    group.bench_function("clustered_256_rays", |b| {
        b.iter_batched(
            || {
                let mut tree = Bvh::<u32>::with_config(sized_config(rects.len()));
                for (i, r) in rects.iter().copied().enumerate() {
                    let _ = tree.insert(r, i as u32).unwrap();
                }
                tree
            },
            |tree| {
                let mut total = 0_usize;
                let mut out = Vec::new();
                for q in 0..256 {
                    let x = (q % 16) as f32 * 125.0;
                    let y = (q / 16) as f32 * 125.0;
                    out.clear();
                    tree.raycast(x, y, x + 400.0, y + 400.0, &mut out);
                    total += out.len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    // adversarial order: interleave distant clusters so the incremental
    // tree starts badly shaped
    let clustered = gen_clustered_rects(8, 64, 96.0);
    let mut rects = Vec::with_capacity(clustered.len());
    for i in 0..clustered.len() {
        let stride = (i * 8 + i / 64) % clustered.len();
        rects.push(clustered[stride]);
    }
    group.bench_function("descend_512", |b| {
        b.iter_batched(
            || {
                let mut tree = Bvh::<u32>::with_config(sized_config(rects.len()));
                for (i, r) in rects.iter().copied().enumerate() {
                    let _ = tree.insert(r, i as u32).unwrap();
                }
                tree
            },
            |mut tree| {
                for _ in 0..512 {
                    tree.optimize();
                }
                black_box(tree.quality());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_query,
    bench_update_heavy,
    bench_raycast,
    bench_optimize,
);
criterion_main!(benches);
