// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bouncing boxes.
//!
//! A headless version of the classic broad-phase demo: boxes drift
//! around a 512x512 arena, reflecting off the edges, while the tree
//! tracks them through [`Bvh::update`]. The interesting number is the
//! hysteresis rate: how many per-frame moves the fat boxes absorb
//! without touching the tree.
//!
//! Run:
//! - `cargo run -p canopy_examples --example bvh_bounce`

use canopy_bvh::{Aabb, Bvh, NodeIndex};

const ARENA: f32 = 512.0;
const BOXES: usize = 64;
const FRAMES: u32 = 10_000;

struct Rng(u64);

impl Rng {
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

#[derive(Clone, Copy)]
struct Bouncer {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    size: f32,
}

impl Bouncer {
    fn make(rng: &mut Rng) -> Self {
        Self {
            x: rng.next_f32() * ARENA,
            y: rng.next_f32() * ARENA,
            dx: (1.0 - rng.next_f32() * 2.0) * 2.0,
            dy: (1.0 - rng.next_f32() * 2.0) * 2.0,
            size: 2.0 + rng.next_f32() * 30.0,
        }
    }

    fn tick(&mut self) {
        if self.x < 0.0 && self.dx < 0.0 {
            self.dx = -self.dx;
        }
        if self.x > ARENA && self.dx > 0.0 {
            self.dx = -self.dx;
        }
        if self.y < 0.0 && self.dy < 0.0 {
            self.dy = -self.dy;
        }
        if self.y > ARENA && self.dy > 0.0 {
            self.dy = -self.dy;
        }
        self.x += self.dx;
        self.y += self.dy;
    }

    fn aabb(&self) -> Aabb {
        Aabb::new(
            self.x - self.size,
            self.y - self.size,
            self.x + self.size,
            self.y + self.size,
        )
    }
}

fn main() {
    let mut rng = Rng(0x5EED_CAFE_F00D);
    let mut tree: Bvh<usize> = Bvh::new();

    let mut bouncers: Vec<Bouncer> = (0..BOXES).map(|_| Bouncer::make(&mut rng)).collect();
    let handles: Vec<NodeIndex> = bouncers
        .iter()
        .enumerate()
        .map(|(i, b)| tree.insert(b.aabb(), i).unwrap())
        .collect();

    let mut moves = 0_u64;
    let mut relinks = 0_u64;
    let mut pair_candidates = 0_u64;
    let mut scratch = Vec::new();

    for frame in 0..FRAMES {
        for (b, &h) in bouncers.iter_mut().zip(&handles) {
            b.tick();
            moves += 1;
            if tree.update(h, b.aabb()).unwrap() {
                relinks += 1;
            }
        }

        // count broad-phase candidate pairs via self-queries
        for &h in &handles {
            scratch.clear();
            tree.query_node(h, &mut scratch).unwrap();
            pair_candidates += (scratch.len() - 1) as u64; // minus the probe itself
        }

        if frame % 1000 == 0 {
            tree.optimize();
            println!(
                "frame {frame:5}: quality {:8.0}, relinked {relinks}/{moves} moves",
                tree.quality()
            );
        }
    }

    let absorbed = 100.0 * (1.0 - relinks as f64 / moves as f64);
    println!("fat boxes absorbed {absorbed:.1}% of {moves} moves");
    println!("average candidate pairs per frame: {}", pair_candidates / u64::from(FRAMES) / 2);
}
