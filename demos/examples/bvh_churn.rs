// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Churn soak.
//!
//! One tree instance under a million random insert/remove/update
//! operations, the workload the engine is built for. Prints a short
//! summary at the end; mostly useful with validation enabled (debug
//! builds) for catching structural regressions.
//!
//! Run:
//! - `cargo run -p canopy_examples --example bvh_churn`

use canopy_bvh::{Aabb, Bvh, NodeIndex};

const OPS: u64 = 1_000_000;

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

fn rand_aabb(rng: &mut Rng) -> Aabb {
    let x = rng.next_f32() * 1024.0;
    let y = rng.next_f32() * 1024.0;
    let w = rng.next_f32() * 256.0;
    let h = rng.next_f32() * 256.0;
    Aabb::new(x, y, x + w, y + h)
}

fn shifted(aabb: &Aabb, rng: &mut Rng) -> Aabb {
    let dx = rng.next_f32() * 64.0 - 32.0;
    let dy = rng.next_f32() * 64.0 - 32.0;
    Aabb::new(
        aabb.min_x + dx,
        aabb.min_y + dy,
        aabb.max_x + dx,
        aabb.max_y + dy,
    )
}

fn main() {
    let mut rng = Rng(0xDEAD_BEEF_CAFE);
    let mut tree: Bvh<u64> = Bvh::new();
    let mut live: Vec<NodeIndex> = Vec::new();

    let mut inserts = 0_u64;
    let mut removes = 0_u64;
    let mut relinks = 0_u64;

    for _ in 0..OPS {
        match rng.next_u64() % 4 {
            0 if live.len() < 256 => {
                let h = tree.insert(rand_aabb(&mut rng), inserts).unwrap();
                live.push(h);
                inserts += 1;
            }
            1 if live.len() > 64 => {
                let at = (rng.next_u64() as usize) % live.len();
                tree.remove(live.swap_remove(at)).unwrap();
                removes += 1;
            }
            _ if !live.is_empty() => {
                let at = (rng.next_u64() as usize) % live.len();
                let h = live[at];
                let current = tree.get(h).unwrap().aabb;
                if tree.update(h, shifted(&current, &mut rng)).unwrap() {
                    relinks += 1;
                }
            }
            _ => {}
        }
    }

    println!("{OPS} ops: {inserts} inserts, {removes} removes, {relinks} relinks");
    println!("final population: {} boxes, quality {:.0}", tree.len(), tree.quality());
}
