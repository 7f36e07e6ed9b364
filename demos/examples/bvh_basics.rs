// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! BVH basics.
//!
//! Build a small tree, move a box, query a rectangle, and cast a ray.
//!
//! Run:
//! - `cargo run -p canopy_examples --example bvh_basics`

use canopy_bvh::{Aabb, Bvh};

fn main() {
    let mut tree: Bvh<&str> = Bvh::new();

    let ball = tree.insert(Aabb::new(0.0, 0.0, 1.0, 1.0), "ball").unwrap();
    let crate_ = tree.insert(Aabb::new(40.0, 40.0, 44.0, 44.0), "crate").unwrap();
    let wall = tree.insert(Aabb::new(100.0, 0.0, 102.0, 80.0), "wall").unwrap();

    println!("tree: {tree:?}");
    println!("quality: {:.1}", tree.quality());

    // Small motion is absorbed by the fat box
    let moved = tree.update(ball, Aabb::new(0.5, 0.5, 1.5, 1.5)).unwrap();
    println!("nudge relinked the ball: {moved}");

    // Large motion relinks
    let moved = tree.update(ball, Aabb::new(60.0, 60.0, 61.0, 61.0)).unwrap();
    println!("jump relinked the ball: {moved}");

    // Who is near the crate? (queries see fat boxes)
    let mut near = Vec::new();
    tree.query_node(crate_, &mut near).unwrap();
    let names: Vec<&str> = near.iter().map(|&h| tree.payload(h).unwrap()).collect();
    println!("near the crate: {names:?}");

    // A ray across the scene
    let mut hit = Vec::new();
    tree.raycast(-10.0, 41.0, 120.0, 41.0, &mut hit);
    let names: Vec<&str> = hit.iter().map(|&h| tree.payload(h).unwrap()).collect();
    println!("ray hits: {names:?}");

    tree.remove(wall).unwrap();
    println!("after removing the wall: {} boxes", tree.len());
}
