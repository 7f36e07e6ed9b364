// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy BVH: a dynamic 2D bounding-volume hierarchy over fat AABBs.
//!
//! Canopy BVH is a reusable building block for broad-phase collision,
//! picking, and culling over a changing population of boxes.
//!
//! - Insert, move, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by overlapping rectangle or by segment (raycast).
//! - Stable integer handles from a fixed-capacity node pool; no allocation after construction
//!   apart from caller-owned query buffers.
//!
//! Leaves store *fat* boxes: the client box grown by a configurable margin.
//! A moved box that stays inside its fat box costs nothing ([`Bvh::update`]
//! returns without touching the tree), which absorbs the jitter of
//! per-frame motion. Insertions pick their place with a branch-and-bound
//! search over a surface-area heuristic, and every structural change runs
//! cheap local rotations to keep the hierarchy tight; [`Bvh::optimize`]
//! applies the same rotations as an idle-time pass.
//!
//! # Example
//!
//! ```rust
//! use canopy_bvh::{Aabb, Bvh};
//!
//! let mut tree: Bvh<u32> = Bvh::new();
//! let ball = tree.insert(Aabb::new(0.0, 0.0, 1.0, 1.0), 1).unwrap();
//! let wall = tree.insert(Aabb::new(100.0, 0.0, 101.0, 50.0), 2).unwrap();
//!
//! // Queries see the stored fat boxes (inserted box grown by `growth`,
//! // 16.0 by default), so a probe near the ball reports only the ball.
//! let mut hits = Vec::new();
//! tree.query_aabb(&Aabb::new(0.0, 0.0, 2.0, 2.0), &mut hits);
//! assert_eq!(hits, vec![ball]);
//!
//! // A horizontal ray at y = 25 passes under nothing but the wall.
//! let mut crossed = Vec::new();
//! tree.raycast(0.0, 25.0, 120.0, 25.0, &mut crossed);
//! assert_eq!(crossed, vec![wall]);
//!
//! // Small motion is absorbed by the fat box; large motion relinks.
//! assert!(!tree.update(ball, Aabb::new(0.5, 0.5, 1.5, 1.5)).unwrap());
//! assert!(tree.update(ball, Aabb::new(40.0, 40.0, 41.0, 41.0)).unwrap());
//!
//! tree.remove(wall).unwrap();
//! assert_eq!(tree.len(), 1);
//! ```
//!
//! # Sizing the pool
//!
//! Capacity counts *nodes*, not boxes: `n` leaves need up to `2n - 1`
//! slots once interior nodes are added. Exceeding the pool fails
//! deterministically with [`Error::CapacityExceeded`]:
//!
//! ```rust
//! use canopy_bvh::{Aabb, Bvh, Config, Error};
//!
//! let mut tree: Bvh<&str> = Bvh::with_config(Config {
//!     capacity: 3,
//!     growth: 0.5,
//!     ..Config::default()
//! });
//! let _a = tree.insert(Aabb::new(0.0, 0.0, 1.0, 1.0), "a").unwrap();
//! let _b = tree.insert(Aabb::new(5.0, 0.0, 6.0, 1.0), "b").unwrap();
//! assert_eq!(tree.insert(Aabb::new(9.0, 0.0, 10.0, 1.0), "c"), Err(Error::CapacityExceeded));
//! ```
//!
//! # API overview
//!
//! - [`Bvh`]: the tree. [`Config`] fixes capacity, fat-box margin, search
//!   heap size, and debug validation at construction.
//! - [`Aabb`]: plain `f32` min/max box with the algebra the tree needs.
//! - [`NodeIndex`]: stable opaque handle; [`NodeIndex::INVALID`] marks
//!   absent links in [`Node`] views.
//! - Key operations: [`Bvh::insert`], [`Bvh::update`], [`Bvh::remove`],
//!   [`Bvh::query_aabb`] / [`Bvh::query_node`] / [`Bvh::raycast`],
//!   [`Bvh::optimize`] and [`Bvh::quality`].
//!
//! # Semantics notes
//!
//! - Queries filter against fat boxes, so results are conservative with
//!   respect to the client's slim boxes; callers needing exact overlap
//!   narrow the candidates themselves.
//! - [`Bvh::query_node`] includes the probe leaf in its own results.
//! - Result order is unspecified (depth-first with a right bias today).
//! - Float inputs are assumed finite; NaNs are not handled.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod arena;
pub mod error;
mod heap;
mod query;
mod rotate;
pub mod tree;
pub mod types;

pub use arena::{Node, NodeIndex};
pub use error::{Error, Result};
pub use tree::{Bvh, Config};
pub use types::Aabb;
