// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local area-reducing rotations and the background optimize pass.
//!
//! A rotation exchanges a grandchild with its uncle when doing so shrinks
//! the rotated child's box. The swap substitutes a sub-forest covering the
//! same leaves, so the node's own box and everything above it stay valid;
//! only the rotated child needs retightening.

use core::fmt::Debug;

use smallvec::SmallVec;

use crate::arena::NodeIndex;
use crate::tree::Bvh;

impl<P: Copy + Debug> Bvh<P> {
    /// Best-effort quality pass: walk a random path from the root, then
    /// apply local rotations on the way back up.
    ///
    /// Repeated calls converge the tree towards lower [`Bvh::quality`];
    /// a single call makes no optimality promise.
    pub fn optimize(&mut self) {
        if self.root.is_invalid() {
            return;
        }
        let before = if self.validation_enabled() {
            self.quality()
        } else {
            0.0
        };
        let mut path: SmallVec<[NodeIndex; 32]> = SmallVec::new();
        let mut index = self.root;
        loop {
            let is_leaf = self.arena.get(index).is_leaf();
            if is_leaf {
                break;
            }
            path.push(index);
            let slot = (self.next_random() & 1) as usize;
            index = self.arena.get(index).children[slot];
        }
        while let Some(i) = path.pop() {
            self.refit(i);
            self.optimize_node(i);
        }
        if self.validation_enabled() {
            let after = self.quality();
            assert!(
                after <= before + 1.0,
                "rotations must not degrade quality: {before} -> {after}"
            );
            self.validate();
        }
    }

    /// Try both rotation families on one interior node.
    pub(crate) fn optimize_node(&mut self, index: NodeIndex) {
        self.rotate_pivot(index, 0);
        self.rotate_pivot(index, 1);
    }

    /// Attempt to shrink `children[pivot]` by swapping one of its
    /// grandchildren with the other child (the uncle).
    fn rotate_pivot(&mut self, index: NodeIndex, pivot: usize) {
        let node = self.arena.get(index);
        if node.is_leaf() {
            return;
        }
        let c = node.children[pivot];
        let uncle = node.children[1 - pivot];
        let cnode = self.arena.get(c);
        if cnode.is_leaf() {
            return;
        }
        let [x0, x1] = cnode.children;
        let h0 = cnode.aabb.area();
        let uncle_aabb = self.arena.get(uncle).aabb;
        let x0_aabb = self.arena.get(x0).aabb;
        let x1_aabb = self.arena.get(x1).aabb;
        // promoting x0 leaves {uncle, x1} under c; promoting x1 leaves {x0, uncle}
        let h1 = uncle_aabb.union(&x1_aabb).area();
        let h2 = x0_aabb.union(&uncle_aabb).area();
        if h1 < h0 && h1 <= h2 {
            self.swap_with_uncle(index, pivot, 0);
        } else if h2 < h0 {
            self.swap_with_uncle(index, pivot, 1);
        }
    }

    /// Exchange `children[pivot]`'s grandchild with the uncle and
    /// retighten the rotated child.
    fn swap_with_uncle(&mut self, index: NodeIndex, pivot: usize, grandchild_slot: usize) {
        let uncle_slot = 1 - pivot;
        let c = self.arena.get(index).children[pivot];
        let uncle = self.arena.get(index).children[uncle_slot];
        let promoted = self.arena.get(c).children[grandchild_slot];

        self.arena.get_mut(index).children[uncle_slot] = promoted;
        self.arena.get_mut(promoted).parent = index;
        self.arena.get_mut(c).children[grandchild_slot] = uncle;
        self.arena.get_mut(uncle).parent = c;

        self.refit(c);
    }

    /// xorshift64 step for the descent's coin flips.
    fn next_random(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        x
    }
}
