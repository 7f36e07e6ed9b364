// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Iterative traversal kernels for box-overlap and segment queries.
//!
//! Both kernels share one depth-first loop over an explicit stack. On an
//! interior hit the popped slot is overwritten with the first child and
//! only the second child is pushed, so each hit costs a single push and
//! the stack stays at tree height. Results arrive depth-first with a
//! right bias; callers must not rely on the order.

use alloc::vec::Vec;
use core::fmt::Debug;

use smallvec::SmallVec;

use crate::arena::{Node, NodeIndex};
use crate::error::Result;
use crate::tree::Bvh;
use crate::types::Aabb;

impl<P: Copy + Debug> Bvh<P> {
    /// Append every leaf whose fat box overlaps `aabb` to `out`.
    ///
    /// `out` is never cleared, so hits from several queries can be
    /// accumulated in one buffer.
    pub fn query_aabb(&self, aabb: &Aabb, out: &mut Vec<NodeIndex>) {
        self.traverse(out, |node| node.aabb.overlaps(aabb));
    }

    /// Append every leaf whose fat box overlaps the fat box of `index`.
    ///
    /// The probe leaf overlaps itself, so it appears in its own results.
    pub fn query_node(&self, index: NodeIndex, out: &mut Vec<NodeIndex>) -> Result<()> {
        let fat = self.leaf_ref(index)?.aabb;
        self.query_aabb(&fat, out);
        Ok(())
    }

    /// Append every leaf whose fat box intersects the segment
    /// `(x0, y0)..(x1, y1)` to `out`.
    pub fn raycast(&self, x0: f32, y0: f32, x1: f32, y1: f32, out: &mut Vec<NodeIndex>) {
        self.traverse(out, |node| node.aabb.intersects_segment(x0, y0, x1, y1));
    }

    fn traverse<F>(&self, out: &mut Vec<NodeIndex>, hit: F)
    where
        F: Fn(&Node<P>) -> bool,
    {
        if self.root.is_invalid() {
            return;
        }
        let mut stack: SmallVec<[NodeIndex; 32]> = SmallVec::new();
        stack.push(self.root);
        while !stack.is_empty() {
            let top = stack.len() - 1;
            let node = self.arena.get(stack[top]);
            if !hit(node) {
                stack.pop();
                continue;
            }
            if node.is_leaf() {
                out.push(stack[top]);
                stack.pop();
            } else {
                // descend in place: reuse the slot for child 0
                stack[top] = node.children[0];
                stack.push(node.children[1]);
            }
        }
    }
}
