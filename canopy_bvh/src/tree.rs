// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dynamic tree: insertion, removal, hysteretic movement, validation.

use core::fmt::Debug;

use crate::arena::{Arena, Node, NodeIndex};
use crate::error::{Error, Result};
use crate::heap::{Candidate, SearchHeap};
use crate::types::Aabb;

/// Construction parameters for [`Bvh`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Total node capacity of the pool, leaves and interior nodes combined.
    pub capacity: usize,
    /// Margin added on all four sides of stored leaf boxes (the fat AABB).
    pub growth: f32,
    /// Entry cap for the sibling-search heap. An overflowing search falls
    /// back to a greedy descent, trading tree quality for correctness.
    pub search_capacity: usize,
    /// Re-check structural invariants after every mutating operation.
    pub validate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1024,
            growth: 16.0,
            search_capacity: 1024,
            validate: cfg!(debug_assertions),
        }
    }
}

/// A dynamic bounding-volume hierarchy over 2D fat AABBs.
///
/// Leaves store client boxes grown by the configured margin; interior
/// nodes cover the union of their two children. All nodes live in a
/// fixed pool sized at construction, addressed by stable [`NodeIndex`]
/// handles.
pub struct Bvh<P: Copy + Debug> {
    pub(crate) arena: Arena<P>,
    pub(crate) root: NodeIndex,
    growth: f32,
    search_capacity: usize,
    debug_validate: bool,
    leaf_count: usize,
    pub(crate) rng_state: u64,
}

impl<P: Copy + Debug> Default for Bvh<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> core::fmt::Debug for Bvh<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bvh")
            .field("capacity", &self.arena.capacity())
            .field("leaves", &self.leaf_count)
            .field("free", &self.arena.free_len())
            .field("has_root", &!self.root.is_invalid())
            .finish_non_exhaustive()
    }
}

impl<P: Copy + Debug> Bvh<P> {
    /// Create a tree with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a tree with an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            arena: Arena::new(config.capacity),
            root: NodeIndex::INVALID,
            growth: config.growth,
            search_capacity: config.search_capacity,
            debug_validate: config.validate,
            leaf_count: 0,
            rng_state: 0xCAFE_F00D_DEAD_BEEF,
        }
    }

    /// Total node capacity (leaves and interior nodes combined).
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// The configured fat-box margin.
    pub fn growth(&self) -> f32 {
        self.growth
    }

    /// Number of live leaves.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    /// Whether the tree holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.root.is_invalid()
    }

    /// Insert a box with its payload. Returns the leaf handle, stable
    /// until [`Bvh::remove`] or [`Bvh::clear`].
    ///
    /// The stored box is `aabb` grown by the configured margin.
    pub fn insert(&mut self, aabb: Aabb, payload: P) -> Result<NodeIndex> {
        let leaf = self.arena.allocate()?;
        {
            let node = self.arena.get_mut(leaf);
            node.aabb = aabb.grow(self.growth);
            node.payload = Some(payload);
        }
        if let Err(e) = self.link_leaf(leaf) {
            // linking needed a second slot and the pool was exhausted;
            // back out so the failed insert leaves no trace
            self.arena.free(leaf);
            return Err(e);
        }
        self.leaf_count += 1;
        self.maybe_validate();
        Ok(leaf)
    }

    /// Remove a leaf and recycle its slot. Interior handles are rejected.
    pub fn remove(&mut self, index: NodeIndex) -> Result<()> {
        self.leaf_ref(index)?;
        self.unlink_leaf(index);
        self.arena.free(index);
        self.leaf_count -= 1;
        self.maybe_validate();
        Ok(())
    }

    /// Move a leaf to a new box, keeping its handle.
    ///
    /// If the stored fat box still contains `aabb` the tree is left
    /// untouched and `Ok(false)` is returned. Otherwise the leaf is
    /// unlinked, re-fattened and re-inserted through the standard
    /// insertion path (including the rotation pass), and `Ok(true)` is
    /// returned.
    pub fn update(&mut self, index: NodeIndex, aabb: Aabb) -> Result<bool> {
        let fat = self.leaf_ref(index)?.aabb;
        if fat.contains(&aabb) {
            return Ok(false);
        }
        self.unlink_leaf(index);
        self.arena.get_mut(index).aabb = aabb.grow(self.growth);
        // unlinking returned the collapsed parent slot to the pool, so
        // re-linking cannot exhaust it
        self.link_leaf(index)?;
        self.maybe_validate();
        Ok(true)
    }

    /// Borrow a node, leaf or interior. The AABB seen here is the fat box.
    pub fn get(&self, index: NodeIndex) -> Result<&Node<P>> {
        self.node_ref(index)
    }

    /// The payload stored on a leaf.
    pub fn payload(&self, index: NodeIndex) -> Result<P> {
        let node = self.leaf_ref(index)?;
        node.payload.ok_or(Error::NotALeaf(index))
    }

    /// Handle of the root node, or [`Error::EmptyTree`].
    pub fn root_index(&self) -> Result<NodeIndex> {
        if self.root.is_invalid() {
            Err(Error::EmptyTree)
        } else {
            Ok(self.root)
        }
    }

    /// Borrow the root node, or [`Error::EmptyTree`].
    pub fn root(&self) -> Result<&Node<P>> {
        self.root_index().map(|index| self.arena.get(index))
    }

    /// Drop every box and rebuild the free-list. Capacity is retained and
    /// all outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NodeIndex::INVALID;
        self.leaf_count = 0;
    }

    /// Sum of interior-node areas, excluding the root. Lower is better;
    /// [`Bvh::optimize`] never increases this beyond float slack.
    pub fn quality(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.arena.capacity() {
            let index = NodeIndex::new(i);
            if index == self.root {
                continue;
            }
            if let Some(node) = self.arena.try_get(index) {
                if !node.is_leaf() {
                    total += node.aabb.area();
                }
            }
        }
        total
    }

    // --- internals ---

    pub(crate) fn node_ref(&self, index: NodeIndex) -> Result<&Node<P>> {
        self.arena.try_get(index).ok_or(Error::InvalidIndex(index))
    }

    pub(crate) fn leaf_ref(&self, index: NodeIndex) -> Result<&Node<P>> {
        let node = self.node_ref(index)?;
        if node.payload.is_none() {
            return Err(Error::NotALeaf(index));
        }
        Ok(node)
    }

    /// Recompute an interior node's AABB from its children.
    pub(crate) fn refit(&mut self, index: NodeIndex) {
        let [c0, c1] = self.arena.get(index).children;
        let aabb = self.arena.get(c0).aabb.union(&self.arena.get(c1).aabb);
        self.arena.get_mut(index).aabb = aabb;
    }

    /// Attach an initialised leaf to the tree: find the cheapest sibling,
    /// splice a fresh parent above it, then retighten and locally
    /// restructure every ancestor up to the root.
    fn link_leaf(&mut self, leaf: NodeIndex) -> Result<()> {
        if self.root.is_invalid() {
            self.root = leaf;
            self.arena.get_mut(leaf).parent = NodeIndex::INVALID;
            return Ok(());
        }
        let leaf_aabb = self.arena.get(leaf).aabb;
        let sibling = if self.arena.get(self.root).is_leaf() {
            self.root
        } else {
            self.best_sibling(&leaf_aabb)
        };

        let parent = self.arena.allocate()?;
        let grandparent = self.arena.get(sibling).parent;
        let sibling_aabb = self.arena.get(sibling).aabb;
        {
            let p = self.arena.get_mut(parent);
            p.aabb = sibling_aabb.union(&leaf_aabb);
            p.parent = grandparent;
            p.children = [sibling, leaf];
        }
        self.arena.get_mut(sibling).parent = parent;
        self.arena.get_mut(leaf).parent = parent;
        if grandparent.is_invalid() {
            self.root = parent;
        } else {
            let g = self.arena.get_mut(grandparent);
            if g.children[0] == sibling {
                g.children[0] = parent;
            } else {
                g.children[1] = parent;
            }
        }

        let mut walk = parent;
        while !walk.is_invalid() {
            self.refit(walk);
            self.optimize_node(walk);
            walk = self.arena.get(walk).parent;
        }
        Ok(())
    }

    /// Branch-and-bound sibling search.
    ///
    /// The heap holds `(node, inherited)` entries where `inherited` is the
    /// sum of growth deltas accrued at ancestors, a lower bound on the
    /// cost of any sibling inside the subtree. Entries at or above the
    /// incumbent are discarded unexpanded. Ties keep heap order, so the
    /// first candidate popped wins.
    fn best_sibling(&self, leaf_aabb: &Aabb) -> NodeIndex {
        let mut heap = SearchHeap::new(self.search_capacity);
        heap.push(Candidate {
            index: self.root,
            cost: 0.0,
        });
        let mut best = NodeIndex::INVALID;
        let mut best_cost = f64::INFINITY;
        while let Some(Candidate { index, cost }) = heap.pop() {
            if cost >= best_cost {
                continue;
            }
            let node = self.arena.get(index);
            let delta = node.aabb.union(leaf_aabb).area() - node.aabb.area();
            if node.is_leaf() {
                let total = cost + delta;
                if total < best_cost {
                    best_cost = total;
                    best = index;
                }
            } else {
                let inherited = cost + delta;
                if inherited < best_cost {
                    let [c0, c1] = node.children;
                    let pushed = heap.push(Candidate {
                        index: c0,
                        cost: inherited,
                    }) && heap.push(Candidate {
                        index: c1,
                        cost: inherited,
                    });
                    if !pushed {
                        return self.greedy_sibling(leaf_aabb);
                    }
                }
            }
        }
        if best.is_invalid() {
            self.greedy_sibling(leaf_aabb)
        } else {
            best
        }
    }

    /// Greedy fallback: descend towards the child whose hypothetical
    /// insertion yields the smaller combined surface area.
    fn greedy_sibling(&self, leaf_aabb: &Aabb) -> NodeIndex {
        let mut index = self.root;
        loop {
            let node = self.arena.get(index);
            if node.is_leaf() {
                return index;
            }
            let [c0, c1] = node.children;
            let a0 = self.arena.get(c0).aabb;
            let a1 = self.arena.get(c1).aabb;
            let sah_0 = a0.union(leaf_aabb).area() + a1.area();
            let sah_1 = a1.union(leaf_aabb).area() + a0.area();
            index = if sah_0 <= sah_1 { c0 } else { c1 };
        }
    }

    /// Detach a leaf, collapsing its parent. The leaf slot itself is not
    /// freed; its parent link is cleared.
    fn unlink_leaf(&mut self, leaf: NodeIndex) {
        if leaf == self.root {
            self.root = NodeIndex::INVALID;
            return;
        }
        let parent = self.arena.get(leaf).parent;
        let pnode = self.arena.get(parent);
        let sibling = if pnode.children[0] == leaf {
            pnode.children[1]
        } else {
            pnode.children[0]
        };
        let grandparent = pnode.parent;
        if grandparent.is_invalid() {
            // the collapsed parent was the root: promote the sibling
            self.root = sibling;
            self.arena.get_mut(sibling).parent = NodeIndex::INVALID;
        } else {
            let g = self.arena.get_mut(grandparent);
            if g.children[0] == parent {
                g.children[0] = sibling;
            } else {
                g.children[1] = sibling;
            }
            self.arena.get_mut(sibling).parent = grandparent;
            // tighten the ancestors that just lost a box
            let mut walk = grandparent;
            while !walk.is_invalid() {
                self.refit(walk);
                walk = self.arena.get(walk).parent;
            }
        }
        self.arena.free(parent);
        self.arena.get_mut(leaf).parent = NodeIndex::INVALID;
    }

    pub(crate) fn maybe_validate(&self) {
        if self.debug_validate {
            self.validate();
        }
    }

    pub(crate) fn validation_enabled(&self) -> bool {
        self.debug_validate
    }

    /// Assert every structural invariant. Panics on violation; a failure
    /// here is a bug in the tree, not a recoverable condition.
    pub fn validate(&self) {
        let mut reachable = 0;
        if !self.root.is_invalid() {
            assert!(
                self.arena.get(self.root).parent.is_invalid(),
                "the root must have no parent"
            );
            reachable = self.validate_node(self.root);
        }
        assert_eq!(
            reachable + self.arena.free_len(),
            self.arena.capacity(),
            "reachable nodes and the free-list must partition the pool"
        );
    }

    fn validate_node(&self, index: NodeIndex) -> usize {
        let node = self.arena.get(index);
        if node.is_leaf() {
            assert!(node.children[1].is_invalid(), "leaves have no children");
            assert!(node.payload.is_some(), "leaves carry the client payload");
            1
        } else {
            let [c0, c1] = node.children;
            assert!(!c0.is_invalid() && !c1.is_invalid(), "interior nodes have two children");
            assert_ne!(c0, c1, "children must be distinct");
            assert!(node.payload.is_none(), "interior nodes carry no payload");
            assert_eq!(self.arena.get(c0).parent, index, "child 0 parent link");
            assert_eq!(self.arena.get(c1).parent, index, "child 1 parent link");
            let union = self.arena.get(c0).aabb.union(&self.arena.get(c1).aabb);
            assert_eq!(node.aabb, union, "interior AABB must equal the child union");
            1 + self.validate_node(c0) + self.validate_node(c1)
        }
    }
}
