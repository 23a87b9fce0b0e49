//! Arena-allocated order-statistic AVL tree over code locations.
//!
//! [`RangeTree`] keeps a set of `u32` keys in order and answers the questions the code map asks
//! on every rewrite: which locations fall inside a half-open range, what position a location has
//! in the ordered sequence (rank), and which location sits at a given position (select). Every
//! node caches its subtree size, so rank and select are `O(log n)` like insert and delete.
//!
//! Nodes live in a single `Vec` and reference each other through [`NodeId`] indices. Freed slots
//! are recycled, so a map that shrinks through repeated merges never reallocates.
//!
//! # Example
//!
//! ```rust
//! use tclscope::utils::RangeTree;
//!
//! let mut tree = RangeTree::new();
//! for location in [10, 0, 5, 12, 7] {
//!     tree.insert(location);
//! }
//!
//! assert_eq!(tree.range(5, 12), vec![5, 7, 10]);
//! assert_eq!(tree.index_of(7), Some(2));
//! assert_eq!(tree.at(4), Some(12));
//!
//! tree.remove(5);
//! assert_eq!(tree.iter().collect::<Vec<_>>(), vec![0, 7, 10, 12]);
//! ```

use std::cmp::Ordering;

/// Index of a node inside the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw arena slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    key: u32,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: u32,
    size: usize,
}

/// An ordered set of locations with rank and select queries.
#[derive(Debug, Clone, Default)]
pub struct RangeTree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
}

impl RangeTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        RangeTree::default()
    }

    /// Number of keys in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes all keys and releases the arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
    }

    /// Returns `true` if `key` is in the tree.
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.find(key).is_some()
    }

    /// Smallest key.
    #[must_use]
    pub fn min(&self) -> Option<u32> {
        let mut current = self.root?;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        Some(self.node(current).key)
    }

    /// Largest key.
    #[must_use]
    pub fn max(&self) -> Option<u32> {
        let mut current = self.root?;
        while let Some(right) = self.node(current).right {
            current = right;
        }
        Some(self.node(current).key)
    }

    /// Inserts `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: u32) -> bool {
        let (root, inserted) = self.insert_at(self.root, key);
        self.root = Some(root);
        inserted
    }

    /// Removes `key`. Returns `false` if it was not present.
    pub fn remove(&mut self, key: u32) -> bool {
        let (root, removed) = self.remove_at(self.root, key);
        self.root = root;
        removed
    }

    /// Number of keys strictly less than `key`.
    #[must_use]
    pub fn rank(&self, key: u32) -> usize {
        let mut rank = 0;
        let mut current = self.root;

        while let Some(id) = current {
            let node = self.node(id);
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return rank + self.size(node.left),
                Ordering::Greater => {
                    rank += self.size(node.left) + 1;
                    current = node.right;
                }
            }
        }

        rank
    }

    /// Position of `key` in ascending order, if present.
    #[must_use]
    pub fn index_of(&self, key: u32) -> Option<usize> {
        self.find(key).map(|_| self.rank(key))
    }

    /// Key at position `index` in ascending order.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<u32> {
        let mut index = index;
        let mut current = self.root;

        while let Some(id) = current {
            let node = self.node(id);
            let left_size = self.size(node.left);
            match index.cmp(&left_size) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(node.key),
                Ordering::Greater => {
                    index -= left_size + 1;
                    current = node.right;
                }
            }
        }

        None
    }

    /// Keys in the half-open range `[start, end)`, ascending.
    #[must_use]
    pub fn range(&self, start: u32, end: u32) -> Vec<u32> {
        let mut keys = Vec::new();
        if start < end {
            self.collect_range(self.root, start, end, &mut keys);
        }
        keys
    }

    /// Ascending iterator over all keys.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }

    /// Height of the tree, 0 when empty.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn size(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| self.node(id).size)
    }

    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.node(id).height)
    }

    fn find(&self, key: u32) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => node.right,
            };
        }
        None
    }

    fn alloc(&mut self, key: u32) -> NodeId {
        let node = Node {
            key,
            left: None,
            right: None,
            height: 1,
            size: 1,
        };

        match self.free.pop() {
            Some(id) => {
                *self.node_mut(id) = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn update(&mut self, id: NodeId) {
        let (left, right) = (self.node(id).left, self.node(id).right);
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let size = 1 + self.size(left) + self.size(right);

        let node = self.node_mut(id);
        node.height = height;
        node.size = size;
    }

    fn balance_factor(&self, id: NodeId) -> i64 {
        let node = self.node(id);
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.node(id).left else {
            return id;
        };

        self.node_mut(id).left = self.node(pivot).right;
        self.node_mut(pivot).right = Some(id);
        self.update(id);
        self.update(pivot);
        pivot
    }

    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.node(id).right else {
            return id;
        };

        self.node_mut(id).right = self.node(pivot).left;
        self.node_mut(pivot).left = Some(id);
        self.update(id);
        self.update(pivot);
        pivot
    }

    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update(id);
        let balance = self.balance_factor(id);

        if balance > 1 {
            if let Some(left) = self.node(id).left {
                if self.balance_factor(left) < 0 {
                    let rotated = self.rotate_left(left);
                    self.node_mut(id).left = Some(rotated);
                }
            }
            return self.rotate_right(id);
        }

        if balance < -1 {
            if let Some(right) = self.node(id).right {
                if self.balance_factor(right) > 0 {
                    let rotated = self.rotate_right(right);
                    self.node_mut(id).right = Some(rotated);
                }
            }
            return self.rotate_left(id);
        }

        id
    }

    fn insert_at(&mut self, current: Option<NodeId>, key: u32) -> (NodeId, bool) {
        let Some(id) = current else {
            return (self.alloc(key), true);
        };

        let inserted = match key.cmp(&self.node(id).key) {
            Ordering::Equal => return (id, false),
            Ordering::Less => {
                let (child, inserted) = self.insert_at(self.node(id).left, key);
                self.node_mut(id).left = Some(child);
                inserted
            }
            Ordering::Greater => {
                let (child, inserted) = self.insert_at(self.node(id).right, key);
                self.node_mut(id).right = Some(child);
                inserted
            }
        };

        if !inserted {
            return (id, false);
        }
        (self.rebalance(id), true)
    }

    fn remove_at(&mut self, current: Option<NodeId>, key: u32) -> (Option<NodeId>, bool) {
        let Some(id) = current else {
            return (None, false);
        };

        let removed = match key.cmp(&self.node(id).key) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(self.node(id).left, key);
                self.node_mut(id).left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(self.node(id).right, key);
                self.node_mut(id).right = child;
                removed
            }
            Ordering::Equal => {
                let (left, right) = (self.node(id).left, self.node(id).right);
                let replacement = match (left, right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(_), Some(right)) => {
                        let (rest, successor) = self.take_min(right);
                        self.node_mut(successor).left = left;
                        self.node_mut(successor).right = rest;
                        Some(self.rebalance(successor))
                    }
                };
                self.free.push(id);
                return (replacement, true);
            }
        };

        if !removed {
            return (Some(id), false);
        }
        (Some(self.rebalance(id)), true)
    }

    /// Detaches the smallest node of a subtree. Returns the remaining subtree and the node.
    fn take_min(&mut self, id: NodeId) -> (Option<NodeId>, NodeId) {
        match self.node(id).left {
            None => (self.node(id).right, id),
            Some(left) => {
                let (rest, min) = self.take_min(left);
                self.node_mut(id).left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }

    fn collect_range(&self, current: Option<NodeId>, start: u32, end: u32, keys: &mut Vec<u32>) {
        let Some(id) = current else {
            return;
        };

        let node = self.node(id);
        if start < node.key {
            self.collect_range(node.left, start, end, keys);
        }
        if start <= node.key && node.key < end {
            keys.push(node.key);
        }
        if node.key < end {
            self.collect_range(node.right, start, end, keys);
        }
    }
}

/// Ascending iterator over the keys of a [`RangeTree`].
pub struct Iter<'a> {
    tree: &'a RangeTree,
    stack: Vec<NodeId>,
}

impl Iter<'_> {
    fn push_left(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = self.tree.node(id).left;
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.push_left(node.right);
        Some(node.key)
    }
}

impl<'a> IntoIterator for &'a RangeTree {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<u32> for RangeTree {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut tree = RangeTree::new();
        for key in iter {
            tree.insert(key);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    /// Deterministic pseudo-random keys.
    fn keys(count: usize, seed: u32) -> Vec<u32> {
        let mut state = seed;
        (0..count)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 8) % 1000
            })
            .collect()
    }

    fn check_invariants(tree: &RangeTree, current: Option<NodeId>) -> (u32, usize) {
        let Some(id) = current else {
            return (0, 0);
        };
        let node = tree.node(id);
        let (left_height, left_size) = check_invariants(tree, node.left);
        let (right_height, right_size) = check_invariants(tree, node.right);

        assert!(left_height.abs_diff(right_height) <= 1);
        assert_eq!(node.height, 1 + left_height.max(right_height));
        assert_eq!(node.size, 1 + left_size + right_size);
        (node.height, node.size)
    }

    #[test]
    fn matches_btreeset() {
        let mut tree = RangeTree::new();
        let mut reference = BTreeSet::new();

        for key in keys(500, 7) {
            assert_eq!(tree.insert(key), reference.insert(key));
        }
        check_invariants(&tree, tree.root);
        assert_eq!(tree.len(), reference.len());
        assert!(tree.iter().eq(reference.iter().copied()));

        for key in keys(300, 11) {
            assert_eq!(tree.remove(key), reference.remove(&key));
        }
        check_invariants(&tree, tree.root);
        assert!(tree.iter().eq(reference.iter().copied()));
        assert_eq!(tree.min(), reference.first().copied());
        assert_eq!(tree.max(), reference.last().copied());
    }

    #[test]
    fn rank_and_select() {
        let mut tree: RangeTree = keys(200, 3).into_iter().collect();
        for key in keys(50, 5) {
            tree.remove(key);
        }

        let sorted: Vec<u32> = tree.iter().collect();
        for (index, key) in sorted.iter().enumerate() {
            assert_eq!(tree.at(index), Some(*key));
            assert_eq!(tree.index_of(*key), Some(index));
        }
        assert_eq!(tree.at(sorted.len()), None);
        assert_eq!(tree.index_of(1001), None);
    }

    #[test]
    fn half_open_range() {
        let tree: RangeTree = [0, 2, 5, 7, 10, 15].into_iter().collect();

        assert_eq!(tree.range(2, 10), vec![2, 5, 7]);
        assert_eq!(tree.range(3, 11), vec![5, 7, 10]);
        assert_eq!(tree.range(10, 10), Vec::<u32>::new());
        assert_eq!(tree.range(16, 100), Vec::<u32>::new());
        assert_eq!(tree.rank(6), 3);
    }

    #[test]
    fn sequential_inserts_stay_balanced() {
        let tree: RangeTree = (0..1024).collect();
        assert_eq!(tree.len(), 1024);
        assert!(tree.height() <= 14);
    }

    #[test]
    fn slots_are_reused() {
        let mut tree: RangeTree = (0..16).collect();
        for key in 0..8 {
            tree.remove(key);
        }
        for key in 100..108 {
            tree.insert(key);
        }
        assert_eq!(tree.nodes.len(), 16);
        assert_eq!(tree.len(), 16);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
    }
}
