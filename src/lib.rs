//! # multi-binned-intervals
//!
//! An associative container from closed `u64` intervals to values, answering
//! "every value whose interval overlaps `[start, end]`".
//!
//! Instead of a balanced comparison tree, intervals are routed by successive
//! 4-bit radix digits of their endpoints into a fixed-fanout trie. An
//! interval spanning several buckets is stored in each of them (it is
//! *multi-binned*). Leaves hold short lists that are scanned linearly and
//! are promoted into hierarchical nodes once the next digit separates their
//! contents.
//!
//! ## Example
//!
//! ```rust
//! use multi_binned_intervals::{Interval, IntervalTree};
//!
//! let mut tree = IntervalTree::new();
//! tree.add(Interval::new(1, 5), "first");
//! tree.add(Interval::new(7, 10), "second");
//! tree.add(Interval::new(1, 2), "third");
//!
//! let found = tree.all_intersections(5, 8).unwrap();
//! assert_eq!(found, vec![&"first", &"second"]);
//! assert!(tree.all_intersections(11, 20).is_none());
//! ```

mod config;
mod error;
mod indices;
mod interval;
mod node;

pub use config::{Config, DEFAULT_LEAF_FANOUT};
pub use error::Error;
pub use indices::ValueIndices;
pub use interval::Interval;
pub use node::{BRANCHING_FACTOR_POWER, HIERARCHICAL_FANOUT, MAX_DEPTH};

use node::HierarchicalNode;

/// Shape of the node structure, as reported by [`IntervalTree::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Hierarchical nodes, including the root.
    pub hierarchical_nodes: usize,
    pub leaf_nodes: usize,
    /// Entries across all leaves. Exceeds [`IntervalTree::len`] when
    /// intervals span several buckets.
    pub stored_entries: usize,
    /// Depth of the deepest node; the root is at depth 0.
    pub max_depth: u32,
}

/// A multi-binned interval tree over `u64`.
///
/// Values live in an append-only store and are never removed. Nodes refer to
/// them by their position in that store.
#[derive(Clone)]
pub struct IntervalTree<V> {
    root: HierarchicalNode,
    /// `entries[i]` is the interval and value of the `i`-th call to `add`.
    entries: Vec<(Interval, V)>,
    config: Config,
}

impl<V> IntervalTree<V> {
    pub fn new() -> Self {
        Self {
            root: HierarchicalNode::new(),
            entries: Vec::new(),
            config: Config::default(),
        }
    }

    pub fn with_config(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            root: HierarchicalNode::new(),
            entries: Vec::with_capacity(config.initial_capacity),
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `value` under `interval`. Never fails; `interval` is not
    /// validated (see [`Interval`]).
    pub fn add(&mut self, interval: Interval, value: V) {
        let index = self.entries.len();
        self.entries.push((interval, value));
        self.root.add(interval, index, 0, self.config.leaf_fanout);
    }

    /// Values whose interval overlaps `[start, end]`, in insertion order, or
    /// `None` if there are none.
    pub fn all_intersections(&self, start: u64, end: u64) -> Option<Vec<&V>> {
        let indices = self.intersecting_indices(start, end);
        if indices.is_empty() {
            return None;
        }

        Some(
            indices
                .sorted()
                .into_iter()
                .map(|index| &self.entries[index].1)
                .collect(),
        )
    }

    /// Store positions of the values [`all_intersections`](Self::all_intersections)
    /// would return.
    pub fn intersecting_indices(&self, start: u64, end: u64) -> ValueIndices {
        self.root.all_intersections(start, end)
    }

    pub fn any_intersection(&self, start: u64, end: u64) -> bool {
        !self.intersecting_indices(start, end).is_empty()
    }

    /// The interval and value added at position `index`.
    pub fn get(&self, index: usize) -> Option<(Interval, &V)> {
        self.entries
            .get(index)
            .map(|(interval, value)| (*interval, value))
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.root.collect_stats(0, &mut stats);
        stats
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<HierarchicalNode>()
            + self.root.heap_size()
            + self.entries.capacity() * std::mem::size_of::<(Interval, V)>()
    }

    pub fn shrink_to_fit(&mut self) {
        self.root.shrink_to_fit();
        self.entries.shrink_to_fit();
    }
}

impl<V> Default for IntervalTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for IntervalTree<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Extend<(Interval, V)> for IntervalTree<V> {
    fn extend<I: IntoIterator<Item = (Interval, V)>>(&mut self, iter: I) {
        for (interval, value) in iter {
            self.add(interval, value);
        }
    }
}

impl<V> FromIterator<(Interval, V)> for IntervalTree<V> {
    fn from_iter<I: IntoIterator<Item = (Interval, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

pub struct Iter<'a, V> {
    inner: std::slice::Iter<'a, (Interval, V)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Interval, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(interval, value)| (*interval, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a IntervalTree<V> {
    type Item = (Interval, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
