use tracing::trace;

use crate::indices::ValueIndices;
use crate::interval::Interval;
use crate::TreeStats;

// =============================================================================
// Configuration
// =============================================================================

/// Each hierarchical level consumes this many bits of an endpoint.
pub const BRANCHING_FACTOR_POWER: u32 = 4;
/// Child slots per hierarchical node.
pub const HIERARCHICAL_FANOUT: usize = 1 << BRANCHING_FACTOR_POWER;
/// Radix digits in a `u64`. A leaf this deep has nothing left to split on.
pub const MAX_DEPTH: u32 = u64::BITS / BRANCHING_FACTOR_POWER;

const LOW_DIGIT_MASK: u64 = (1 << BRANCHING_FACTOR_POWER) - 1;

// =============================================================================
// Bucket routing
// =============================================================================

/// Child slot for `x`: its most significant radix digit.
///
/// ```text
/// MSB bits:  0123    4567 ...
///           bucket  offset...
/// ```
#[inline]
fn bucket(x: u64) -> usize {
    (x >> (u64::BITS - BRANCHING_FACTOR_POWER)) as usize
}

/// Buckets spanned by `[start, end]`, each paired with the bounds its child
/// sees once the leading digit is shifted out.
///
/// Only the first bucket keeps the shifted start and only the last keeps the
/// shifted end; the buckets in between are covered from `0` to `u64::MAX`.
///
/// ```text
/// | bucket 0 | bucket 1 | bucket 2 | ...
///     ^--------------------^
///   start                 end
/// ```
///
/// When `bucket(start) > bucket(end)` the range is empty.
fn route(start: u64, end: u64) -> impl Iterator<Item = (usize, Interval)> {
    let first = bucket(start);
    let last = bucket(end);
    (first..=last).map(move |i| {
        let lo = if i == first {
            start << BRANCHING_FACTOR_POWER
        } else {
            0
        };
        let hi = if i == last {
            end << BRANCHING_FACTOR_POWER
        } else {
            u64::MAX
        };
        (i, Interval::new(lo, hi))
    })
}

// =============================================================================
// Node
// =============================================================================

/// A subtree. Bounds handed to a node at depth `d` have already had `4 * d`
/// leading bits shifted out by its ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Node {
    Leaf(LeafNode),
    Hierarchical(Box<HierarchicalNode>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Leaf(LeafNode::default())
    }
}

impl Node {
    /// Inserts and returns the node that now occupies this slot. A leaf may
    /// come back as a hierarchical node.
    pub(crate) fn add(self, interval: Interval, index: usize, depth: u32, leaf_fanout: usize) -> Node {
        match self {
            Node::Leaf(leaf) => leaf.add(interval, index, depth, leaf_fanout),
            Node::Hierarchical(mut node) => {
                node.add(interval, index, depth, leaf_fanout);
                Node::Hierarchical(node)
            }
        }
    }

    pub(crate) fn all_intersections(&self, start: u64, end: u64) -> ValueIndices {
        match self {
            Node::Leaf(leaf) => leaf.all_intersections(start, end),
            Node::Hierarchical(node) => node.all_intersections(start, end),
        }
    }

    pub(crate) fn collect_stats(&self, depth: u32, stats: &mut TreeStats) {
        match self {
            Node::Leaf(leaf) => {
                stats.leaf_nodes += 1;
                stats.stored_entries += leaf.len();
                stats.max_depth = stats.max_depth.max(depth);
            }
            Node::Hierarchical(node) => node.collect_stats(depth, stats),
        }
    }

    pub(crate) fn heap_size(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.heap_size(),
            Node::Hierarchical(node) => std::mem::size_of::<HierarchicalNode>() + node.heap_size(),
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        match self {
            Node::Leaf(leaf) => leaf.shrink_to_fit(),
            Node::Hierarchical(node) => node.shrink_to_fit(),
        }
    }
}

// =============================================================================
// Hierarchical node
// =============================================================================

/// Sixteen child slots, one per radix digit. Slots stay `None` until an
/// interval is first routed into them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HierarchicalNode {
    pub(crate) children: [Option<Node>; HIERARCHICAL_FANOUT],
}

impl Default for HierarchicalNode {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchicalNode {
    pub(crate) fn new() -> Self {
        Self {
            children: std::array::from_fn(|_| None),
        }
    }

    pub(crate) fn add(&mut self, interval: Interval, index: usize, depth: u32, leaf_fanout: usize) {
        for (i, sub) in route(interval.start, interval.end) {
            let child = self.children[i].take().unwrap_or_default();
            self.children[i] = Some(child.add(sub, index, depth + 1, leaf_fanout));
        }
    }

    pub(crate) fn all_intersections(&self, start: u64, end: u64) -> ValueIndices {
        let mut matching = ValueIndices::new();
        for (i, sub) in route(start, end) {
            let Some(child) = &self.children[i] else {
                continue;
            };
            let found = child.all_intersections(sub.start, sub.end);
            if !found.is_empty() {
                matching.merge(found);
            }
        }
        matching
    }

    pub(crate) fn collect_stats(&self, depth: u32, stats: &mut TreeStats) {
        stats.hierarchical_nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        for child in self.children.iter().flatten() {
            child.collect_stats(depth + 1, stats);
        }
    }

    /// Heap bytes owned by the children, excluding this node itself.
    pub(crate) fn heap_size(&self) -> usize {
        self.children.iter().flatten().map(Node::heap_size).sum()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        for child in self.children.iter_mut().flatten() {
            child.shrink_to_fit();
        }
    }
}

// =============================================================================
// Leaf node
// =============================================================================

/// Parallel lists: `intervals[i]` belongs to value index `indices[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LeafNode {
    pub(crate) intervals: Vec<Interval>,
    pub(crate) indices: Vec<usize>,
}

impl LeafNode {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Appends, unless the leaf already holds a positive multiple of
    /// `leaf_fanout` entries and [`should_split`](Self::should_split) says
    /// the next digit separates them. In that case every stored entry plus
    /// the new one is replayed into a fresh hierarchical node, which is
    /// returned in place of this leaf.
    pub(crate) fn add(mut self, interval: Interval, index: usize, depth: u32, leaf_fanout: usize) -> Node {
        let len = self.len();
        if len > 0 && len % leaf_fanout == 0 && depth < MAX_DEPTH {
            if self.should_split() {
                trace!(depth, entries = len + 1, "promoting leaf to hierarchical node");
                let mut promoted = HierarchicalNode::new();
                for (stored, stored_index) in self.intervals.into_iter().zip(self.indices) {
                    promoted.add(stored, stored_index, depth, leaf_fanout);
                }
                promoted.add(interval, index, depth, leaf_fanout);
                return Node::Hierarchical(Box::new(promoted));
            }
            trace!(depth, entries = len + 1, "leaf does not discriminate, keeping it unsplit");
        }

        self.intervals.push(interval);
        self.indices.push(index);
        Node::Leaf(self)
    }

    /// Whether the stored intervals fall into at least two groups once the
    /// low digit of their starts (or, separately, their ends) is masked off.
    pub(crate) fn should_split(&self) -> bool {
        fn discriminates(mut bounds: impl Iterator<Item = u64>) -> bool {
            let Some(first) = bounds.next() else {
                return false;
            };
            let first = first & !LOW_DIGIT_MASK;
            bounds.any(|bound| bound & !LOW_DIGIT_MASK != first)
        }

        discriminates(self.intervals.iter().map(|iv| iv.start))
            || discriminates(self.intervals.iter().map(|iv| iv.end))
    }

    pub(crate) fn all_intersections(&self, start: u64, end: u64) -> ValueIndices {
        // Interior buckets are queried whole.
        if start == 0 && end == u64::MAX {
            let mut all = ValueIndices::with_capacity(self.indices.len());
            all.extend(self.indices.iter().copied());
            return all;
        }

        let mut matching = ValueIndices::new();
        for (interval, &index) in self.intervals.iter().zip(&self.indices) {
            if interval.overlaps(start, end) {
                matching.insert(index);
            }
        }
        matching
    }

    fn heap_size(&self) -> usize {
        self.intervals.capacity() * std::mem::size_of::<Interval>()
            + self.indices.capacity() * std::mem::size_of::<usize>()
    }

    fn shrink_to_fit(&mut self) {
        self.intervals.shrink_to_fit();
        self.indices.shrink_to_fit();
    }
}
