use rustc_hash::FxHashSet;

/// Deduplicating set of value-store indices produced by a query.
///
/// An interval spanning several buckets is replicated into each of them, so
/// the same index can be reported by more than one node; the set collapses
/// those back to one.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ValueIndices {
    set: FxHashSet<usize>,
}

impl ValueIndices {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            set: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        self.set.insert(index)
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.set.contains(&index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Moves every index of `other` into this set.
    pub fn merge(&mut self, mut other: ValueIndices) {
        if other.set.len() > self.set.len() {
            std::mem::swap(&mut self.set, &mut other.set);
        }
        self.set.extend(other.set);
    }

    /// Indices in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.set.iter().copied()
    }

    /// Indices in ascending order, i.e. insertion order of the values they
    /// refer to.
    pub fn sorted(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.iter().collect();
        indices.sort_unstable();
        indices
    }
}

impl Extend<usize> for ValueIndices {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.set.extend(iter);
    }
}

impl FromIterator<usize> for ValueIndices {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut indices = Self::new();
        indices.extend(iter);
        indices
    }
}
