use crate::error::Error;

/// Number of entries a leaf holds before it is first considered for
/// promotion.
pub const DEFAULT_LEAF_FANOUT: usize = 16;

/// Tunables for an [`IntervalTree`](crate::IntervalTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Promotion is evaluated each time a leaf holding a positive multiple of
    /// this many entries receives another one.
    pub leaf_fanout: usize,
    /// Capacity hint for the value store.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leaf_fanout: DEFAULT_LEAF_FANOUT,
            initial_capacity: 0,
        }
    }
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.leaf_fanout == 0 {
            return Err(Error::ZeroLeafFanout);
        }
        Ok(())
    }
}
