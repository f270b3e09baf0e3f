use std::fmt;
use std::ops::RangeInclusive;

use crate::error::Error;

/// The closed interval `[start, end]` over `u64`.
///
/// Nothing stops `start` from exceeding `end`; such intervals are routed by
/// the same bucket arithmetic as any other and are the caller's
/// responsibility. Use [`Interval::try_new`] to reject them up front.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    #[inline]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn try_new(start: u64, end: u64) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// The single-point interval `[x, x]`.
    #[inline]
    pub const fn point(x: u64) -> Self {
        Self { start: x, end: x }
    }

    #[inline]
    pub const fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    #[inline]
    pub const fn contains(&self, x: u64) -> bool {
        self.start <= x && x <= self.end
    }

    /// Closed-interval overlap with `[start, end]`.
    #[inline]
    pub const fn overlaps(&self, start: u64, end: u64) -> bool {
        !(end < self.start || start > self.end)
    }

    #[inline]
    pub const fn intersects(&self, other: &Interval) -> bool {
        self.overlaps(other.start, other.end)
    }
}

impl From<RangeInclusive<u64>> for Interval {
    fn from(range: RangeInclusive<u64>) -> Self {
        let (start, end) = range.into_inner();
        Self { start, end }
    }
}

impl From<(u64, u64)> for Interval {
    fn from((start, end): (u64, u64)) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
