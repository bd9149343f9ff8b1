//! The `Interval` stored in `IntervalSet`, representing the inclusive range [low, high].
//!
//! Two intervals overlap when they share at least one integer, so [1, 5] and [3, 8]
//! overlap while the touching ranges [1, 5] and [6, 10] do not.
//!
//! Intervals order lexicographically by `(low, high)`. Inside an `IntervalSet` all
//! stored intervals are disjoint, so this is the same as ordering by `low`.

use std::fmt;

use crate::error::IntervalError;

/// The interval stored in `IntervalSet` represents [low, high]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(i64, i64)", into = "(i64, i64)")
)]
pub struct Interval {
    /// Low value
    pub(crate) low: i64,
    /// High value, inclusive
    pub(crate) high: i64,
}

impl Interval {
    /// Create a new `Interval`
    ///
    /// # Panics
    ///
    /// This method panics when low > high
    #[inline]
    #[must_use]
    pub fn new(low: i64, high: i64) -> Self {
        assert!(low <= high, "invalid range");
        Self { low, high }
    }

    /// Create a new `Interval`, rejecting low > high.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::InvalidRange`] when low > high.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalError};
    ///
    /// assert!(Interval::try_new(1, 1).is_ok());
    /// assert_eq!(
    ///     Interval::try_new(3, 1),
    ///     Err(IntervalError::InvalidRange { low: 3, high: 1 })
    /// );
    /// ```
    #[inline]
    pub fn try_new(low: i64, high: i64) -> Result<Self, IntervalError> {
        if low > high {
            return Err(IntervalError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    /// Create the single-point interval [p, p]
    #[inline]
    #[must_use]
    pub fn point(p: i64) -> Self {
        Self { low: p, high: p }
    }

    /// Low endpoint
    #[inline]
    #[must_use]
    pub fn low(&self) -> i64 {
        self.low
    }

    /// High endpoint, inclusive
    #[inline]
    #[must_use]
    pub fn high(&self) -> i64 {
        self.high
    }

    /// Checks if self overlaps with other interval
    #[inline]
    #[must_use]
    pub fn overlap(&self, other: &Self) -> bool {
        self.low <= other.high && other.low <= self.high
    }

    /// Checks if the point lies inside the interval
    #[inline]
    #[must_use]
    pub fn contains(&self, p: i64) -> bool {
        self.low <= p && p <= self.high
    }

    /// The smallest interval covering both `self` and `other`.
    ///
    /// Only meaningful when the two intervals overlap; otherwise the gap between
    /// them is covered as well.
    #[inline]
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Number of integers covered by the interval
    #[inline]
    #[must_use]
    pub fn len(&self) -> u128 {
        u128::from(self.high.abs_diff(self.low)) + 1
    }

    /// Remove the point `n`, returning the pieces left and right of it.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::OutOfRange`] when `n` is not inside the interval.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::Interval;
    ///
    /// assert_eq!(Interval::new(5, 5).split_at(5), Ok((None, None)));
    /// assert_eq!(
    ///     Interval::new(5, 10).split_at(5),
    ///     Ok((None, Some(Interval::new(6, 10))))
    /// );
    /// assert_eq!(
    ///     Interval::new(5, 10).split_at(7),
    ///     Ok((Some(Interval::new(5, 6)), Some(Interval::new(8, 10))))
    /// );
    /// assert!(Interval::new(5, 10).split_at(11).is_err());
    /// ```
    #[inline]
    pub fn split_at(&self, n: i64) -> Result<(Option<Self>, Option<Self>), IntervalError> {
        if !self.contains(n) {
            return Err(IntervalError::OutOfRange {
                point: n,
                interval: *self,
            });
        }
        let left = (n > self.low).then(|| Self {
            low: self.low,
            high: n - 1,
        });
        let right = (n < self.high).then(|| Self {
            low: n + 1,
            high: self.high,
        });
        Ok((left, right))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

impl TryFrom<(i64, i64)> for Interval {
    type Error = IntervalError;

    fn try_from((low, high): (i64, i64)) -> Result<Self, Self::Error> {
        Self::try_new(low, high)
    }
}

impl From<Interval> for (i64, i64) {
    fn from(interval: Interval) -> Self {
        (interval.low, interval.high)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic(expected = "invalid range")]
    fn invalid_range_should_panic() {
        let _interval = Interval::new(3, 1);
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Interval::new(1, 5);
        assert!(!a.overlap(&Interval::new(6, 10)));
        assert!(a.overlap(&Interval::new(5, 10)));
        assert!(a.overlap(&Interval::new(2, 3)));
        assert!(Interval::new(2, 3).overlap(&a));
        assert!(!Interval::new(-4, 0).overlap(&a));
    }

    #[test]
    fn merge_covers_both() {
        let merged = Interval::new(1, 5).merge(&Interval::new(3, 8));
        assert_eq!(merged, Interval::new(1, 8));
        let merged = Interval::new(2, 3).merge(&Interval::new(1, 9));
        assert_eq!(merged, Interval::new(1, 9));
    }

    #[test]
    fn len_is_inclusive() {
        assert_eq!(Interval::point(7).len(), 1);
        assert_eq!(Interval::new(-2, 2).len(), 5);
        assert_eq!(
            Interval::new(i64::MIN, i64::MAX).len(),
            u128::from(u64::MAX) + 1
        );
    }

    #[test]
    fn split_at_edges_of_domain() {
        assert_eq!(
            Interval::new(i64::MIN, i64::MAX).split_at(i64::MIN),
            Ok((None, Some(Interval::new(i64::MIN + 1, i64::MAX))))
        );
        assert_eq!(
            Interval::new(i64::MIN, i64::MAX).split_at(i64::MAX),
            Ok((Some(Interval::new(i64::MIN, i64::MAX - 1)), None))
        );
    }

    #[test]
    fn split_out_of_range_is_an_error() {
        let i = Interval::new(5, 10);
        assert_eq!(
            i.split_at(4),
            Err(IntervalError::OutOfRange {
                point: 4,
                interval: i
            })
        );
        assert_eq!(
            i.split_at(4).unwrap_err().to_string(),
            "point 4 is out of range [5, 10]"
        );
    }

    #[test]
    fn tuple_conversion_validates() {
        assert_eq!(Interval::try_from((1, 2)), Ok(Interval::new(1, 2)));
        assert!(Interval::try_from((2, 1)).is_err());
        assert_eq!(<(i64, i64)>::from(Interval::new(4, 9)), (4, 9));
    }
}
