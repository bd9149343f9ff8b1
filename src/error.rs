use std::fmt;

use crate::interval::Interval;

/// Errors produced when building or splitting an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    /// The low endpoint is greater than the high endpoint.
    InvalidRange {
        /// Requested low endpoint
        low: i64,
        /// Requested high endpoint
        high: i64,
    },
    /// A split point lies outside the interval being split.
    OutOfRange {
        /// The point that was requested
        point: i64,
        /// The interval that does not contain it
        interval: Interval,
    },
}

impl fmt::Display for IntervalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalError::InvalidRange { low, high } => {
                write!(f, "invalid range: low {} is greater than high {}", low, high)
            }
            IntervalError::OutOfRange { point, interval } => {
                write!(f, "point {} is out of range {}", point, interval)
            }
        }
    }
}

impl std::error::Error for IntervalError {}
