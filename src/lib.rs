//! `hll-sketch` estimates the number of distinct elements in a stream or dataset
//! using the classic HyperLogLog algorithm with a fixed, small memory footprint.
//!
//! A sketch is configured once, either with a target relative standard deviation
//! ([`HyperLogLog::with_rsd`]) or with the register-count exponent directly
//! ([`HyperLogLog::with_log2m`]), and then fed values through
//! [`HyperLogLog::offer`]. [`HyperLogLog::cardinality`] reads the estimate at any
//! point without mutating the sketch, and sketches built with the same precision
//! combine losslessly through [`HyperLogLog::merge`].
//!
//! ```
//! use hll_sketch::HyperLogLog;
//!
//! let mut sketch: HyperLogLog = HyperLogLog::with_rsd(0.05).unwrap();
//! sketch.offer("alpha");
//! sketch.offer("beta");
//! sketch.offer("alpha");
//! println!("distinct values = {}", sketch.cardinality());
//! ```

use std::fmt;

pub mod estimator;
mod hyperloglog;
mod register_set;
#[cfg(feature = "with_serde")]
mod serde;

pub use crate::hyperloglog::{HyperLogLog, MAX_LOG2M, MIN_LOG2M};
pub use crate::register_set::RegisterSet;

/// Errors reported by sketch construction and register operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchError {
    /// The requested or derived `log2m` is outside [`MIN_LOG2M`]`..=`[`MAX_LOG2M`].
    InvalidConfig { log2m: i64 },
    /// A register index outside `[0, count)` was used. This indicates a bug in
    /// the caller rather than a recoverable condition.
    OutOfRange { index: usize, count: usize },
    /// Merging was attempted between sketches of different precisions.
    IncompatiblePrecision { left: u32, right: u32 },
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::InvalidConfig { log2m } => write!(
                f,
                "log2m {} is outside the supported [{}, {}] range",
                log2m, MIN_LOG2M, MAX_LOG2M
            ),
            SketchError::OutOfRange { index, count } => write!(
                f,
                "register index {} is out of range for {} registers",
                index, count
            ),
            SketchError::IncompatiblePrecision { left, right } => write!(
                f,
                "cannot merge sketches with different precisions: {} != {}",
                left, right
            ),
        }
    }
}

impl std::error::Error for SketchError {}
