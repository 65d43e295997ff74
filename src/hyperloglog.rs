//! The HyperLogLog sketch.
//!
//! Each offered value is hashed, the top `log2m` bits of the 32-bit hash pick
//! one of `m = 2^log2m` registers, and the register keeps the maximum rank
//! (leading-zero count plus one) seen for its bucket. The registers feed the
//! pure estimation math in [`crate::estimator`].
//!
//! Precision is fixed at construction: `log2m` trades memory (6 bits per
//! register) against the expected relative standard deviation
//! `1.106 / sqrt(m)`.

use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

use wyhash::WyHash;

use crate::estimator;
use crate::register_set::RegisterSet;
use crate::SketchError;

/// Smallest supported register-count exponent.
pub const MIN_LOG2M: u32 = 4;
/// Largest supported register-count exponent.
pub const MAX_LOG2M: u32 = 30;

/// HyperLogLog cardinality sketch over hasher `H`.
///
/// All mutating operations take `&mut self`; to ingest from several threads,
/// build one sketch per shard and fold them together with [`Self::merge`].
pub struct HyperLogLog<H: Hasher + Default = WyHash> {
    registers: RegisterSet,
    log2m: u32,
    alpha_mm: f64,
    /// Zero-sized build hasher
    build_hasher: BuildHasherDefault<H>,
}

impl<H: Hasher + Default> HyperLogLog<H> {
    /// Creates a sketch targeting the given relative standard deviation,
    /// deriving the precision as `log2m = floor(log2((1.106 / rsd)^2))`.
    ///
    /// Fails with [`SketchError::InvalidConfig`] when the derived `log2m`
    /// falls outside `[MIN_LOG2M, MAX_LOG2M]`, which also covers NaN,
    /// infinite, and non-positive `rsd` inputs.
    pub fn with_rsd(rsd: f64) -> Result<Self, SketchError> {
        let ratio = 1.106 / rsd;
        let log2m = ((ratio * ratio).ln() / std::f64::consts::LN_2).floor();
        if !(log2m >= f64::from(MIN_LOG2M) && log2m <= f64::from(MAX_LOG2M)) {
            return Err(SketchError::InvalidConfig {
                log2m: log2m as i64,
            });
        }
        Self::with_log2m(log2m as u32)
    }

    /// Creates a sketch with `2^log2m` registers.
    pub fn with_log2m(log2m: u32) -> Result<Self, SketchError> {
        if !(MIN_LOG2M..=MAX_LOG2M).contains(&log2m) {
            return Err(SketchError::InvalidConfig {
                log2m: i64::from(log2m),
            });
        }
        let m = 1usize << log2m;
        Ok(Self {
            registers: RegisterSet::new(m),
            log2m,
            alpha_mm: estimator::alpha_mm(log2m, m),
            build_hasher: BuildHasherDefault::default(),
        })
    }

    /// Offers a value to the sketch. Returns whether a register grew, i.e.
    /// whether the estimate may have changed.
    #[inline]
    pub fn offer<T: Hash + ?Sized>(&mut self, value: &T) -> bool {
        let mut hasher = self.build_hasher.build_hasher();
        value.hash(&mut hasher);
        let hash = hasher.finish();
        self.offer_hashed((hash ^ (hash >> 32)) as u32)
    }

    /// Offers a pre-computed, well-mixed 32-bit hash. The top `log2m` bits
    /// select the register; the remaining bits provide the rank.
    #[inline]
    pub fn offer_hashed(&mut self, hash: u32) -> bool {
        let index = bucket_of(hash, self.log2m);
        let rank = rank_of(hash, self.log2m);
        self.registers.update_rank(index, rank)
    }

    /// Returns the current cardinality estimate. Read-only; offering more
    /// values never requires re-reading past estimates.
    #[inline]
    pub fn cardinality(&self) -> u64 {
        estimator::cardinality(&self.registers, self.alpha_mm)
    }

    /// Folds `other` into `self` by element-wise register maximum, producing
    /// the sketch of the union of both streams. Commutative, associative and
    /// idempotent. Both sketches must share the same `log2m`.
    pub fn merge(&mut self, other: &Self) -> Result<(), SketchError> {
        if self.log2m != other.log2m {
            return Err(SketchError::IncompatiblePrecision {
                left: self.log2m,
                right: other.log2m,
            });
        }
        self.registers.merge_from(&other.registers);
        Ok(())
    }

    /// The register-count exponent this sketch was built with.
    #[inline]
    pub fn log2m(&self) -> u32 {
        self.log2m
    }

    /// Expected relative standard deviation of the estimate, `1.106 / sqrt(m)`.
    pub fn rsd(&self) -> f64 {
        1.106 / (self.registers.count() as f64).sqrt()
    }

    /// Read-only view of the underlying registers.
    #[inline]
    pub fn register_set(&self) -> &RegisterSet {
        &self.registers
    }

    /// Reassembles a sketch from validated parts (serde support).
    #[cfg(feature = "with_serde")]
    pub(crate) fn from_registers(log2m: u32, registers: RegisterSet) -> Self {
        let m = registers.count();
        Self {
            registers,
            log2m,
            alpha_mm: estimator::alpha_mm(log2m, m),
            build_hasher: BuildHasherDefault::default(),
        }
    }
}

impl<H: Hasher + Default> Clone for HyperLogLog<H> {
    fn clone(&self) -> Self {
        Self {
            registers: self.registers.clone(),
            log2m: self.log2m,
            alpha_mm: self.alpha_mm,
            build_hasher: BuildHasherDefault::default(),
        }
    }
}

impl<H: Hasher + Default> PartialEq for HyperLogLog<H> {
    /// Sketches compare equal when they have the same precision and register
    /// contents; the hasher is part of the type.
    fn eq(&self, other: &Self) -> bool {
        self.log2m == other.log2m && self.registers == other.registers
    }
}

impl<H: Hasher + Default> Debug for HyperLogLog<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HyperLogLog {{ log2m: {}, cardinality: {} }}",
            self.log2m,
            self.cardinality()
        )
    }
}

/// Register index for `hash`: its top `log2m` bits.
#[inline]
pub(crate) fn bucket_of(hash: u32, log2m: u32) -> usize {
    (hash >> (32 - log2m)) as usize
}

/// Rank for `hash`: leading zeros of the bits left after bucket extraction,
/// plus one. The OR'd guard constant bounds the count for an all-zero tail,
/// capping the rank at `32 - log2m + 1`.
#[inline]
pub(crate) fn rank_of(hash: u32, log2m: u32) -> u8 {
    (((hash << log2m) | ((1 << (log2m - 1)) + 1)).leading_zeros() + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x0000_0000, 4 => 0)]
    #[test_case(0xffff_ffff, 4 => 15)]
    #[test_case(0x8000_0000, 4 => 8)]
    #[test_case(0x0040_0000, 10 => 1)]
    #[test_case(0xffff_ffff, 10 => 1023)]
    #[test_case(0x0000_0003, 30 => 0)]
    #[test_case(0xffff_ffff, 30 => (1 << 30) - 1)]
    fn test_bucket_of(hash: u32, log2m: u32) -> usize {
        bucket_of(hash, log2m)
    }

    #[test_case(0x0000_0000, 4 => 29)]
    #[test_case(0xffff_ffff, 4 => 1)]
    #[test_case(0x0000_0000, 10 => 23)]
    #[test_case(0xffff_ffff, 10 => 1)]
    #[test_case(0x0020_0000, 10 => 1)]
    #[test_case(0x0004_0000, 10 => 4)]
    #[test_case(0x0000_0000, 30 => 3)]
    #[test_case(0xffff_ffff, 30 => 1)]
    fn test_rank_of(hash: u32, log2m: u32) -> u8 {
        rank_of(hash, log2m)
    }

    #[test_case(0)]
    #[test_case(3)]
    #[test_case(31)]
    #[test_case(u32::MAX)]
    fn test_with_log2m_rejects_out_of_range(log2m: u32) {
        assert_eq!(
            HyperLogLog::<WyHash>::with_log2m(log2m),
            Err(SketchError::InvalidConfig {
                log2m: i64::from(log2m)
            })
        );
    }

    #[test_case(4, 16)]
    #[test_case(10, 1024)]
    #[test_case(16, 65536)]
    fn test_with_log2m_sizes_registers(log2m: u32, m: usize) {
        let sketch = HyperLogLog::<WyHash>::with_log2m(log2m).unwrap();
        assert_eq!(sketch.log2m(), log2m);
        assert_eq!(sketch.register_set().count(), m);
    }

    #[test_case(0.1 => 6)]
    #[test_case(0.05 => 8)]
    #[test_case(0.02 => 11)]
    #[test_case(0.01 => 13)]
    fn test_with_rsd_derives_log2m(rsd: f64) -> u32 {
        HyperLogLog::<WyHash>::with_rsd(rsd).unwrap().log2m()
    }

    #[test_case(0.3; "derived log2m below range")]
    #[test_case(1.2; "negative derived log2m")]
    #[test_case(0.0; "zero rsd")]
    #[test_case(-0.5; "negative rsd")]
    #[test_case(f64::NAN; "nan rsd")]
    fn test_with_rsd_rejects_degenerate_inputs(rsd: f64) {
        assert!(matches!(
            HyperLogLog::<WyHash>::with_rsd(rsd),
            Err(SketchError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rsd_accessor_matches_precision() {
        let sketch = HyperLogLog::<WyHash>::with_log2m(10).unwrap();
        assert_eq!(sketch.rsd(), 1.106 / 32.0);
    }

    #[test]
    fn test_empty_sketch_estimates_zero() {
        let sketch = HyperLogLog::<WyHash>::with_log2m(10).unwrap();
        assert_eq!(sketch.cardinality(), 0);
    }

    #[test]
    fn test_offer_hashed_routes_bucket_and_rank() {
        let mut sketch = HyperLogLog::<WyHash>::with_log2m(4).unwrap();

        // top four bits pick register 15, the all-zero tail gives max rank
        assert!(sketch.offer_hashed(0xf000_0000));
        assert_eq!(sketch.register_set().get(15), Ok(29));

        // same bucket with a lower rank leaves the register untouched
        assert!(!sketch.offer_hashed(0xffff_ffff));
        assert_eq!(sketch.register_set().get(15), Ok(29));
    }

    #[test]
    fn test_offer_reports_register_growth() {
        let mut sketch: HyperLogLog = HyperLogLog::with_log2m(10).unwrap();
        assert!(sketch.offer("first"));
        assert!(!sketch.offer("first"));
        assert_eq!(sketch.cardinality(), 1);
    }

    #[test]
    fn test_merge_takes_element_wise_max() {
        let mut lhs = HyperLogLog::<WyHash>::with_log2m(4).unwrap();
        let mut rhs = HyperLogLog::<WyHash>::with_log2m(4).unwrap();
        lhs.offer_hashed(0x1000_0000);
        rhs.offer_hashed(0x1800_0000);
        rhs.offer_hashed(0x2000_0000);

        lhs.merge(&rhs).unwrap();

        assert_eq!(lhs.register_set().get(1), Ok(29));
        assert_eq!(lhs.register_set().get(2), Ok(29));
    }

    #[test]
    fn test_merge_rejects_mixed_precisions() {
        let mut lhs = HyperLogLog::<WyHash>::with_log2m(10).unwrap();
        let rhs = HyperLogLog::<WyHash>::with_log2m(12).unwrap();
        assert_eq!(
            lhs.merge(&rhs),
            Err(SketchError::IncompatiblePrecision {
                left: 10,
                right: 12
            })
        );
    }
}
