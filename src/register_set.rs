//! Fixed-size array of 6-bit registers bit-packed into `u32` words.
//!
//! Register `i` occupies bits `[6 * i, 6 * i + 6)` of the word stream and may
//! straddle two adjacent words. Every access therefore reads or rewrites two
//! consecutive words unconditionally; the backing storage carries one spare
//! word past the packed registers so the two-word window is always in bounds.
//!
//! Registers only ever grow: the single mutation path is a compare-and-keep-max
//! update, which is what makes merging two register sets an element-wise max.

use std::fmt::{Debug, Formatter};

use crate::SketchError;

/// Bits per register. Ranks derived from 32-bit hashes never exceed 29, so six
/// bits hold every reachable value.
const REGISTER_WIDTH: usize = 6;

#[derive(Clone, PartialEq, Eq)]
pub struct RegisterSet {
    words: Box<[u32]>,
    count: usize,
}

impl RegisterSet {
    /// Largest value a register can hold.
    pub const MAX_VALUE: u8 = (1 << REGISTER_WIDTH) - 1;

    /// Creates `count` registers, all zero. The owning sketch sizes this as
    /// `2^log2m`; other counts are permitted for direct use.
    pub fn new(count: usize) -> Self {
        Self {
            words: vec![0u32; Self::word_len(count)].into_boxed_slice(),
            count,
        }
    }

    /// Number of registers.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the value of register `index`.
    pub fn get(&self, index: usize) -> Result<u8, SketchError> {
        self.check_index(index)?;
        Ok(self.load(index))
    }

    /// Stores `max(current, candidate)` into register `index` and reports
    /// whether the stored value changed. Candidates above [`Self::MAX_VALUE`]
    /// are clamped to it, so the kept value is always the running maximum.
    pub fn update_if_greater(&mut self, index: usize, candidate: u8) -> Result<bool, SketchError> {
        self.check_index(index)?;
        Ok(self.update_rank(index, candidate.min(Self::MAX_VALUE)))
    }

    /// Iterates over all register values in index order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.count).map(|index| self.load(index))
    }

    fn check_index(&self, index: usize) -> Result<(), SketchError> {
        if index < self.count {
            Ok(())
        } else {
            Err(SketchError::OutOfRange {
                index,
                count: self.count,
            })
        }
    }

    /// Keep-max update on the hot path. Callers guarantee `index < count`.
    #[inline]
    pub(crate) fn update_rank(&mut self, index: usize, rank: u8) -> bool {
        let current = self.load(index);
        if rank > current {
            self.store(index, rank);
            true
        } else {
            false
        }
    }

    /// Element-wise maximum of both register sets. Callers guarantee equal
    /// register counts.
    pub(crate) fn merge_from(&mut self, other: &RegisterSet) {
        debug_assert_eq!(self.count, other.count);
        for index in 0..self.count {
            let rank = other.load(index);
            if rank > self.load(index) {
                self.store(index, rank);
            }
        }
    }

    #[inline]
    fn load(&self, index: usize) -> u8 {
        let bit_idx = index * REGISTER_WIDTH;
        let u32_idx = bit_idx / 32;
        let bit_pos = bit_idx % 32;
        let bits = &self.words[u32_idx..u32_idx + 2];
        let bits_1 = REGISTER_WIDTH.min(32 - bit_pos);
        let bits_2 = REGISTER_WIDTH - bits_1;
        let mask_1 = (1u32 << bits_1) - 1;
        let mask_2 = (1u32 << bits_2) - 1;

        (((bits[0] >> bit_pos) & mask_1) | ((bits[1] & mask_2) << bits_1)) as u8
    }

    #[inline]
    fn store(&mut self, index: usize, value: u8) {
        let bit_idx = index * REGISTER_WIDTH;
        let u32_idx = bit_idx / 32;
        let bit_pos = bit_idx % 32;
        let bits = &mut self.words[u32_idx..u32_idx + 2];
        let bits_1 = REGISTER_WIDTH.min(32 - bit_pos);
        let bits_2 = REGISTER_WIDTH - bits_1;
        let mask_1 = (1u32 << bits_1) - 1;
        let mask_2 = (1u32 << bits_2) - 1;
        let value = u32::from(value);

        // Unconditionally rewrite both words based on `value` bits and masks
        bits[0] &= !(mask_1 << bit_pos);
        bits[0] |= (value & mask_1) << bit_pos;
        bits[1] &= !mask_2;
        bits[1] |= (value >> bits_1) & mask_2;
    }

    /// Backing words for `count` registers: ceiling of the packed length plus
    /// the spare word for the two-word access window.
    pub(crate) fn word_len(count: usize) -> usize {
        count * REGISTER_WIDTH / 32 + 2
    }

    pub(crate) fn words(&self) -> &[u32] {
        &self.words
    }

    /// Rebuilds a register set from raw words, refusing lengths the packing
    /// could not have produced.
    pub(crate) fn from_words(count: usize, words: Vec<u32>) -> Option<Self> {
        (words.len() == Self::word_len(count)).then(|| Self {
            words: words.into_boxed_slice(),
            count,
        })
    }
}

impl Debug for RegisterSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegisterSet {{ count: {} }}", self.count)
    }
}
