//! Serde support for `HyperLogLog`, enabled by the `with_serde` feature.
//!
//! A sketch serializes as the tuple `(log2m, words)`, where `words` is the raw
//! backing storage of its register set. That pair is enough to reconstruct the
//! sketch exactly: the register count and bias-correction constant are derived
//! from `log2m`, and the hasher is part of the deserialized type.
//!
//! Deserialization validates what the constructors would have enforced, so a
//! sketch can never be rebuilt from a state the crate could not have produced:
//! `log2m` must be in the supported range and the word count must match the
//! register packing for that precision.

use std::hash::Hasher;

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::hyperloglog::{HyperLogLog, MAX_LOG2M, MIN_LOG2M};
use crate::register_set::RegisterSet;

impl<H: Hasher + Default> Serialize for HyperLogLog<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.log2m())?;
        tup.serialize_element(self.register_set().words())?;
        tup.end()
    }
}

impl<'de, H: Hasher + Default> Deserialize<'de> for HyperLogLog<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (log2m, words): (u32, Vec<u32>) = Deserialize::deserialize(deserializer)?;
        if !(MIN_LOG2M..=MAX_LOG2M).contains(&log2m) {
            return Err(Error::custom(format!(
                "log2m {} is outside the supported [{}, {}] range",
                log2m, MIN_LOG2M, MAX_LOG2M
            )));
        }
        let count = 1usize << log2m;
        let registers = RegisterSet::from_words(count, words)
            .ok_or_else(|| Error::custom("register data length does not match log2m"))?;
        Ok(HyperLogLog::from_registers(log2m, registers))
    }
}
