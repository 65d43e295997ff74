#![no_main]

use hll_sketch::HyperLogLog;
use libfuzzer_sys::fuzz_target;
use wyhash::WyHash;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut sketch) = serde_json::from_slice::<HyperLogLog<WyHash>>(data) {
        sketch.offer(&1);
        assert!(sketch.cardinality() > 0);
    }
});
