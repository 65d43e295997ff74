#![no_main]

use hll_sketch::HyperLogLog;
use libfuzzer_sys::fuzz_target;
use wyhash::{wyhash, WyHash};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut lhs = HyperLogLog::<WyHash>::with_log2m(10).unwrap();
    for chunk in first_half.chunks(4) {
        lhs.offer(&chunk);
    }

    let mut rhs = HyperLogLog::<WyHash>::with_log2m(10).unwrap();
    for chunk in second_half.chunks(4) {
        rhs.offer(&chunk);
    }

    let mut ab = lhs.clone();
    ab.merge(&rhs).unwrap();
    let mut ba = rhs.clone();
    ba.merge(&lhs).unwrap();
    assert_eq!(ab, ba);

    let mut twice = ab.clone();
    twice.merge(&ab).unwrap();
    assert_eq!(twice, ab);
});
