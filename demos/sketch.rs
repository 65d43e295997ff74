use hll_sketch::HyperLogLog;

fn main() {
    let mut words: HyperLogLog = HyperLogLog::with_rsd(0.05).expect("valid precision");
    words.offer("hhh");
    words.offer("mmm");
    words.offer("mmm");
    println!("distinct words = {}", words.cardinality());

    let mut left: HyperLogLog = HyperLogLog::with_rsd(0.05).expect("valid precision");
    for i in 0..10_000 {
        left.offer(&i);
    }
    println!("left estimate = {}", left.cardinality());

    let mut right: HyperLogLog = HyperLogLog::with_rsd(0.05).expect("valid precision");
    for i in 5_000..15_000 {
        right.offer(&i);
    }
    println!("right estimate = {}", right.cardinality());

    left.merge(&right).expect("equal precisions");
    println!("merged estimate = {}", left.cardinality());
}
