#![no_main]

use libfuzzer_sys::fuzz_target;
use murmur_hyperloglog::{murmur3_x64_128, HyperLogLog};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = murmur3_x64_128(data, 0).h1 as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1 = HyperLogLog::default();
    for chunk in first_half.chunks(4) {
        estimator1.add_bytes(chunk);
        assert!(estimator1.cardinality() > 0.0);
    }

    let mut estimator2 = HyperLogLog::default();
    for chunk in second_half.chunks(4) {
        estimator2.add_bytes(chunk);
        assert!(estimator2.cardinality() > 0.0);
    }

    let before = estimator1.clone();
    estimator1.merge(&estimator2).unwrap();
    assert!(estimator1
        .registers()
        .iter()
        .zip(before.registers())
        .all(|(merged, old)| merged >= old));
});
