#![no_main]

use libfuzzer_sys::fuzz_target;
use murmur_hyperloglog::HyperLogLog;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = serde_json::from_slice::<HyperLogLog>(data) {
        estimator.add(&1).unwrap();
        assert!(estimator.cardinality() > 0.0);
        assert_eq!(HyperLogLog::restore(estimator.snapshot()).unwrap(), estimator);
    }
});
