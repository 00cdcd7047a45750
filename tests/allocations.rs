#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use murmur_hyperloglog::{HashDigest, HyperLogLog};
use tabled::{
    settings::{Settings, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct Record {
    precision: u8,
    cardinality: u64,
    registers: usize,
    size_of: usize,
    total_bytes: u64,
    total_blocks: u64,
}

fn measure_memory_usage(precision: u8, cardinality: u64) -> Record {
    let _profiler = dhat::Profiler::builder().testing().build();
    let mut estimator = HyperLogLog::with_precision(precision).unwrap();
    for i in 0..cardinality {
        estimator.add_hash(HashDigest {
            h1: i.wrapping_mul(0x9e37_79b9_7f4a_7c15),
            h2: 0,
        });
    }
    let stats = dhat::HeapStats::get();
    Record {
        precision,
        cardinality,
        registers: estimator.m(),
        size_of: std::mem::size_of::<HyperLogLog>(),
        total_bytes: stats.total_bytes,
        total_blocks: stats.total_blocks,
    }
}

#[test]
fn test_allocations() {
    let results: Vec<Record> = [4u8, 9, 12, 16]
        .into_iter()
        .flat_map(|precision| [0u64, 1 << 10, 1 << 16].map(|cardinality| (precision, cardinality)))
        .map(|(precision, cardinality)| measure_memory_usage(precision, cardinality))
        .collect();

    // the register array is the only allocation, whatever the cardinality
    for record in &results {
        assert_eq!(record.total_bytes, record.registers as u64);
        assert_eq!(record.total_blocks, 1);
    }

    let table_config = Settings::default().with(Style::markdown());
    let markdown = Table::new(results).with(table_config).to_string();
    println!("{}", markdown);
}
