use murmur_hyperloglog::{hash128, HyperLogLog};

fn main() -> Result<(), murmur_hyperloglog::Error> {
    let mut estimator1 = HyperLogLog::new(0.05)?;
    for i in 0..10 {
        estimator1.add(&i)?;
    }
    println!("estimator1 estimate = {:.2}", estimator1.cardinality());

    let mut estimator2 = HyperLogLog::new(0.05)?;
    for i in 10..15 {
        estimator2.add(&i)?;
    }
    println!("estimator2 estimate = {:.2}", estimator2.cardinality());

    estimator1.merge(&estimator2)?;
    println!("merged estimate = {:.2}", estimator1.cardinality());

    let digest = hash128(&("answer", 42))?;
    println!("hash128((\"answer\", 42)) = ({:#018x}, {:#018x})", digest.h1, digest.h2);

    Ok(())
}
