//! `murmur-hyperloglog` estimates the number of distinct elements in a stream or dataset with
//! bounded memory.
//!
//! Values are canonicalized into a byte stream and hashed with MurmurHash3 x64-128; the digest
//! feeds a classic HyperLogLog whose register count is derived from the requested relative error.
//! Estimators of equal precision can be merged, and their full state can be captured as a
//! [`Snapshot`] for an external serializer.
pub mod error;
pub mod hash;
pub mod hyperloglog;
pub mod murmur3;
pub mod ser;
mod serde;
pub mod snapshot;
pub mod value;

pub use error::{Error, Result};
pub use hash::{hash128, hash_bytes, hash_value, HashDigest};
pub use hyperloglog::{alpha, precision_for, rank, HyperLogLog};
pub use murmur3::murmur3_x64_128;
pub use ser::to_value;
pub use snapshot::Snapshot;
pub use value::{Buffer, ElementKind, Value};
