//! Hash engine entry points.
//!
//! A value is first canonicalized into a [`Value`] (type inspection happens once,
//! through `serde`), then its canonical byte stream is mixed by MurmurHash3
//! x64-128 with the fixed [`SEED`](crate::murmur3::SEED).

use serde::Serialize;

use crate::error::Result;
use crate::ser::to_value;
use crate::value::Value;

/// 128-bit digest, as the two 64-bit lanes of MurmurHash3 x64-128.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HashDigest {
    /// First lane, also the high half of [`HashDigest::as_u128`].
    pub h1: u64,
    /// Second lane.
    pub h2: u64,
}

impl HashDigest {
    #[inline]
    pub fn as_u128(&self) -> u128 {
        (u128::from(self.h1) << 64) | u128::from(self.h2)
    }

    /// Both lanes, little-endian, `h1` first. Used when a digest is fed back
    /// into the mixer as part of a sequence encoding.
    #[inline]
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.h1.to_le_bytes());
        bytes[8..].copy_from_slice(&self.h2.to_le_bytes());
        bytes
    }
}

impl From<HashDigest> for (u64, u64) {
    fn from(digest: HashDigest) -> Self {
        (digest.h1, digest.h2)
    }
}

impl From<HashDigest> for u128 {
    fn from(digest: HashDigest) -> Self {
        digest.as_u128()
    }
}

/// Hash any supported value to a 128-bit digest.
///
/// Fails with [`Error::UnsupportedValue`](crate::Error::UnsupportedValue) when
/// `value`, or anything nested in it, has no canonical encoding.
pub fn hash128<T: Serialize + ?Sized>(value: &T) -> Result<HashDigest> {
    Ok(to_value(value)?.hash128())
}

/// Hash raw bytes as a `u8` buffer.
///
/// Serde presents `Vec<u8>` and `&[u8]` as sequences of integers, so
/// [`hash128`] hashes them element by element. Use this entry point (or
/// [`Buffer::raw`](crate::Buffer::raw)) when the bytes themselves are the value.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> HashDigest {
    Value::from(bytes).hash128()
}

/// Hash an already canonicalized value.
#[inline]
pub fn hash_value(value: &Value) -> HashDigest {
    value.hash128()
}
