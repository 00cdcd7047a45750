//! HyperLogLog cardinality estimator.
//!
//! The estimator keeps `m = 2^p` one-byte registers. Every added value is hashed
//! with [`hash128`](crate::hash128) and only the low 32 bits of the first lane
//! are used:
//! - bits `0..p`       - register index
//! - bits `p..32`      - remainder, whose rank (leading zeros + 1 within
//!   `32 - p` bits) is stored if it beats the register's current value.
//!
//! Estimation uses the raw harmonic-mean estimate with the bias corrections of
//! the original HyperLogLog paper: linear counting for small cardinalities and
//! the large-range correction for the 32-bit hash space.
//!
//! [Original HyperLogLog paper](http://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)

use std::fmt::{Debug, Formatter};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::{hash128, hash_bytes, HashDigest};
use crate::value::Value;

/// Smallest supported precision.
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision.
pub const MAX_PRECISION: u8 = 16;
/// Width of the hash slice used for register updates.
const HASH_BITS: u32 = 32;
/// `2^32`, the size of the hash space the large-range correction is calibrated to.
const HASH_SPACE: f64 = 4_294_967_296.0;

#[derive(Clone, PartialEq)]
pub struct HyperLogLog {
    precision: u8,
    alpha: f64,
    registers: Box<[u8]>,
}

impl HyperLogLog {
    /// Create an estimator whose standard error is at most `relative_error`.
    pub fn new(relative_error: f64) -> Result<Self> {
        let precision = precision_for(relative_error)?;
        debug!(relative_error, precision, "creating HyperLogLog");
        Self::with_precision(precision)
    }

    /// Create an estimator with `2^precision` registers.
    pub fn with_precision(precision: u8) -> Result<Self> {
        let alpha = alpha(precision)?;
        Ok(Self {
            precision,
            alpha,
            registers: vec![0u8; 1 << precision].into_boxed_slice(),
        })
    }

    /// Rebuild an estimator from parts that were already validated.
    pub(crate) fn from_parts(precision: u8, alpha: f64, registers: Box<[u8]>) -> Self {
        debug_assert_eq!(registers.len(), 1 << precision);
        Self {
            precision,
            alpha,
            registers,
        }
    }

    /// Number of bits used for the register index.
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Number of registers.
    #[inline]
    pub fn m(&self) -> usize {
        self.registers.len()
    }

    /// Bias correction constant for this precision.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Hash `value` and add it to the estimator.
    ///
    /// An unsupported value is rejected before any register is touched.
    pub fn add<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let digest = hash128(value)?;
        self.add_hash(digest);
        Ok(())
    }

    /// Add raw bytes, hashed as a `u8` buffer.
    #[inline]
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.add_hash(hash_bytes(bytes));
    }

    /// Add an already canonicalized value.
    pub fn add_value(&mut self, value: &Value) {
        self.add_hash(value.hash128());
    }

    /// Add a precomputed digest.
    #[inline]
    pub fn add_hash(&mut self, digest: HashDigest) {
        let (idx, rank) = self.decode_hash(digest);
        let register = &mut self.registers[idx];
        if rank > *register {
            *register = rank;
        }
    }

    /// Split a digest into register index and rank.
    #[inline]
    fn decode_hash(&self, digest: HashDigest) -> (usize, u8) {
        let p = u32::from(self.precision);
        let x = digest.h1 & u64::from(u32::MAX);
        let idx = (x & ((1 << p) - 1)) as usize;
        let remainder = x >> p;
        let max_bits = HASH_BITS - p;
        // `remainder` has at most `max_bits` significant bits
        let rank = (max_bits + 1 - (u64::BITS - remainder.leading_zeros())) as u8;
        (idx, rank)
    }

    /// Estimated number of distinct values added so far.
    pub fn cardinality(&self) -> f64 {
        let m = self.m() as f64;
        let sum: f64 = self
            .registers
            .iter()
            .map(|&rank| 2f64.powi(-i32::from(rank)))
            .sum();
        let estimate = self.alpha * m * m / sum;

        if estimate <= 2.5 * m {
            let zeros = self.zero_registers();
            if zeros > 0 {
                return m * (m / zeros as f64).ln();
            }
        }

        if estimate > HASH_SPACE / 30.0 {
            if estimate >= HASH_SPACE {
                return f64::INFINITY;
            }
            return -HASH_SPACE * (1.0 - estimate / HASH_SPACE).ln();
        }

        estimate
    }

    /// [`cardinality`](Self::cardinality) rounded to the nearest integer.
    #[inline]
    pub fn estimate(&self) -> usize {
        (self.cardinality() + 0.5) as usize
    }

    /// Number of registers still at zero.
    #[inline]
    pub fn zero_registers(&self) -> usize {
        self.registers.iter().filter(|&&rank| rank == 0).count()
    }

    /// Whether nothing has been added yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&rank| rank == 0)
    }

    /// Merge `rhs` into `self`, keeping the register-wise maximum.
    ///
    /// Both estimators must have the same precision; `self` is left untouched
    /// otherwise.
    pub fn merge(&mut self, rhs: &HyperLogLog) -> Result<()> {
        if self.precision != rhs.precision {
            return Err(Error::IncompatiblePrecision {
                left: self.precision,
                right: rhs.precision,
            });
        }
        trace!(precision = self.precision, "merging HyperLogLog");
        for (lhs_rank, &rhs_rank) in self.registers.iter_mut().zip(rhs.registers.iter()) {
            if rhs_rank > *lhs_rank {
                *lhs_rank = rhs_rank;
            }
        }
        Ok(())
    }
}

impl Default for HyperLogLog {
    /// Precision 12: 4096 registers, 1.04 / sqrt(4096) = 1.625% standard error.
    fn default() -> Self {
        Self {
            precision: 12,
            alpha: 0.7213 / (1.0 + 1.079 / 4096.0),
            registers: vec![0u8; 4096].into_boxed_slice(),
        }
    }
}

impl Debug for HyperLogLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperLogLog")
            .field("precision", &self.precision)
            .field("m", &self.m())
            .field("alpha", &self.alpha)
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

/// Smallest precision whose standard error `1.04 / sqrt(2^p)` is within
/// `relative_error`.
pub fn precision_for(relative_error: f64) -> Result<u8> {
    if !(relative_error > 0.0 && relative_error < 1.0) {
        return Err(Error::InvalidRelativeError(relative_error));
    }
    let p = (2.0 * (1.04 / relative_error).log2()).ceil() as i64;
    if p < i64::from(MIN_PRECISION) || p > i64::from(MAX_PRECISION) {
        return Err(Error::InvalidPrecision(p));
    }
    Ok(p as u8)
}

/// Bias correction constant for precision `p`.
pub fn alpha(p: u8) -> Result<f64> {
    match p {
        4 => Ok(0.673),
        5 => Ok(0.697),
        6 => Ok(0.709),
        7..=MAX_PRECISION => Ok(0.7213 / (1.0 + 1.079 / f64::from(1u32 << p))),
        _ => Err(Error::InvalidPrecision(i64::from(p))),
    }
}

/// Position of the leftmost set bit of `w` within `max_bits` bits, counted
/// from 1; `max_bits + 1` when `w` is zero.
pub fn rank(w: u64, max_bits: u32) -> Result<u8> {
    let overflow = Error::RankOverflow { value: w, max_bits };
    if max_bits >= u64::BITS || w >> max_bits != 0 {
        return Err(overflow);
    }
    Ok((max_bits + 1 - (u64::BITS - w.leading_zeros())) as u8)
}
