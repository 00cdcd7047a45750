//! Reconstructable state of a [`HyperLogLog`].
//!
//! A [`Snapshot`] is the ordered record `{precision, alpha, m, registers}`.
//! Restoring validates that the parts are consistent with each other, so a
//! restored estimator behaves exactly like the one the snapshot was taken from.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hyperloglog::{alpha, HyperLogLog, MAX_PRECISION, MIN_PRECISION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub precision: u8,
    pub alpha: f64,
    pub m: usize,
    pub registers: Vec<u8>,
}

impl HyperLogLog {
    /// Capture the full state of the estimator.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            precision: self.precision(),
            alpha: self.alpha(),
            m: self.m(),
            registers: self.registers().to_vec(),
        }
    }

    /// Rebuild an estimator from a snapshot.
    pub fn restore(snapshot: Snapshot) -> Result<Self> {
        match snapshot.validate() {
            Ok(()) => {
                debug!(precision = snapshot.precision, "restoring HyperLogLog");
                Ok(HyperLogLog::from_parts(
                    snapshot.precision,
                    snapshot.alpha,
                    snapshot.registers.into_boxed_slice(),
                ))
            }
            Err(err) => {
                warn!(%err, "rejecting HyperLogLog snapshot");
                Err(err)
            }
        }
    }
}

impl Snapshot {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(Error::InvalidSnapshot(reason));

        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return invalid(format!("precision {} is outside [4, 16]", self.precision));
        }
        let m = 1usize << self.precision;
        if self.m != m {
            return invalid(format!("m = {} does not match precision {}", self.m, self.precision));
        }
        if self.registers.len() != m {
            return invalid(format!("expected {} registers, got {}", m, self.registers.len()));
        }
        let expected_alpha = alpha(self.precision)?;
        if self.alpha.to_bits() != expected_alpha.to_bits() {
            return invalid(format!(
                "alpha {} does not match precision {}",
                self.alpha, self.precision
            ));
        }
        let max_rank = 33 - self.precision;
        if let Some((idx, rank)) = self
            .registers
            .iter()
            .enumerate()
            .find(|&(_, &rank)| rank > max_rank)
        {
            return invalid(format!("register {} holds rank {} > {}", idx, rank, max_rank));
        }
        Ok(())
    }
}

impl From<&HyperLogLog> for Snapshot {
    fn from(hll: &HyperLogLog) -> Self {
        hll.snapshot()
    }
}

impl TryFrom<Snapshot> for HyperLogLog {
    type Error = Error;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        HyperLogLog::restore(snapshot)
    }
}
