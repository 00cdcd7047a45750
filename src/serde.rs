//! # Serde module for HyperLogLog
//!
//! `HyperLogLog` is serialized as the ordered tuple
//! `(precision, alpha, m, registers)`, the same record a [`Snapshot`] holds.
//!
//! During deserialization the tuple is turned back into a `Snapshot` and
//! restored, so every consistency check of [`HyperLogLog::restore`] applies and
//! inconsistent input is reported as a deserialization error.
use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::hyperloglog::HyperLogLog;
use crate::snapshot::Snapshot;

impl Serialize for HyperLogLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(4)?;
        tup.serialize_element(&self.precision())?;
        tup.serialize_element(&self.alpha())?;
        tup.serialize_element(&self.m())?;
        tup.serialize_element(self.registers())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for HyperLogLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (precision, alpha, m, registers): (u8, f64, usize, Vec<u8>) =
            Deserialize::deserialize(deserializer)?;
        HyperLogLog::restore(Snapshot {
            precision,
            alpha,
            m,
            registers,
        })
        .map_err(Error::custom)
    }
}
