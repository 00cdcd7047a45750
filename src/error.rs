//! Error type shared by the hash engine and the estimator.

use std::fmt::Display;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("relative error must be in (0, 1), got {0}")]
    InvalidRelativeError(f64),
    #[error("precision must be in [4, 16], got {0}")]
    InvalidPrecision(i64),
    #[error("rank input {value:#x} does not fit in {max_bits} bits")]
    RankOverflow { value: u64, max_bits: u32 },
    #[error("cannot merge estimator of precision {right} into precision {left}")]
    IncompatiblePrecision { left: u8, right: u8 },
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("unsupported value kind: {0}")]
    UnsupportedValue(String),
    #[error("buffer of {len} bytes is not a whole number of '{typecode}' elements of {width} bytes")]
    MisalignedBuffer {
        typecode: char,
        len: usize,
        width: usize,
    },
}

impl Error {
    /// Whether the error is a domain error: an argument outside the range the
    /// estimator is defined for.
    pub fn is_domain(&self) -> bool {
        !self.is_type()
    }

    /// Whether the error is a type error: a value the hash engine cannot
    /// canonicalize.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedValue(_) | Error::MisalignedBuffer { .. }
        )
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::UnsupportedValue(msg.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
