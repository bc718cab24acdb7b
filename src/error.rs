//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by the FV engine.
///
/// Noise-budget exhaustion is *not* represented here: a ciphertext whose
/// noise has grown past Δ/2 decrypts to a wrong plaintext without any error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FvError {
    /// Invalid parameters, rejected when a context, ring or table is built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operands built under different moduli, degrees or key bundles.
    #[error("domain mismatch: {0}")]
    DomainMismatch(String),

    /// A value does not fit the requested representation.
    #[error("out of range: {0}")]
    Range(String),

    /// An integer literal could not be parsed.
    #[error("invalid integer literal: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, FvError>;

macro_rules! config_err {
    ($($arg:tt)*) => {
        $crate::error::FvError::Configuration(format!($($arg)*))
    };
}

macro_rules! mismatch_err {
    ($($arg:tt)*) => {
        $crate::error::FvError::DomainMismatch(format!($($arg)*))
    };
}

macro_rules! range_err {
    ($($arg:tt)*) => {
        $crate::error::FvError::Range(format!($($arg)*))
    };
}

pub(crate) use config_err;
pub(crate) use mismatch_err;
pub(crate) use range_err;
