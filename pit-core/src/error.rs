//! Error taxonomy for the engine.
//!
//! Three families are kept apart so callers can react per category without
//! parsing messages:
//!
//! - [`InputError`]: the request itself is invalid. Nothing was computed.
//! - [`ConfigurationError`]: the regime table is incomplete or inconsistent.
//!   This is a defect in bundled data, not something a user can fix.
//! - [`TaxError::NotConverged`]: the net-to-gross solver ran out of
//!   iterations. The payload carries the best approximation found.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::GrossSolution;
use crate::models::{IncomeType, RegimeId};

/// A calculation request was rejected before any computation ran.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    /// A currency field was below zero.
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    /// A currency field exceeded [`MAX_AMOUNT`](crate::models::MAX_AMOUNT).
    #[error("{field} exceeds the supported maximum amount, got {value}")]
    AmountTooLarge { field: &'static str, value: Decimal },

    /// Regions are numbered 1 through 4.
    #[error("region must be between 1 and 4, got {0}")]
    InvalidRegion(u8),

    #[error("unknown income type '{0}'")]
    UnknownIncomeType(String),

    #[error("unknown frequency '{0}'")]
    UnknownFrequency(String),

    #[error("unknown business sector '{0}'")]
    UnknownBusinessSector(String),
}

/// The regime table cannot answer a request it should always answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("regime table is empty")]
    EmptyRegimeTable,

    #[error("no regime covers {date} for {category} income")]
    NoMatchingRegime {
        date: NaiveDate,
        category: IncomeType,
    },

    #[error("regimes {first} and {second} overlap for {category} income")]
    OverlappingRegimes {
        category: IncomeType,
        first: RegimeId,
        second: RegimeId,
    },

    /// A bounded window must end strictly after it starts.
    #[error("regime {regime} has an empty or inverted effective window")]
    InvalidWindow { regime: RegimeId },

    #[error("regime {regime} has an invalid bracket schedule: {reason}")]
    InvalidBrackets { regime: RegimeId, reason: String },
}

/// Any failure surfaced by a calculation entry point.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The solver stopped without meeting its tolerance.
    #[error(
        "net-to-gross search did not converge after {} iterations (best gross {}, net {})",
        .0.iterations, .0.gross, .0.net_income
    )]
    NotConverged(GrossSolution),
}
