//! Tax calculation modules.
//!
//! [`TaxCalculator`] runs the gross-to-net pipeline for salary income,
//! [`GrossSolver`] inverts it, and [`IncomeAggregator`] combines salary with
//! the flat-rate categories into an annual summary.

pub mod aggregate;
pub mod common;
pub mod deductions;
pub mod forward;
pub mod insurance;
pub mod inverse;

pub use aggregate::{
    AggregateSummary, CategoryBreakdown, IncomeAggregator, PersonContext, SourceOutcome,
};
pub use deductions::{DeductionResolver, Deductions};
pub use forward::TaxCalculator;
pub use insurance::{InsuranceBreakdown, InsuranceCalculator};
pub use inverse::{GrossSolution, GrossSolver, SolverConfig};
