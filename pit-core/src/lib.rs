pub mod calculations;
pub mod error;
pub mod models;
pub mod regimes;

pub use calculations::{
    AggregateSummary, GrossSolution, GrossSolver, IncomeAggregator, PersonContext, SolverConfig,
    TaxCalculator,
};
pub use error::{ConfigurationError, InputError, TaxError};
pub use models::*;
pub use regimes::RegimeTable;
