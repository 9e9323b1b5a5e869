pub mod amount;
pub mod cli;
pub mod loader;
pub mod report;

pub use amount::{ParseAmountError, format_amount, parse_amount};
pub use loader::{IncomeSourceLoader, SourceLoadError, load_from_file, load_from_str};
pub use report::{AggregateReport, RegimeReport, SalaryReport, SolutionReport};
