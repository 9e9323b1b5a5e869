mod contribution;
mod flat_rate;
mod income_source;
mod regime;
mod tax_bracket;
mod tax_input;
mod tax_result;

pub use contribution::ContributionSet;
pub use flat_rate::{BusinessRates, Exemption, FlatRateSchedule, Threshold, Treatment, TreatmentKind};
pub use income_source::{BusinessSector, Frequency, IncomeSource, IncomeType, SourceFlags};
pub use regime::{CategoryWindow, EffectiveWindow, InsuranceSchedule, RegimeConstants, RegimeId};
pub use tax_bracket::TaxBracket;
pub use tax_input::{
    InsuranceOptions, MAX_AMOUNT, OtherDeductions, Region, Residency, TaxInput, TaxPeriod,
};
pub(crate) use tax_input::check_amount;
pub use tax_result::{BracketContribution, TaxResult};
