use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal band of a progressive schedule.
///
/// Bounds are monthly amounts. `upper_bound` is exclusive and `None` marks
/// the open top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Part of `income` that falls inside this band once both bounds are
    /// scaled by `months`.
    pub fn taxable_portion(
        &self,
        income: Decimal,
        months: Decimal,
    ) -> Decimal {
        let lower = self.lower_bound * months;
        if income <= lower {
            return Decimal::ZERO;
        }
        let top = match self.upper_bound {
            Some(upper) => income.min(upper * months),
            None => income,
        };
        top - lower
    }
}
