use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One value per mandatory insurance fund.
///
/// Used for rates, ceilings and amounts alike:
/// - `bhxh`: social insurance
/// - `bhyt`: health insurance
/// - `bhtn`: unemployment insurance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSet {
    pub bhxh: Decimal,
    pub bhyt: Decimal,
    pub bhtn: Decimal,
}

impl ContributionSet {
    pub const ZERO: Self = Self {
        bhxh: Decimal::ZERO,
        bhyt: Decimal::ZERO,
        bhtn: Decimal::ZERO,
    };

    pub fn new(
        bhxh: Decimal,
        bhyt: Decimal,
        bhtn: Decimal,
    ) -> Self {
        Self { bhxh, bhyt, bhtn }
    }

    pub fn total(&self) -> Decimal {
        self.bhxh + self.bhyt + self.bhtn
    }
}
