//! Family and caller-supplied deductions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::floor_at_zero;
use crate::models::{RegimeConstants, TaxInput};

/// Deductions other than insurance, for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub personal: Decimal,
    pub dependent: Decimal,
    pub other: Decimal,
}

impl Deductions {
    pub fn total(&self) -> Decimal {
        self.personal + self.dependent + self.other
    }
}

#[derive(Debug, Clone)]
pub struct DeductionResolver<'a> {
    regime: &'a RegimeConstants,
}

impl<'a> DeductionResolver<'a> {
    pub fn new(regime: &'a RegimeConstants) -> Self {
        Self { regime }
    }

    /// Resolves deductions for `input`, scaled to its period.
    ///
    /// The personal deduction is flat and never reduced by income. The
    /// voluntary-pension part of other deductions is capped; charity is not.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    /// use pit_core::calculations::DeductionResolver;
    /// use pit_core::regimes::vietnam;
    /// use pit_core::TaxInput;
    ///
    /// let regime = vietnam::from_2026();
    /// let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let input = TaxInput::new(dec!(40000000), date).with_dependents(2);
    ///
    /// let deductions = DeductionResolver::new(&regime).resolve(&input);
    ///
    /// assert_eq!(deductions.personal, dec!(15500000));
    /// assert_eq!(deductions.dependent, dec!(12400000));
    /// ```
    pub fn resolve(
        &self,
        input: &TaxInput,
    ) -> Deductions {
        let months = input.period.months();

        Deductions {
            personal: self.regime.personal_deduction * months,
            dependent: self.regime.dependent_deduction * Decimal::from(input.dependents) * months,
            other: self.other_deductions(input, months),
        }
    }

    fn other_deductions(
        &self,
        input: &TaxInput,
        months: Decimal,
    ) -> Decimal {
        let requested = floor_at_zero(input.other_deductions.voluntary_pension);
        let cap = self.regime.voluntary_pension_cap * months;

        let pension = if requested > cap {
            warn!(
                requested = %requested,
                cap = %cap,
                "voluntary pension deduction exceeds cap; clamping"
            );
            cap
        } else {
            requested
        };

        pension + floor_at_zero(input.other_deductions.charity)
    }
}
