//! Mandatory insurance contributions.
//!
//! Each fund has its own ceiling and rate:
//!
//! | Fund | Ceiling | Employee | Employer |
//! |------|---------|----------|----------|
//! | BHXH (social) | 20 × base salary | 8% | 17.5% |
//! | BHYT (health) | 20 × base salary | 1.5% | 3% |
//! | BHTN (unemployment) | 20 × regional minimum wage | 1% | 1% |
//!
//! The employee share is a deduction from taxable income, not a tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_currency;
use crate::models::{ContributionSet, InsuranceOptions, RegimeConstants, Region};

/// Contributions for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceBreakdown {
    pub employee: ContributionSet,
    pub employer: ContributionSet,
}

impl InsuranceBreakdown {
    pub fn none() -> Self {
        Self::default()
    }

    /// Employee total; this is the amount deducted from taxable income.
    pub fn total(&self) -> Decimal {
        self.employee.total()
    }
}

/// Calculator for mandatory insurance under one regime.
#[derive(Debug, Clone)]
pub struct InsuranceCalculator<'a> {
    regime: &'a RegimeConstants,
}

impl<'a> InsuranceCalculator<'a> {
    pub fn new(regime: &'a RegimeConstants) -> Self {
        Self { regime }
    }

    /// Computes contributions on `salary_base` for a period of `months`.
    ///
    /// Only funds enabled in `options` contribute. Ceilings are monthly and
    /// are scaled by `months`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use rust_decimal_macros::dec;
    /// use pit_core::calculations::InsuranceCalculator;
    /// use pit_core::regimes::vietnam;
    /// use pit_core::{InsuranceOptions, Region};
    ///
    /// let regime = vietnam::from_2026();
    /// let calculator = InsuranceCalculator::new(&regime);
    ///
    /// let result = calculator.compute(dec!(20000000), InsuranceOptions::all(), Region::I, Decimal::ONE);
    ///
    /// assert_eq!(result.employee.bhxh, dec!(1600000));
    /// assert_eq!(result.total(), dec!(2100000));
    /// ```
    pub fn compute(
        &self,
        salary_base: Decimal,
        options: InsuranceOptions,
        region: Region,
        months: Decimal,
    ) -> InsuranceBreakdown {
        let ceilings = self.regime.insurance.ceilings(region);
        let employee_rates = &self.regime.insurance.employee_rates;
        let employer_rates = &self.regime.insurance.employer_rates;

        let bhxh_base = self.contribution_base(salary_base, ceilings.bhxh, months, options.bhxh);
        let bhyt_base = self.contribution_base(salary_base, ceilings.bhyt, months, options.bhyt);
        let bhtn_base = self.contribution_base(salary_base, ceilings.bhtn, months, options.bhtn);

        InsuranceBreakdown {
            employee: ContributionSet {
                bhxh: round_currency(bhxh_base * employee_rates.bhxh),
                bhyt: round_currency(bhyt_base * employee_rates.bhyt),
                bhtn: round_currency(bhtn_base * employee_rates.bhtn),
            },
            employer: ContributionSet {
                bhxh: round_currency(bhxh_base * employer_rates.bhxh),
                bhyt: round_currency(bhyt_base * employer_rates.bhyt),
                bhtn: round_currency(bhtn_base * employer_rates.bhtn),
            },
        }
    }

    fn contribution_base(
        &self,
        salary_base: Decimal,
        monthly_ceiling: Decimal,
        months: Decimal,
        enabled: bool,
    ) -> Decimal {
        if !enabled {
            return Decimal::ZERO;
        }
        salary_base.min(monthly_ceiling * months)
    }
}
