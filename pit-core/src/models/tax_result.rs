use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contribution::ContributionSet;
use super::regime::RegimeId;
use super::tax_input::{Residency, TaxPeriod};

/// Tax owed inside one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    /// 1-based bracket number.
    pub bracket: usize,
    /// Bounds as applied, i.e. already scaled to the period.
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
}

/// Outcome of one salary calculation.
///
/// Derived wholesale from a [`TaxInput`](super::TaxInput) and the resolved
/// regime; never patched after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub regime: RegimeId,
    pub period: TaxPeriod,
    pub residency: Residency,
    pub gross_income: Decimal,
    pub insurance_deduction: Decimal,
    pub insurance_detail: ContributionSet,
    pub employer_contributions: ContributionSet,
    pub personal_deduction: Decimal,
    pub dependent_deduction: Decimal,
    pub other_deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_amount: Decimal,
    pub tax_breakdown: Vec<BracketContribution>,
    pub net_income: Decimal,
    pub effective_rate: Decimal,
    /// Gross plus the employer's insurance contributions.
    pub employer_cost: Decimal,
}

impl TaxResult {
    /// All-zero result for zero gross income.
    pub(crate) fn zero(
        regime: RegimeId,
        period: TaxPeriod,
        residency: Residency,
    ) -> Self {
        Self {
            regime,
            period,
            residency,
            gross_income: Decimal::ZERO,
            insurance_deduction: Decimal::ZERO,
            insurance_detail: ContributionSet::ZERO,
            employer_contributions: ContributionSet::ZERO,
            personal_deduction: Decimal::ZERO,
            dependent_deduction: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            tax_breakdown: Vec::new(),
            net_income: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            employer_cost: Decimal::ZERO,
        }
    }

    pub fn total_deductions(&self) -> Decimal {
        self.insurance_deduction
            + self.personal_deduction
            + self.dependent_deduction
            + self.other_deductions
    }
}
