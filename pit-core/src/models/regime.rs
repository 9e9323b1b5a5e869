use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contribution::ContributionSet;
use super::flat_rate::FlatRateSchedule;
use super::income_source::IncomeType;
use super::tax_bracket::TaxBracket;
use super::tax_input::Region;

/// Identity of a bundled legal regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeId {
    /// Seven-bracket schedule with the 2020 family deductions.
    Pre2026,
    /// Five-bracket schedule with the 2026 family deductions.
    From2026,
}

impl RegimeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre2026 => "pre-2026",
            Self::From2026 => "2026",
        }
    }
}

impl fmt::Display for RegimeId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open date range `[from, until)`; `until == None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveWindow {
    pub from: NaiveDate,
    pub until: Option<NaiveDate>,
}

impl EffectiveWindow {
    pub fn new(
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> Self {
        Self { from, until }
    }

    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        date >= self.from && self.until.is_none_or(|until| date < until)
    }

    pub fn overlaps(
        &self,
        other: &EffectiveWindow,
    ) -> bool {
        let starts_before_other_ends = other.until.is_none_or(|until| self.from < until);
        let other_starts_before_end = self.until.is_none_or(|until| other.from < until);
        starts_before_other_ends && other_starts_before_end
    }

    pub fn is_valid(&self) -> bool {
        self.until.is_none_or(|until| self.from < until)
    }
}

/// A category whose cutover differs from the regime's general window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWindow {
    pub category: IncomeType,
    pub window: EffectiveWindow,
}

/// Mandatory insurance parameters.
///
/// Social and health insurance are capped at a multiple of the statutory
/// base salary; unemployment insurance at the same multiple of the regional
/// minimum wage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceSchedule {
    pub base_salary: Decimal,
    pub ceiling_multiplier: Decimal,
    /// Indexed by region I..IV.
    pub regional_minimum_wages: [Decimal; 4],
    pub employee_rates: ContributionSet,
    pub employer_rates: ContributionSet,
}

impl InsuranceSchedule {
    /// Monthly contribution ceiling per fund for `region`.
    pub fn ceilings(
        &self,
        region: Region,
    ) -> ContributionSet {
        let social_health = self.base_salary * self.ceiling_multiplier;
        ContributionSet {
            bhxh: social_health,
            bhyt: social_health,
            bhtn: self.regional_minimum_wages[region.index()] * self.ceiling_multiplier,
        }
    }
}

/// A complete, dated set of brackets, deductions and rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeConstants {
    pub id: RegimeId,
    /// Monthly brackets in ascending order.
    pub brackets: Vec<TaxBracket>,
    pub personal_deduction: Decimal,
    pub dependent_deduction: Decimal,
    /// Monthly cap on the voluntary-pension deduction.
    pub voluntary_pension_cap: Decimal,
    /// Flat rate on a non-resident's employment income.
    pub non_resident_rate: Decimal,
    pub insurance: InsuranceSchedule,
    pub flat_rates: FlatRateSchedule,
    /// Window for every category without its own entry below.
    pub window: EffectiveWindow,
    pub category_windows: Vec<CategoryWindow>,
}

impl RegimeConstants {
    pub fn window_for(
        &self,
        category: IncomeType,
    ) -> EffectiveWindow {
        self.category_windows
            .iter()
            .find(|cw| cw.category == category)
            .map(|cw| cw.window)
            .unwrap_or(self.window)
    }

    pub fn applies_to(
        &self,
        date: NaiveDate,
        category: IncomeType,
    ) -> bool {
        self.window_for(category).contains(date)
    }

    /// Combined employee insurance rate across all three funds.
    pub fn insurance_rate_personal(&self) -> Decimal {
        self.insurance.employee_rates.total()
    }
}
