//! Multi-source aggregation.
//!
//! Every source is normalised to an annual amount and dispatched on its
//! [`Treatment`]:
//!
//! - **Progressive** sources are summed first and taxed once, as a unit,
//!   through the annual bracket schedule. Taxing them one by one would hand
//!   each source its own trip through the lowest bracket.
//! - **Flat-rate** sources are multiplied by their category rate, after any
//!   threshold and exemption.
//! - **Exempt** sources contribute income but no tax.
//!
//! Each source's regime is resolved for its own category, so within a
//! transition year salary and lottery income may fall under different
//! regimes on the same reference date.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use pit_core::calculations::{IncomeAggregator, PersonContext};
//! use pit_core::{Frequency, IncomeSource, IncomeType, RegimeTable};
//!
//! let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
//! let sources = vec![
//!     IncomeSource::new("job", IncomeType::Salary, dec!(20000000), Frequency::Monthly),
//!     IncomeSource::new("prize", IncomeType::Lottery, dec!(50000000), Frequency::OneTime),
//! ];
//!
//! let summary = IncomeAggregator::new(RegimeTable::builtin())
//!     .aggregate(&sources, &PersonContext::new(date))
//!     .unwrap();
//!
//! // Salary: 12 × 120,000. Lottery: (50M − 10M) × 10%.
//! assert_eq!(summary.total_tax, dec!(5440000));
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{floor_at_zero, round_currency};
use crate::calculations::forward::compute_with_regime;
use crate::error::TaxError;
use crate::models::{
    Exemption, IncomeSource, IncomeType, InsuranceOptions, OtherDeductions, RegimeConstants,
    RegimeId, Region, Residency, TaxInput, TaxPeriod, TaxResult, Threshold, Treatment,
    TreatmentKind,
};
use crate::regimes::RegimeTable;

/// Facts about the person that apply to every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonContext {
    pub reference_date: NaiveDate,
    pub dependents: u32,
    pub has_insurance: bool,
    pub insurance_options: InsuranceOptions,
    pub region: Region,
    /// Annual amounts.
    pub other_deductions: OtherDeductions,
    pub residency: Residency,
}

impl PersonContext {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            dependents: 0,
            has_insurance: true,
            insurance_options: InsuranceOptions::all(),
            region: Region::I,
            other_deductions: OtherDeductions::default(),
            residency: Residency::Resident,
        }
    }

    pub fn with_dependents(
        mut self,
        dependents: u32,
    ) -> Self {
        self.dependents = dependents;
        self
    }

    pub fn without_insurance(mut self) -> Self {
        self.has_insurance = false;
        self
    }

    pub fn with_insurance_options(
        mut self,
        options: InsuranceOptions,
    ) -> Self {
        self.has_insurance = true;
        self.insurance_options = options;
        self
    }

    pub fn with_region(
        mut self,
        region: Region,
    ) -> Self {
        self.region = region;
        self
    }

    pub fn with_other_deductions(
        mut self,
        other_deductions: OtherDeductions,
    ) -> Self {
        self.other_deductions = other_deductions;
        self
    }

    pub fn with_residency(
        mut self,
        residency: Residency,
    ) -> Self {
        self.residency = residency;
        self
    }

    /// Annual salary-calculation input for the summed progressive income.
    fn annual_input(
        &self,
        gross_income: Decimal,
    ) -> TaxInput {
        let input = TaxInput::new(gross_income, self.reference_date)
            .with_dependents(self.dependents)
            .with_region(self.region)
            .with_other_deductions(self.other_deductions)
            .with_residency(self.residency)
            .with_period(TaxPeriod::Annual);

        if self.has_insurance {
            input.with_insurance_options(self.insurance_options)
        } else {
            input.without_insurance()
        }
    }
}

/// Tax outcome of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub id: String,
    pub category: IncomeType,
    pub treatment: TreatmentKind,
    pub annual_amount: Decimal,
    /// `None` for progressive sources, which are taxed jointly; see
    /// [`AggregateSummary::progressive`].
    pub tax: Option<Decimal>,
    pub exemption: Option<Exemption>,
}

/// Totals for one income category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: IncomeType,
    pub treatment: TreatmentKind,
    pub regime: RegimeId,
    pub gross: Decimal,
    pub tax: Decimal,
}

/// Annual totals across all sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_gross: Decimal,
    pub total_tax: Decimal,
    /// `total_gross − total_tax`.
    pub total_net: Decimal,
    /// In category declaration order.
    pub categories: Vec<CategoryBreakdown>,
    /// In input order.
    pub sources: Vec<SourceOutcome>,
    /// Annual calculation over all progressive sources, when there are any.
    pub progressive: Option<TaxResult>,
}

/// A source paired with its resolved regime and treatment.
struct Classified<'s, 'r> {
    source: &'s IncomeSource,
    regime: &'r RegimeConstants,
    treatment: Treatment,
    annual_amount: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct IncomeAggregator<'a> {
    table: &'a RegimeTable,
}

impl<'a> IncomeAggregator<'a> {
    pub fn new(table: &'a RegimeTable) -> Self {
        Self { table }
    }

    /// Taxes every source in `sources` for the person in `context`.
    ///
    /// # Errors
    ///
    /// - [`TaxError::Input`] if a source amount or other deduction is
    ///   negative. Nothing is computed in that case.
    /// - [`TaxError::Configuration`] if a source's category has no regime on
    ///   the reference date.
    pub fn aggregate(
        &self,
        sources: &[IncomeSource],
        context: &PersonContext,
    ) -> Result<AggregateSummary, TaxError> {
        context.other_deductions.validate()?;
        for source in sources {
            source.validate()?;
        }

        let classified = sources
            .iter()
            .map(|source| self.classify(source, context.reference_date))
            .collect::<Result<Vec<_>, _>>()?;

        let category_revenue = category_totals(&classified);

        let progressive_gross: Decimal = classified
            .iter()
            .filter(|c| c.treatment == Treatment::Progressive)
            .map(|c| c.annual_amount)
            .sum();

        let progressive = if classified
            .iter()
            .any(|c| c.treatment == Treatment::Progressive)
        {
            let regime = self
                .table
                .resolve(context.reference_date, IncomeType::Salary)?;
            Some(compute_with_regime(
                regime,
                &context.annual_input(progressive_gross),
            ))
        } else {
            None
        };

        let outcomes: Vec<SourceOutcome> = classified
            .iter()
            .map(|c| evaluate(c, &category_revenue))
            .collect();

        let categories = category_breakdowns(&classified, &outcomes, progressive.as_ref());

        let total_gross: Decimal = outcomes.iter().map(|o| o.annual_amount).sum();
        let total_tax: Decimal = categories.iter().map(|c| c.tax).sum();

        debug!(
            sources = sources.len(),
            total_gross = %total_gross,
            total_tax = %total_tax,
            "aggregated income sources"
        );

        Ok(AggregateSummary {
            total_gross,
            total_tax,
            total_net: total_gross - total_tax,
            categories,
            sources: outcomes,
            progressive,
        })
    }

    fn classify<'s>(
        &self,
        source: &'s IncomeSource,
        date: NaiveDate,
    ) -> Result<Classified<'s, 'a>, TaxError> {
        let regime = self.table.resolve(date, source.income_type)?;
        Ok(Classified {
            source,
            regime,
            treatment: regime.flat_rates.treatment(source),
            annual_amount: source.annual_amount(),
        })
    }
}

/// Annual amount per category, used by revenue floors.
fn category_totals(classified: &[Classified<'_, '_>]) -> BTreeMap<IncomeType, Decimal> {
    let mut totals = BTreeMap::new();
    for c in classified {
        *totals.entry(c.source.income_type).or_insert(Decimal::ZERO) += c.annual_amount;
    }
    totals
}

fn evaluate(
    classified: &Classified<'_, '_>,
    category_revenue: &BTreeMap<IncomeType, Decimal>,
) -> SourceOutcome {
    let source = classified.source;
    let outcome = |tax, exemption| SourceOutcome {
        id: source.id.clone(),
        category: source.income_type,
        treatment: classified.treatment.kind(),
        annual_amount: classified.annual_amount,
        tax,
        exemption,
    };

    match classified.treatment {
        Treatment::Progressive => outcome(None, None),
        Treatment::Exempt => outcome(Some(Decimal::ZERO), None),
        Treatment::FlatRate {
            exemption: Some(exemption),
            ..
        } if exemption.applies(&source.flags) => {
            debug!(
                source = %source.id,
                category = %source.income_type,
                %exemption,
                "exemption applied; no tax due"
            );
            outcome(Some(Decimal::ZERO), Some(exemption))
        }
        Treatment::FlatRate {
            rate, threshold, ..
        } => {
            let revenue = category_revenue
                .get(&source.income_type)
                .copied()
                .unwrap_or(Decimal::ZERO);
            outcome(Some(flat_tax(source, rate, threshold, revenue)), None)
        }
    }
}

/// Annual flat-rate tax on one source.
fn flat_tax(
    source: &IncomeSource,
    rate: Decimal,
    threshold: Threshold,
    category_revenue: Decimal,
) -> Decimal {
    match threshold {
        Threshold::None => round_currency(source.annual_amount() * rate),
        Threshold::PerPaymentAllowance(allowance) => {
            let per_payment = round_currency(floor_at_zero(source.amount - allowance) * rate);
            per_payment * source.frequency.payments_per_year()
        }
        Threshold::AnnualRevenueFloor(floor) if category_revenue <= floor => Decimal::ZERO,
        Threshold::AnnualRevenueFloor(_) => round_currency(source.annual_amount() * rate),
    }
}

fn category_breakdowns(
    classified: &[Classified<'_, '_>],
    outcomes: &[SourceOutcome],
    progressive: Option<&TaxResult>,
) -> Vec<CategoryBreakdown> {
    let mut categories: BTreeMap<IncomeType, CategoryBreakdown> = BTreeMap::new();

    for (c, outcome) in classified.iter().zip(outcomes) {
        let entry = categories
            .entry(c.source.income_type)
            .or_insert_with(|| CategoryBreakdown {
                category: c.source.income_type,
                treatment: outcome.treatment,
                regime: c.regime.id,
                gross: Decimal::ZERO,
                tax: Decimal::ZERO,
            });
        entry.gross += outcome.annual_amount;
        entry.tax += outcome.tax.unwrap_or(Decimal::ZERO);
    }

    if let Some(result) = progressive {
        for entry in categories
            .values_mut()
            .filter(|e| e.treatment == TreatmentKind::Progressive)
        {
            entry.tax = result.tax_amount;
            entry.regime = result.regime;
        }
    }

    categories.into_values().collect()
}
