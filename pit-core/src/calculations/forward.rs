//! Gross-to-net salary calculation.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1 | Resolve the regime for the reference date (salary category) |
//! | 2 | Insurance contributions, zero when insurance is off |
//! | 3 | Personal, dependent and other deductions |
//! | 4 | Taxable income = gross − insurance − deductions, floored at zero |
//! | 5 | Walk the brackets; tax each band's slice at its marginal rate |
//! | 6 | Net = gross − insurance − tax; effective rate = tax / gross |
//!
//! A non-resident skips steps 3 to 5: the whole gross is taxed at the
//! regime's flat non-resident rate.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use pit_core::{RegimeTable, TaxCalculator, TaxInput};
//!
//! let calculator = TaxCalculator::new(RegimeTable::builtin());
//! let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//!
//! let result = calculator.compute(&TaxInput::new(dec!(20000000), date)).unwrap();
//!
//! // 20,000,000 − 2,100,000 insurance − 15,500,000 personal deduction
//! assert_eq!(result.taxable_income, dec!(2400000));
//! assert_eq!(result.tax_amount, dec!(120000));
//! assert_eq!(result.net_income, dec!(17780000));
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{floor_at_zero, round_currency};
use crate::calculations::deductions::{DeductionResolver, Deductions};
use crate::calculations::insurance::{InsuranceBreakdown, InsuranceCalculator};
use crate::error::TaxError;
use crate::models::{
    BracketContribution, IncomeType, RegimeConstants, Residency, TaxBracket, TaxInput, TaxResult,
};
use crate::regimes::RegimeTable;

/// Decimal places kept on the effective rate.
const EFFECTIVE_RATE_DP: u32 = 6;

/// Forward calculator over a regime table.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    table: &'a RegimeTable,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(table: &'a RegimeTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a RegimeTable {
        self.table
    }

    /// Computes tax and net income for `input`.
    ///
    /// # Errors
    ///
    /// - [`TaxError::Input`] if a currency field is negative.
    /// - [`TaxError::Configuration`] if no regime covers the reference date.
    pub fn compute(
        &self,
        input: &TaxInput,
    ) -> Result<TaxResult, TaxError> {
        input.validate()?;
        let regime = self.table.resolve(input.reference_date, IncomeType::Salary)?;
        Ok(compute_with_regime(regime, input))
    }
}

/// Forward calculation against an already-resolved regime.
///
/// `input` must have passed [`TaxInput::validate`].
pub(crate) fn compute_with_regime(
    regime: &RegimeConstants,
    input: &TaxInput,
) -> TaxResult {
    let gross = input.gross_income;
    if gross <= Decimal::ZERO {
        return TaxResult::zero(regime.id, input.period, input.residency);
    }

    let months = input.period.months();

    let insurance = if input.has_insurance {
        InsuranceCalculator::new(regime).compute(
            input.insurance_base(),
            input.insurance_options,
            input.region,
            months,
        )
    } else {
        InsuranceBreakdown::none()
    };

    let (deductions, taxable_income, tax_breakdown) = match input.residency {
        Residency::Resident => {
            let deductions = DeductionResolver::new(regime).resolve(input);
            let taxable_income = taxable_income(gross, &insurance, &deductions);
            let breakdown = progressive_breakdown(&regime.brackets, taxable_income, months);
            (deductions, taxable_income, breakdown)
        }
        Residency::NonResident => {
            let breakdown = vec![BracketContribution {
                bracket: 1,
                lower_bound: Decimal::ZERO,
                upper_bound: None,
                rate: regime.non_resident_rate,
                taxable_amount: gross,
                tax_amount: round_currency(gross * regime.non_resident_rate),
            }];
            (Deductions::default(), gross, breakdown)
        }
    };

    let tax_amount: Decimal = tax_breakdown.iter().map(|c| c.tax_amount).sum();
    let insurance_deduction = insurance.total();
    let net_income = gross - insurance_deduction - tax_amount;
    let effective_rate = (tax_amount / gross).round_dp(EFFECTIVE_RATE_DP);

    debug!(
        regime = %regime.id,
        gross = %gross,
        taxable_income = %taxable_income,
        tax = %tax_amount,
        net = %net_income,
        "computed salary tax"
    );

    TaxResult {
        regime: regime.id,
        period: input.period,
        residency: input.residency,
        gross_income: gross,
        insurance_deduction,
        insurance_detail: insurance.employee,
        employer_contributions: insurance.employer,
        personal_deduction: deductions.personal,
        dependent_deduction: deductions.dependent,
        other_deductions: deductions.other,
        taxable_income,
        tax_amount,
        tax_breakdown,
        net_income,
        effective_rate,
        employer_cost: gross + insurance.employer.total(),
    }
}

fn taxable_income(
    gross: Decimal,
    insurance: &InsuranceBreakdown,
    deductions: &Deductions,
) -> Decimal {
    let remaining = gross - insurance.total() - deductions.total();
    if remaining < Decimal::ZERO {
        debug!(
            gross = %gross,
            insurance = %insurance.total(),
            deductions = %deductions.total(),
            "deductions exceed income; taxable income clamped to zero"
        );
    }
    floor_at_zero(remaining)
}

/// Applies `brackets` (bounds scaled by `months`) to `taxable_income`.
///
/// Each band's tax is rounded on its own so the breakdown always sums to the
/// total.
fn progressive_breakdown(
    brackets: &[TaxBracket],
    taxable_income: Decimal,
    months: Decimal,
) -> Vec<BracketContribution> {
    if brackets.is_empty() {
        warn!("bracket schedule is empty; no progressive tax computed");
    }

    brackets
        .iter()
        .enumerate()
        .filter_map(|(index, bracket)| {
            let taxable_amount = bracket.taxable_portion(taxable_income, months);
            if taxable_amount <= Decimal::ZERO {
                return None;
            }
            Some(BracketContribution {
                bracket: index + 1,
                lower_bound: bracket.lower_bound * months,
                upper_bound: bracket.upper_bound.map(|upper| upper * months),
                rate: bracket.rate,
                taxable_amount,
                tax_amount: round_currency(taxable_amount * bracket.rate),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::error::{ConfigurationError, InputError};
    use crate::models::{
        InsuranceOptions, MAX_AMOUNT, OtherDeductions, RegimeId, Region, TaxPeriod,
    };

    fn new_regime_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn old_regime_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn calculator() -> TaxCalculator<'static> {
        TaxCalculator::new(RegimeTable::builtin())
    }

    /// Captures WARN and above in test output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // worked scenarios
    // =========================================================================

    #[test]
    fn compute_twenty_million_new_regime() {
        let input = TaxInput::new(dec!(20000000), new_regime_date());

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.regime, RegimeId::From2026);
        assert_eq!(result.insurance_deduction, dec!(2100000));
        assert_eq!(result.insurance_detail.bhxh, dec!(1600000));
        assert_eq!(result.insurance_detail.bhyt, dec!(300000));
        assert_eq!(result.insurance_detail.bhtn, dec!(200000));
        assert_eq!(result.personal_deduction, dec!(15500000));
        assert_eq!(result.dependent_deduction, dec!(0));
        assert_eq!(result.taxable_income, dec!(2400000));
        assert_eq!(
            result.tax_breakdown,
            vec![BracketContribution {
                bracket: 1,
                lower_bound: dec!(0),
                upper_bound: Some(dec!(10000000)),
                rate: dec!(0.05),
                taxable_amount: dec!(2400000),
                tax_amount: dec!(120000),
            }]
        );
        assert_eq!(result.tax_amount, dec!(120000));
        assert_eq!(result.net_income, dec!(17780000));
        assert_eq!(result.effective_rate, dec!(0.006));
    }

    #[test]
    fn compute_twenty_million_old_regime() {
        let input = TaxInput::new(dec!(20000000), old_regime_date());

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.regime, RegimeId::Pre2026);
        // 20,000,000 − 2,100,000 − 11,000,000
        assert_eq!(result.taxable_income, dec!(6900000));
        // 5,000,000 × 5% + 1,900,000 × 10%
        assert_eq!(result.tax_breakdown.len(), 2);
        assert_eq!(result.tax_breakdown[0].tax_amount, dec!(250000));
        assert_eq!(result.tax_breakdown[1].tax_amount, dec!(190000));
        assert_eq!(result.tax_amount, dec!(440000));
        assert_eq!(result.net_income, dec!(17460000));
    }

    #[test]
    fn compute_high_income_with_dependents_crosses_four_brackets() {
        let input = TaxInput::new(dec!(100000000), new_regime_date()).with_dependents(2);

        let result = calculator().compute(&input).unwrap();

        // 3,744,000 + 702,000 + 1,000,000
        assert_eq!(result.insurance_deduction, dec!(5446000));
        assert_eq!(result.dependent_deduction, dec!(12400000));
        assert_eq!(result.taxable_income, dec!(66654000));
        let taxes: Vec<Decimal> = result.tax_breakdown.iter().map(|c| c.tax_amount).collect();
        assert_eq!(
            taxes,
            vec![dec!(500000), dec!(2000000), dec!(6000000), dec!(1996200)]
        );
        assert_eq!(result.tax_amount, dec!(10496200));
        assert_eq!(result.net_income, dec!(84057800));
    }

    #[test]
    fn compute_reports_employer_cost() {
        let input = TaxInput::new(dec!(20000000), new_regime_date());

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.employer_contributions.total(), dec!(4300000));
        assert_eq!(result.employer_cost, dec!(24300000));
    }

    #[test]
    fn compute_without_insurance_deducts_nothing_for_insurance() {
        let input = TaxInput::new(dec!(20000000), new_regime_date()).without_insurance();

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.insurance_deduction, dec!(0));
        assert_eq!(result.taxable_income, dec!(4500000));
        assert_eq!(result.tax_amount, dec!(225000));
        assert_eq!(result.net_income, dec!(19775000));
    }

    #[test]
    fn compute_uses_declared_insurance_salary() {
        let input = TaxInput::new(dec!(30000000), new_regime_date())
            .with_insurance_salary(dec!(10000000));

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.insurance_deduction, dec!(1050000));
    }

    #[test]
    fn compute_honours_partial_insurance_options() {
        let options = InsuranceOptions {
            bhxh: true,
            bhyt: true,
            bhtn: false,
        };
        let input =
            TaxInput::new(dec!(20000000), new_regime_date()).with_insurance_options(options);

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.insurance_detail.bhtn, dec!(0));
        assert_eq!(result.insurance_deduction, dec!(1900000));
    }

    #[test]
    fn compute_region_changes_only_unemployment_ceiling() {
        let base = TaxInput::new(dec!(90000000), new_regime_date());

        let region_one = calculator().compute(&base.clone()).unwrap();
        let region_four = calculator()
            .compute(&base.with_region(Region::IV))
            .unwrap();

        assert_eq!(region_one.insurance_detail.bhtn, dec!(900000));
        assert_eq!(region_four.insurance_detail.bhtn, dec!(740000));
        assert_eq!(
            region_one.insurance_detail.bhxh,
            region_four.insurance_detail.bhxh
        );
    }

    #[test]
    fn compute_annual_period_equals_twelve_months() {
        let monthly = TaxInput::new(dec!(40000000), new_regime_date()).with_dependents(1);
        let annual = monthly
            .clone()
            .with_gross(dec!(480000000))
            .with_period(TaxPeriod::Annual);

        let monthly_result = calculator().compute(&monthly).unwrap();
        let annual_result = calculator().compute(&annual).unwrap();

        assert_eq!(annual_result.tax_amount, monthly_result.tax_amount * dec!(12));
        assert_eq!(annual_result.net_income, monthly_result.net_income * dec!(12));
    }

    // =========================================================================
    // non-resident
    // =========================================================================

    #[test]
    fn compute_non_resident_taxes_whole_gross_at_flat_rate() {
        let input = TaxInput::new(dec!(20000000), new_regime_date())
            .with_dependents(2)
            .with_residency(Residency::NonResident);

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.personal_deduction, dec!(0));
        assert_eq!(result.dependent_deduction, dec!(0));
        assert_eq!(result.taxable_income, dec!(20000000));
        assert_eq!(result.tax_amount, dec!(4000000));
        assert_eq!(result.tax_breakdown.len(), 1);
        // Insurance still reduces net income
        assert_eq!(result.net_income, dec!(13900000));
    }

    // =========================================================================
    // edge cases
    // =========================================================================

    #[test]
    fn compute_zero_gross_is_all_zero() {
        let input = TaxInput::new(dec!(0), new_regime_date()).with_dependents(3);

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.tax_amount, dec!(0));
        assert_eq!(result.net_income, dec!(0));
        assert_eq!(result.insurance_deduction, dec!(0));
        assert_eq!(result.personal_deduction, dec!(0));
        assert_eq!(result.dependent_deduction, dec!(0));
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
        assert!(result.tax_breakdown.is_empty());
    }

    #[test]
    fn compute_deductions_exceeding_income_clamp_to_zero() {
        let _guard = init_test_tracing();
        let input = TaxInput::new(dec!(12000000), new_regime_date())
            .with_other_deductions(OtherDeductions::new(dec!(0), dec!(50000000)));

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax_amount, dec!(0));
        assert_eq!(result.net_income, dec!(12000000) - result.insurance_deduction);
    }

    #[test]
    fn compute_rejects_negative_gross() {
        let input = TaxInput::new(dec!(-1), new_regime_date());

        let result = calculator().compute(&input);

        assert_eq!(
            result,
            Err(TaxError::Input(InputError::NegativeAmount {
                field: "gross_income",
                value: dec!(-1),
            }))
        );
    }

    #[test]
    fn compute_rejects_gross_above_maximum() {
        let input = TaxInput::new(Decimal::MAX, new_regime_date());

        let result = calculator().compute(&input);

        assert_eq!(
            result,
            Err(TaxError::Input(InputError::AmountTooLarge {
                field: "gross_income",
                value: Decimal::MAX,
            }))
        );
    }

    #[test]
    fn compute_handles_maximum_annual_gross() {
        let input = TaxInput::new(MAX_AMOUNT, new_regime_date())
            .with_insurance_salary(MAX_AMOUNT)
            .with_period(TaxPeriod::Annual);

        let result = calculator().compute(&input).unwrap();

        assert_eq!(result.net_income, MAX_AMOUNT - result.insurance_deduction - result.tax_amount);
        assert!(result.employer_cost > MAX_AMOUNT);
    }

    #[test]
    fn compute_caps_declared_insurance_salary_at_gross() {
        let input = TaxInput::new(dec!(2000000), new_regime_date())
            .with_insurance_salary(dec!(100000000));

        let result = calculator().compute(&input).unwrap();

        // 10.5% of the 2,000,000 actually paid
        assert_eq!(result.insurance_deduction, dec!(210000));
        assert_eq!(result.net_income, dec!(1790000));
    }

    #[test]
    fn compute_rejects_date_before_every_regime() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let input = TaxInput::new(dec!(20000000), date);

        let result = calculator().compute(&input);

        assert_eq!(
            result,
            Err(TaxError::Configuration(
                ConfigurationError::NoMatchingRegime {
                    date,
                    category: IncomeType::Salary,
                }
            ))
        );
    }

    // =========================================================================
    // properties
    // =========================================================================

    #[test]
    fn breakdown_always_sums_to_total() {
        for step in 0..200 {
            let gross = Decimal::from(step) * dec!(1234567);
            for date in [new_regime_date(), old_regime_date()] {
                let input = TaxInput::new(gross, date).with_dependents(step % 3);
                let result = calculator().compute(&input).unwrap();

                let sum: Decimal = result.tax_breakdown.iter().map(|c| c.tax_amount).sum();
                assert_eq!(sum, result.tax_amount, "gross {gross}");
            }
        }
    }

    #[test]
    fn net_income_is_monotone_in_gross() {
        for date in [new_regime_date(), old_regime_date()] {
            let mut previous = Decimal::ZERO;
            for step in 0..300 {
                let gross = Decimal::from(step) * dec!(500000);
                let input = TaxInput::new(gross, date).with_dependents(1);

                let net = calculator().compute(&input).unwrap().net_income;

                assert!(net >= previous, "net fell at gross {gross}");
                previous = net;
            }
        }
    }

    #[test]
    fn taxable_income_is_never_negative() {
        for step in 0..50 {
            let gross = Decimal::from(step) * dec!(1000000);
            let input = TaxInput::new(gross, new_regime_date())
                .with_dependents(4)
                .with_other_deductions(OtherDeductions::new(dec!(1000000), gross));

            let result = calculator().compute(&input).unwrap();

            assert!(result.taxable_income >= Decimal::ZERO);
        }
    }

    #[test]
    fn compute_is_deterministic_for_same_input() {
        let input = TaxInput::new(dec!(57300000), new_regime_date()).with_dependents(1);

        let first = calculator().compute(&input).unwrap();
        let second = calculator().compute(&input).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn progressive_breakdown_handles_empty_schedule() {
        let _guard = init_test_tracing();

        let breakdown = progressive_breakdown(&[], dec!(1000000), Decimal::ONE);

        assert!(breakdown.is_empty());
    }
}
