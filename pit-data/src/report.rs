//! Plain-text reports for CLI output.

use std::fmt;

use chrono::NaiveDate;
use pit_core::{
    AggregateSummary, GrossSolution, IncomeType, RegimeConstants, Residency, TaxPeriod, TaxResult,
};
use rust_decimal::Decimal;

use crate::amount::{format_amount, format_rate};

/// Label column width.
const LABEL: usize = 26;
/// Amount column width.
const AMOUNT: usize = 16;

fn period_label(period: TaxPeriod) -> &'static str {
    match period {
        TaxPeriod::Monthly => "monthly",
        TaxPeriod::Annual => "annual",
    }
}

fn residency_label(residency: Residency) -> &'static str {
    match residency {
        Residency::Resident => "resident",
        Residency::NonResident => "non-resident",
    }
}

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    amount: Decimal,
) -> fmt::Result {
    writeln!(f, "  {label:<LABEL$}{:>AMOUNT$}", format_amount(amount))
}

/// Gross-to-net result.
pub struct SalaryReport<'a>(pub &'a TaxResult);

impl fmt::Display for SalaryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.0;
        writeln!(
            f,
            "Salary tax ({}, {}, regime {})",
            period_label(r.period),
            residency_label(r.residency),
            r.regime
        )?;
        line(f, "Gross income", r.gross_income)?;
        line(f, "Social insurance (BHXH)", r.insurance_detail.bhxh)?;
        line(f, "Health insurance (BHYT)", r.insurance_detail.bhyt)?;
        line(f, "Unemployment (BHTN)", r.insurance_detail.bhtn)?;
        line(f, "Personal deduction", r.personal_deduction)?;
        line(f, "Dependent deduction", r.dependent_deduction)?;
        line(f, "Other deductions", r.other_deductions)?;
        line(f, "Taxable income", r.taxable_income)?;

        for c in &r.tax_breakdown {
            let label = format!("  Bracket {} @ {}", c.bracket, format_rate(c.rate));
            writeln!(
                f,
                "  {label:<LABEL$}{:>AMOUNT$}  on {}",
                format_amount(c.tax_amount),
                format_amount(c.taxable_amount)
            )?;
        }

        line(f, "Personal income tax", r.tax_amount)?;
        line(f, "Net income", r.net_income)?;
        writeln!(
            f,
            "  {:<LABEL$}{:>AMOUNT$}",
            "Effective rate",
            format_rate(r.effective_rate)
        )?;
        line(f, "Employer cost", r.employer_cost)
    }
}

/// Net-to-gross result with the forward calculation for the found gross.
pub struct SolutionReport<'a> {
    pub target_net: Decimal,
    pub solution: &'a GrossSolution,
    pub result: &'a TaxResult,
}

impl fmt::Display for SolutionReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Net {} requires gross {} ({} iterations)",
            format_amount(self.target_net),
            format_amount(self.solution.gross),
            self.solution.iterations
        )?;
        writeln!(f)?;
        write!(f, "{}", SalaryReport(self.result))
    }
}

/// Multi-source annual summary.
pub struct AggregateReport<'a>(pub &'a AggregateSummary);

impl fmt::Display for AggregateReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = self.0;

        writeln!(f, "Sources")?;
        for o in &s.sources {
            let tax = match (o.tax, o.exemption) {
                (_, Some(exemption)) => format!("exempt ({exemption})"),
                (Some(tax), None) => format_amount(tax),
                (None, None) => "progressive".to_string(),
            };
            writeln!(
                f,
                "  {:<14}{:<22}{:>AMOUNT$}  {tax}",
                o.id,
                o.category.as_str(),
                format_amount(o.annual_amount)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Categories")?;
        for c in &s.categories {
            writeln!(
                f,
                "  {:<22}{:<13}{:<10}{:>AMOUNT$}{:>AMOUNT$}",
                c.category.as_str(),
                c.treatment.to_string(),
                c.regime.as_str(),
                format_amount(c.gross),
                format_amount(c.tax)
            )?;
        }

        writeln!(f)?;
        line(f, "Total gross", s.total_gross)?;
        line(f, "Total tax", s.total_tax)?;
        line(f, "Total net", s.total_net)
    }
}

/// Constants of one regime as they apply to one category on one date.
pub struct RegimeReport<'a> {
    pub regime: &'a RegimeConstants,
    pub category: IncomeType,
    pub date: NaiveDate,
}

impl fmt::Display for RegimeReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.regime;
        let window = r.window_for(self.category);
        let until = window
            .until
            .map(|d| d.to_string())
            .unwrap_or_else(|| "open".to_string());

        writeln!(
            f,
            "Regime {} applies to {} on {} (window {} to {})",
            r.id, self.category, self.date, window.from, until
        )?;

        writeln!(f, "Monthly brackets")?;
        for b in &r.brackets {
            let upper = b
                .upper_bound
                .map(format_amount)
                .unwrap_or_else(|| "and above".to_string());
            writeln!(
                f,
                "  {:>AMOUNT$} - {:<AMOUNT$}{:>6}",
                format_amount(b.lower_bound),
                upper,
                format_rate(b.rate)
            )?;
        }

        line(f, "Personal deduction", r.personal_deduction)?;
        line(f, "Dependent deduction", r.dependent_deduction)?;
        line(f, "Voluntary pension cap", r.voluntary_pension_cap)?;
        line(f, "Revenue floor (annual)", r.flat_rates.revenue_floor)?;
        line(f, "Per-payment allowance", r.flat_rates.per_payment_allowance)?;
        writeln!(
            f,
            "  {:<LABEL$}{:>AMOUNT$}",
            "Non-resident rate",
            format_rate(r.non_resident_rate)
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pit_core::calculations::{IncomeAggregator, PersonContext};
    use pit_core::{Frequency, IncomeSource, RegimeTable, TaxCalculator, TaxInput};
    use rust_decimal_macros::dec;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    #[test]
    fn salary_report_lists_brackets_and_totals() {
        let result = TaxCalculator::new(RegimeTable::builtin())
            .compute(&TaxInput::new(dec!(20000000), date()))
            .unwrap();

        let text = SalaryReport(&result).to_string();

        assert!(text.contains("regime 2026"));
        assert!(text.contains("Bracket 1 @ 5%"));
        assert!(text.contains("17,780,000"));
    }

    #[test]
    fn aggregate_report_marks_exempt_and_progressive_sources() {
        let sources = [
            IncomeSource::new("job", IncomeType::Salary, dec!(20000000), Frequency::Monthly),
            IncomeSource::new(
                "house",
                IncomeType::InheritanceGift,
                dec!(900000000),
                Frequency::OneTime,
            )
            .from_family(),
        ];
        let summary = IncomeAggregator::new(RegimeTable::builtin())
            .aggregate(&sources, &PersonContext::new(date()))
            .unwrap();

        let text = AggregateReport(&summary).to_string();

        assert!(text.contains("exempt (family relationship)"));
        assert!(text.contains("progressive"));
        assert!(text.contains("1,440,000"));
    }

    #[test]
    fn regime_report_shows_open_top_bracket() {
        let table = RegimeTable::builtin();
        let regime = table.resolve(date(), IncomeType::Salary).unwrap();

        let text = RegimeReport {
            regime,
            category: IncomeType::Salary,
            date: date(),
        }
        .to_string();

        assert!(text.contains("window 2026-01-01 to open"));
        assert!(text.contains("and above"));
        assert!(text.contains("15,500,000"));
    }
}
