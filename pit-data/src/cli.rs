//! Command-line interface for `pit-calc`.
//!
//! Argument parsing and dispatch live here so the binary stays a thin
//! wrapper around [`Cli::parse`] and [`run`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pit_core::calculations::{IncomeAggregator, PersonContext};
use pit_core::{
    GrossSolver, IncomeType, InsuranceOptions, OtherDeductions, RegimeTable, Region, Residency,
    TaxCalculator, TaxInput, TaxPeriod,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::amount::parse_amount;
use crate::loader::load_from_file;
use crate::report::{AggregateReport, RegimeReport, SalaryReport, SolutionReport};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Vietnamese personal income tax calculator.
///
/// Computes salary tax gross-to-net or net-to-gross, aggregates income from
/// several sources, and shows the regime in force on a date.
#[derive(Debug, Parser)]
#[command(name = "pit-calc", version, about, long_about = None)]
pub struct Cli {
    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Tax and net income for a gross salary.
    GrossToNet {
        /// Gross salary; `20,000,000` is accepted.
        #[arg(value_parser = parse_amount)]
        gross: Decimal,

        #[command(flatten)]
        person: PersonArgs,

        #[command(flatten)]
        salary: SalaryArgs,
    },

    /// Gross salary needed for a target net income.
    NetToGross {
        /// Target net income.
        #[arg(value_parser = parse_amount)]
        net: Decimal,

        #[command(flatten)]
        person: PersonArgs,

        #[command(flatten)]
        salary: SalaryArgs,
    },

    /// Annual tax across every source listed in a CSV file.
    Aggregate {
        /// CSV with columns id,type,amount,frequency and optional
        /// is_from_family,is_gov_bond,business_sector.
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        person: PersonArgs,
    },

    /// Regime constants in force for an income category.
    Regime {
        /// Income category, e.g. `salary` or `lottery`.
        #[arg(short, long, default_value = "salary")]
        category: String,
    },
}

/// Facts about the taxpayer shared by every calculation.
#[derive(Debug, Args)]
pub struct PersonArgs {
    /// Number of registered dependents.
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Minimum-wage region (1-4).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub region: u8,

    /// Do not pay mandatory insurance.
    #[arg(long)]
    pub no_insurance: bool,

    /// Skip unemployment insurance (BHTN) only.
    #[arg(long, conflicts_with = "no_insurance")]
    pub no_bhtn: bool,

    /// Voluntary pension contribution for the period.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub pension: Decimal,

    /// Charitable donations for the period.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub charity: Decimal,

    /// Taxpayer is a non-resident (fewer than 183 days, no permanent residence).
    #[arg(long)]
    pub non_resident: bool,
}

impl PersonArgs {
    pub fn region(&self) -> Result<Region> {
        Region::try_from(self.region).context("invalid region")
    }

    pub fn insurance_options(&self) -> InsuranceOptions {
        InsuranceOptions {
            bhtn: !self.no_bhtn,
            ..InsuranceOptions::all()
        }
    }

    pub fn other_deductions(&self) -> OtherDeductions {
        OtherDeductions::new(self.pension, self.charity)
    }

    pub fn residency(&self) -> Residency {
        if self.non_resident {
            Residency::NonResident
        } else {
            Residency::Resident
        }
    }

    pub fn context(
        &self,
        date: NaiveDate,
    ) -> Result<PersonContext> {
        let context = PersonContext::new(date)
            .with_dependents(self.dependents)
            .with_region(self.region()?)
            .with_other_deductions(self.other_deductions())
            .with_residency(self.residency());

        Ok(if self.no_insurance {
            context.without_insurance()
        } else {
            context.with_insurance_options(self.insurance_options())
        })
    }
}

/// Options that only apply to a single salary calculation.
#[derive(Debug, Args)]
pub struct SalaryArgs {
    /// Salary registered for insurance when it differs from gross.
    #[arg(long, value_parser = parse_amount)]
    pub insurance_salary: Option<Decimal>,

    /// Treat amounts as annual totals (annual finalisation).
    #[arg(long)]
    pub annual: bool,
}

impl SalaryArgs {
    /// Salary input for `gross` on `date` with the person's facts applied.
    pub fn tax_input(
        &self,
        gross: Decimal,
        date: NaiveDate,
        person: &PersonArgs,
    ) -> Result<TaxInput> {
        let mut input = TaxInput::new(gross, date)
            .with_dependents(person.dependents)
            .with_region(person.region()?)
            .with_other_deductions(person.other_deductions())
            .with_residency(person.residency());

        input = if person.no_insurance {
            input.without_insurance()
        } else {
            input.with_insurance_options(person.insurance_options())
        };
        if let Some(insurance_salary) = self.insurance_salary {
            input = input.with_insurance_salary(insurance_salary);
        }
        if self.annual {
            input = input.with_period(TaxPeriod::Annual);
        }
        Ok(input)
    }
}

// ─── dispatch ────────────────────────────────────────────────────────────────

/// Runs one command and returns the report text.
///
/// `today` is used when the command line carries no `--date`.
pub fn run(
    cli: &Cli,
    today: NaiveDate,
) -> Result<String> {
    let date = cli.date.unwrap_or(today);
    debug!(%date, "reference date");

    let table = RegimeTable::builtin();
    let calculator = TaxCalculator::new(table);

    let text = match &cli.command {
        Command::GrossToNet {
            gross,
            person,
            salary,
        } => {
            let input = salary.tax_input(*gross, date, person)?;
            let result = calculator
                .compute(&input)
                .context("gross-to-net calculation failed")?;
            SalaryReport(&result).to_string()
        }

        Command::NetToGross {
            net,
            person,
            salary,
        } => {
            let base = salary.tax_input(Decimal::ZERO, date, person)?;
            let solution = GrossSolver::new(calculator)
                .solve_for_gross(*net, &base)
                .with_context(|| format!("no gross salary found for net {net}"))?;
            let result = calculator
                .compute(&base.with_gross(solution.gross))
                .context("gross-to-net calculation failed")?;
            SolutionReport {
                target_net: *net,
                solution: &solution,
                result: &result,
            }
            .to_string()
        }

        Command::Aggregate { file, person } => {
            let sources = load_from_file(file)
                .with_context(|| format!("failed to load income sources from {}", file.display()))?;
            let context = person.context(date)?;
            let summary = IncomeAggregator::new(table)
                .aggregate(&sources, &context)
                .context("aggregation failed")?;
            AggregateReport(&summary).to_string()
        }

        Command::Regime { category } => {
            let category = IncomeType::try_from(category.as_str())?;
            let regime = table
                .resolve(date, category)
                .with_context(|| format!("no regime for {category} on {date}"))?;
            RegimeReport {
                regime,
                category,
                date,
            }
            .to_string()
        }
    };

    Ok(text)
}
