//! Bundled Vietnamese regime data.
//!
//! Figures are monthly and in dong. This file is source data subject to
//! legal-update review: change it together with its tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    BusinessRates, CategoryWindow, ContributionSet, EffectiveWindow, FlatRateSchedule,
    IncomeType, InsuranceSchedule, RegimeConstants, RegimeId, TaxBracket,
};

/// Start of the 2020 family-deduction amounts.
pub const PRE_2026_FROM: NaiveDate = ymd(2020, 7, 1);
/// Calendar-year cutover for salary, business and rental income.
pub const CALENDAR_CUTOVER: NaiveDate = ymd(2026, 1, 1);
/// General effective date of the 2026 law.
pub const GENERAL_CUTOVER: NaiveDate = ymd(2026, 7, 1);

/// Categories that switch regime at [`CALENDAR_CUTOVER`].
const CALENDAR_YEAR_CATEGORIES: [IncomeType; 3] =
    [IncomeType::Salary, IncomeType::Business, IncomeType::Rental];

const fn ymd(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid regime date"),
    }
}

/// Both bundled regimes, oldest first.
pub fn regimes() -> Vec<RegimeConstants> {
    vec![pre_2026(), from_2026()]
}

fn brackets(bands: &[(Option<Decimal>, Decimal)]) -> Vec<TaxBracket> {
    let mut lower = Decimal::ZERO;
    bands
        .iter()
        .map(|&(upper, rate)| {
            let bracket = TaxBracket::new(lower, upper, rate);
            lower = upper.unwrap_or(lower);
            bracket
        })
        .collect()
}

fn category_windows(window: EffectiveWindow) -> Vec<CategoryWindow> {
    CALENDAR_YEAR_CATEGORIES
        .into_iter()
        .map(|category| CategoryWindow { category, window })
        .collect()
}

fn insurance(regional_minimum_wages: [Decimal; 4]) -> InsuranceSchedule {
    InsuranceSchedule {
        base_salary: dec!(2340000),
        ceiling_multiplier: dec!(20),
        regional_minimum_wages,
        employee_rates: ContributionSet::new(dec!(0.08), dec!(0.015), dec!(0.01)),
        employer_rates: ContributionSet::new(dec!(0.175), dec!(0.03), dec!(0.01)),
    }
}

fn flat_rates(revenue_floor: Decimal) -> FlatRateSchedule {
    FlatRateSchedule {
        business: BusinessRates {
            distribution: dec!(0.005),
            services: dec!(0.02),
            production_transport: dec!(0.015),
            other: dec!(0.01),
        },
        rental_rate: dec!(0.05),
        revenue_floor,
        capital_investment_rate: dec!(0.05),
        securities_transfer_rate: dec!(0.001),
        real_estate_transfer_rate: dec!(0.02),
        lottery_rate: dec!(0.10),
        royalty_rate: dec!(0.05),
        inheritance_gift_rate: dec!(0.10),
        per_payment_allowance: dec!(10000000),
        digital_asset_rate: dec!(0.001),
    }
}

/// Seven brackets, 11M personal and 4.4M dependent deduction.
pub fn pre_2026() -> RegimeConstants {
    RegimeConstants {
        id: RegimeId::Pre2026,
        brackets: brackets(&[
            (Some(dec!(5000000)), dec!(0.05)),
            (Some(dec!(10000000)), dec!(0.10)),
            (Some(dec!(18000000)), dec!(0.15)),
            (Some(dec!(32000000)), dec!(0.20)),
            (Some(dec!(52000000)), dec!(0.25)),
            (Some(dec!(80000000)), dec!(0.30)),
            (None, dec!(0.35)),
        ]),
        personal_deduction: dec!(11000000),
        dependent_deduction: dec!(4400000),
        voluntary_pension_cap: dec!(1000000),
        non_resident_rate: dec!(0.20),
        insurance: insurance([dec!(4960000), dec!(4410000), dec!(3860000), dec!(3450000)]),
        flat_rates: flat_rates(dec!(100000000)),
        window: EffectiveWindow::new(PRE_2026_FROM, Some(GENERAL_CUTOVER)),
        category_windows: category_windows(EffectiveWindow::new(
            PRE_2026_FROM,
            Some(CALENDAR_CUTOVER),
        )),
    }
}

/// Five brackets, 15.5M personal and 6.2M dependent deduction.
pub fn from_2026() -> RegimeConstants {
    RegimeConstants {
        id: RegimeId::From2026,
        brackets: brackets(&[
            (Some(dec!(10000000)), dec!(0.05)),
            (Some(dec!(30000000)), dec!(0.10)),
            (Some(dec!(60000000)), dec!(0.20)),
            (Some(dec!(100000000)), dec!(0.30)),
            (None, dec!(0.35)),
        ]),
        personal_deduction: dec!(15500000),
        dependent_deduction: dec!(6200000),
        voluntary_pension_cap: dec!(1000000),
        non_resident_rate: dec!(0.20),
        insurance: insurance([dec!(5310000), dec!(4730000), dec!(4140000), dec!(3700000)]),
        flat_rates: flat_rates(dec!(500000000)),
        window: EffectiveWindow::new(GENERAL_CUTOVER, None),
        category_windows: category_windows(EffectiveWindow::new(CALENDAR_CUTOVER, None)),
    }
}
