//! Regime table and regime selection.
//!
//! A [`RegimeTable`] is an immutable, validated list of
//! [`RegimeConstants`]. It is the only place in the engine that compares
//! dates: every calculation asks [`RegimeTable::resolve`] which regime covers
//! its reference date for its income category.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use pit_core::{IncomeType, RegimeId, RegimeTable};
//!
//! let table = RegimeTable::builtin();
//! let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//!
//! // Salary moved to the new schedule on 1 January...
//! assert_eq!(table.resolve(date, IncomeType::Salary).unwrap().id, RegimeId::From2026);
//! // ...while lottery winnings follow the general 1 July cutover.
//! assert_eq!(table.resolve(date, IncomeType::Lottery).unwrap().id, RegimeId::Pre2026);
//! ```

pub mod vietnam;

use std::sync::OnceLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, error};

use crate::error::ConfigurationError;
use crate::models::{IncomeType, RegimeConstants, RegimeId};

static BUILTIN: OnceLock<RegimeTable> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegimeTable {
    regimes: Vec<RegimeConstants>,
}

impl RegimeTable {
    /// Validates and wraps a set of regimes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if:
    /// - the list is empty
    /// - a bounded window does not end after it starts
    /// - a bracket schedule is not contiguous from zero to an open top band,
    ///   or its rates decrease or leave `[0, 1]`
    /// - two regimes cover the same date for the same income category
    pub fn new(regimes: Vec<RegimeConstants>) -> Result<Self, ConfigurationError> {
        validate(&regimes)?;
        Ok(Self { regimes })
    }

    /// The bundled Vietnamese regimes, built once per process.
    ///
    /// The bundled data goes through the same checks as [`RegimeTable::new`].
    /// A failure is a defect in the data itself: it is logged, and debug
    /// builds panic on it.
    pub fn builtin() -> &'static RegimeTable {
        BUILTIN.get_or_init(|| {
            let regimes = vietnam::regimes();
            let checked = validate(&regimes);
            if let Err(err) = &checked {
                error!(%err, "bundled regime table is inconsistent");
            }
            debug_assert!(checked.is_ok(), "bundled regime table is inconsistent: {checked:?}");
            Self { regimes }
        })
    }

    pub fn regimes(&self) -> &[RegimeConstants] {
        &self.regimes
    }

    pub fn get(
        &self,
        id: RegimeId,
    ) -> Option<&RegimeConstants> {
        self.regimes.iter().find(|r| r.id == id)
    }

    /// Selects the regime whose window for `category` contains `date`.
    ///
    /// A category-specific window takes precedence over the regime's general
    /// window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoMatchingRegime`] when no window covers
    /// the date. With a complete table this only happens for dates before
    /// the oldest regime.
    pub fn resolve(
        &self,
        date: NaiveDate,
        category: IncomeType,
    ) -> Result<&RegimeConstants, ConfigurationError> {
        let regime = self
            .regimes
            .iter()
            .find(|r| r.applies_to(date, category))
            .ok_or(ConfigurationError::NoMatchingRegime { date, category })?;

        debug!(%date, %category, regime = %regime.id, "resolved regime");
        Ok(regime)
    }
}

fn validate(regimes: &[RegimeConstants]) -> Result<(), ConfigurationError> {
    if regimes.is_empty() {
        return Err(ConfigurationError::EmptyRegimeTable);
    }

    for regime in regimes {
        validate_windows(regime)?;
        validate_brackets(regime)?;
    }

    for category in IncomeType::ALL {
        for (i, first) in regimes.iter().enumerate() {
            for second in &regimes[i + 1..] {
                if first
                    .window_for(category)
                    .overlaps(&second.window_for(category))
                {
                    return Err(ConfigurationError::OverlappingRegimes {
                        category,
                        first: first.id,
                        second: second.id,
                    });
                }
            }
        }
    }

    Ok(())
}

fn validate_windows(regime: &RegimeConstants) -> Result<(), ConfigurationError> {
    let all_valid = regime.window.is_valid()
        && regime
            .category_windows
            .iter()
            .all(|cw| cw.window.is_valid());

    if all_valid {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidWindow { regime: regime.id })
    }
}

fn validate_brackets(regime: &RegimeConstants) -> Result<(), ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidBrackets {
        regime: regime.id,
        reason: reason.to_string(),
    };

    let brackets = &regime.brackets;
    let (first, last) = match (brackets.first(), brackets.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(invalid("no brackets")),
    };

    if first.lower_bound != Decimal::ZERO {
        return Err(invalid("first bracket must start at zero"));
    }
    if last.upper_bound.is_some() {
        return Err(invalid("last bracket must be open-ended"));
    }
    if brackets
        .iter()
        .any(|b| b.rate < Decimal::ZERO || b.rate > Decimal::ONE)
    {
        return Err(invalid("rates must be between 0 and 1"));
    }

    for pair in brackets.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        match lower.upper_bound {
            Some(bound) if bound == upper.lower_bound && bound > lower.lower_bound => {}
            Some(_) => return Err(invalid("brackets must be contiguous and ascending")),
            None => return Err(invalid("only the last bracket may be open-ended")),
        }
        if upper.rate < lower.rate {
            return Err(invalid("rates must not decrease"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{EffectiveWindow, TaxBracket};

    fn ymd(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // =========================================================================
    // resolve tests
    // =========================================================================

    #[test]
    fn resolve_salary_before_calendar_cutover_uses_old_regime() {
        let regime = RegimeTable::builtin()
            .resolve(ymd(2025, 12, 31), IncomeType::Salary)
            .unwrap();

        assert_eq!(regime.id, RegimeId::Pre2026);
    }

    #[test]
    fn resolve_salary_on_calendar_cutover_uses_new_regime() {
        let regime = RegimeTable::builtin()
            .resolve(ymd(2026, 1, 1), IncomeType::Salary)
            .unwrap();

        assert_eq!(regime.id, RegimeId::From2026);
    }

    #[test]
    fn resolve_general_category_waits_for_mid_year_cutover() {
        let table = RegimeTable::builtin();

        assert_eq!(
            table
                .resolve(ymd(2026, 6, 30), IncomeType::InheritanceGift)
                .unwrap()
                .id,
            RegimeId::Pre2026
        );
        assert_eq!(
            table
                .resolve(ymd(2026, 7, 1), IncomeType::InheritanceGift)
                .unwrap()
                .id,
            RegimeId::From2026
        );
    }

    #[test]
    fn resolve_business_follows_calendar_cutover() {
        let regime = RegimeTable::builtin()
            .resolve(ymd(2026, 2, 1), IncomeType::Business)
            .unwrap();

        assert_eq!(regime.id, RegimeId::From2026);
    }

    #[test]
    fn resolve_before_oldest_regime_is_configuration_error() {
        let result = RegimeTable::builtin().resolve(ymd(2019, 1, 1), IncomeType::Salary);

        assert_eq!(
            result,
            Err(ConfigurationError::NoMatchingRegime {
                date: ymd(2019, 1, 1),
                category: IncomeType::Salary,
            })
        );
    }

    #[test]
    fn resolve_is_stable_for_the_same_date() {
        let table = RegimeTable::builtin();
        let date = ymd(2026, 3, 15);

        let first = table.resolve(date, IncomeType::Salary).unwrap();
        let second = table.resolve(date, IncomeType::Salary).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn injected_table_is_used_instead_of_builtin() {
        let mut future = vietnam::from_2026();
        future.window = EffectiveWindow::new(ymd(2030, 1, 1), None);
        future.category_windows.clear();
        future.personal_deduction = dec!(20000000);
        let table = RegimeTable::new(vec![future]).unwrap();

        let regime = table.resolve(ymd(2031, 1, 1), IncomeType::Salary).unwrap();

        assert_eq!(regime.personal_deduction, dec!(20000000));
        assert!(table.resolve(ymd(2029, 1, 1), IncomeType::Salary).is_err());
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn builtin_table_passes_validation() {
        assert_eq!(
            RegimeTable::new(vietnam::regimes()),
            Ok(RegimeTable::builtin().clone())
        );
    }

    #[test]
    fn new_rejects_empty_table() {
        assert_eq!(
            RegimeTable::new(Vec::new()),
            Err(ConfigurationError::EmptyRegimeTable)
        );
    }

    #[test]
    fn new_rejects_overlapping_category_windows() {
        let old = vietnam::pre_2026();
        let mut new = vietnam::from_2026();
        new.category_windows.clear();
        new.window = EffectiveWindow::new(ymd(2025, 1, 1), None);

        let result = RegimeTable::new(vec![old, new]);

        assert_eq!(
            result,
            Err(ConfigurationError::OverlappingRegimes {
                category: IncomeType::Salary,
                first: RegimeId::Pre2026,
                second: RegimeId::From2026,
            })
        );
    }

    #[test]
    fn new_rejects_inverted_window() {
        let mut regime = vietnam::from_2026();
        regime.window = EffectiveWindow::new(ymd(2026, 7, 1), Some(ymd(2026, 1, 1)));

        assert_eq!(
            RegimeTable::new(vec![regime]),
            Err(ConfigurationError::InvalidWindow {
                regime: RegimeId::From2026
            })
        );
    }

    #[test]
    fn new_rejects_gap_between_brackets() {
        let mut regime = vietnam::from_2026();
        regime.brackets[1].lower_bound = dec!(11000000);

        let result = RegimeTable::new(vec![regime]);

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidBrackets { .. })
        ));
    }

    #[test]
    fn new_rejects_decreasing_rates() {
        let mut regime = vietnam::from_2026();
        regime.brackets[2].rate = dec!(0.01);

        assert!(matches!(
            RegimeTable::new(vec![regime]),
            Err(ConfigurationError::InvalidBrackets { .. })
        ));
    }

    #[test]
    fn new_rejects_bounded_top_bracket() {
        let mut regime = vietnam::from_2026();
        regime.brackets.push(TaxBracket::new(dec!(200000000), Some(dec!(300000000)), dec!(0.40)));

        assert!(matches!(
            RegimeTable::new(vec![regime]),
            Err(ConfigurationError::InvalidBrackets { .. })
        ));
    }

    #[test]
    fn new_rejects_nonzero_first_bracket() {
        let mut regime = vietnam::from_2026();
        regime.brackets[0].lower_bound = dec!(1);

        assert!(matches!(
            RegimeTable::new(vec![regime]),
            Err(ConfigurationError::InvalidBrackets { .. })
        ));
    }
}
