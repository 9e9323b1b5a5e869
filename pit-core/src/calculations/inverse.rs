//! Net-to-gross solver.
//!
//! Capped insurance and tiered deductions leave no closed-form inverse, so
//! the solver bisects over whole-dong gross amounts. Net income is
//! non-decreasing in gross, which keeps the search well defined.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::forward::{TaxCalculator, compute_with_regime};
use crate::error::TaxError;
use crate::models::{IncomeType, RegimeConstants, TaxInput, check_amount};

/// Initial search ceiling as a multiple of the target net.
const INITIAL_BOUND_FACTOR: u32 = 50;
/// Times the ceiling may double when the target is still out of reach.
const MAX_EXPANSIONS: u32 = 16;

/// Outcome of a net-to-gross search.
///
/// On failure the same shape is returned inside
/// [`TaxError::NotConverged`] with `converged == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossSolution {
    pub gross: Decimal,
    /// Net income the forward calculation yields for `gross`.
    pub net_income: Decimal,
    pub iterations: u32,
    pub converged: bool,
}

/// Stopping rules for the bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Largest accepted `|net(gross) − target|`.
    pub tolerance: Decimal,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::ONE,
            max_iterations: 60,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GrossSolver<'a> {
    calculator: TaxCalculator<'a>,
    config: SolverConfig,
}

impl<'a> GrossSolver<'a> {
    pub fn new(calculator: TaxCalculator<'a>) -> Self {
        Self {
            calculator,
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(
        mut self,
        config: SolverConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Finds the gross income whose net income is within tolerance of
    /// `target_net`. Every other field of `base_input` is held fixed; its
    /// `gross_income` is ignored.
    ///
    /// # Errors
    ///
    /// - [`TaxError::Input`] if `target_net` or a field of `base_input` is
    ///   negative or above [`MAX_AMOUNT`](crate::models::MAX_AMOUNT).
    /// - [`TaxError::Configuration`] if no regime covers the reference date.
    /// - [`TaxError::NotConverged`] carrying the closest gross found when
    ///   the iteration budget runs out.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    /// use pit_core::calculations::GrossSolver;
    /// use pit_core::{RegimeTable, TaxCalculator, TaxInput};
    ///
    /// let solver = GrossSolver::new(TaxCalculator::new(RegimeTable::builtin()));
    /// let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    ///
    /// let solution = solver
    ///     .solve_for_gross(dec!(17780000), &TaxInput::new(dec!(0), date))
    ///     .unwrap();
    ///
    /// assert!(solution.converged);
    /// assert!((solution.net_income - dec!(17780000)).abs() <= dec!(1));
    /// ```
    pub fn solve_for_gross(
        &self,
        target_net: Decimal,
        base_input: &TaxInput,
    ) -> Result<GrossSolution, TaxError> {
        check_amount("target_net", target_net)?;
        let base_input = base_input.clone().with_gross(Decimal::ZERO);
        base_input.validate()?;

        let regime = self
            .calculator
            .table()
            .resolve(base_input.reference_date, IncomeType::Salary)?;

        if target_net == Decimal::ZERO {
            return Ok(GrossSolution {
                gross: Decimal::ZERO,
                net_income: Decimal::ZERO,
                iterations: 0,
                converged: true,
            });
        }

        Search {
            regime,
            base_input: &base_input,
            target: target_net,
            config: self.config,
        }
        .run()
    }
}

impl<'a> TaxCalculator<'a> {
    /// Net-to-gross with the default [`SolverConfig`].
    ///
    /// See [`GrossSolver::solve_for_gross`].
    pub fn solve_for_gross(
        &self,
        target_net: Decimal,
        base_input: &TaxInput,
    ) -> Result<GrossSolution, TaxError> {
        GrossSolver::new(*self).solve_for_gross(target_net, base_input)
    }
}

/// State of one bisection.
struct Search<'r> {
    regime: &'r RegimeConstants,
    base_input: &'r TaxInput,
    target: Decimal,
    config: SolverConfig,
}

impl Search<'_> {
    fn net_of(
        &self,
        gross: Decimal,
    ) -> Decimal {
        let input = self.base_input.clone().with_gross(gross);
        compute_with_regime(self.regime, &input).net_income
    }

    fn within_tolerance(
        &self,
        net: Decimal,
    ) -> bool {
        (net - self.target).abs() <= self.config.tolerance
    }

    fn run(&self) -> Result<GrossSolution, TaxError> {
        let mut lo = Decimal::ZERO;
        let mut hi = (self.target * Decimal::from(INITIAL_BOUND_FACTOR)).ceil();

        let mut expansions = 0;
        let mut net_hi = self.net_of(hi);
        while net_hi < self.target {
            if expansions == MAX_EXPANSIONS {
                return Err(self.not_converged(hi, net_hi, 0));
            }
            lo = hi;
            hi *= Decimal::TWO;
            net_hi = self.net_of(hi);
            expansions += 1;
        }

        let mut best = (hi, net_hi);
        let mut iterations = 0;

        while iterations < self.config.max_iterations && hi - lo > Decimal::ONE {
            iterations += 1;
            let mid = ((lo + hi) / Decimal::TWO).floor();
            let net = self.net_of(mid);

            if self.within_tolerance(net) {
                debug!(
                    target = %self.target,
                    gross = %mid,
                    iterations,
                    "net-to-gross converged"
                );
                return Ok(GrossSolution {
                    gross: mid,
                    net_income: net,
                    iterations,
                    converged: true,
                });
            }

            if (net - self.target).abs() < (best.1 - self.target).abs() {
                best = (mid, net);
            }

            if net < self.target {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        // The bracket has collapsed to adjacent amounts; `hi` is the
        // smallest gross reaching the target.
        let net_hi = self.net_of(hi);
        if self.within_tolerance(net_hi) {
            return Ok(GrossSolution {
                gross: hi,
                net_income: net_hi,
                iterations,
                converged: true,
            });
        }

        Err(self.not_converged(best.0, best.1, iterations))
    }

    fn not_converged(
        &self,
        gross: Decimal,
        net_income: Decimal,
        iterations: u32,
    ) -> TaxError {
        warn!(
            target = %self.target,
            best_gross = %gross,
            best_net = %net_income,
            iterations,
            "net-to-gross search did not converge"
        );
        TaxError::NotConverged(GrossSolution {
            gross,
            net_income,
            iterations,
            converged: false,
        })
    }
}
