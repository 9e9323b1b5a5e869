use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Largest accepted currency amount, in dong.
///
/// Annualised and summed amounts, and the widened net-to-gross bound, stay
/// well inside [`Decimal`] range below this.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

/// Rejects amounts below zero or above [`MAX_AMOUNT`].
pub(crate) fn check_amount(
    field: &'static str,
    value: Decimal,
) -> Result<(), InputError> {
    if value < Decimal::ZERO {
        return Err(InputError::NegativeAmount { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(InputError::AmountTooLarge { field, value });
    }
    Ok(())
}

/// Minimum-wage region. Drives the unemployment-insurance ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    I,
    II,
    III,
    IV,
}

impl Region {
    /// 1-based region number.
    pub fn number(&self) -> u8 {
        match self {
            Self::I => 1,
            Self::II => 2,
            Self::III => 3,
            Self::IV => 4,
        }
    }

    pub(crate) fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl TryFrom<u8> for Region {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::I),
            2 => Ok(Self::II),
            3 => Ok(Self::III),
            4 => Ok(Self::IV),
            other => Err(InputError::InvalidRegion(other)),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Which mandatory insurance funds the employee pays into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceOptions {
    pub bhxh: bool,
    pub bhyt: bool,
    pub bhtn: bool,
}

impl InsuranceOptions {
    pub fn all() -> Self {
        Self {
            bhxh: true,
            bhyt: true,
            bhtn: true,
        }
    }

    pub fn none() -> Self {
        Self {
            bhxh: false,
            bhyt: false,
            bhtn: false,
        }
    }
}

impl Default for InsuranceOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Deductions the caller supplies on top of the statutory ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDeductions {
    /// Voluntary pension contributions. Capped per regime.
    pub voluntary_pension: Decimal,
    /// Charitable and humanitarian contributions. Uncapped.
    pub charity: Decimal,
}

impl OtherDeductions {
    pub fn new(
        voluntary_pension: Decimal,
        charity: Decimal,
    ) -> Self {
        Self {
            voluntary_pension,
            charity,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        check_amount("voluntary_pension", self.voluntary_pension)?;
        check_amount("charity", self.charity)
    }
}

/// Tax residency of the individual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Residency {
    #[default]
    Resident,
    NonResident,
}

impl Residency {
    pub const RESIDENCY_DAYS: u32 = 183;

    /// Resident when present for at least 183 days in the period or when
    /// holding a permanent place of residence.
    ///
    /// ```
    /// use pit_core::Residency;
    ///
    /// assert_eq!(Residency::classify(183, false), Residency::Resident);
    /// assert_eq!(Residency::classify(90, false), Residency::NonResident);
    /// assert_eq!(Residency::classify(90, true), Residency::Resident);
    /// ```
    pub fn classify(
        days_present: u32,
        has_permanent_residence: bool,
    ) -> Self {
        if days_present >= Self::RESIDENCY_DAYS || has_permanent_residence {
            Self::Resident
        } else {
            Self::NonResident
        }
    }
}

/// Length of the period a [`TaxInput`] covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxPeriod {
    #[default]
    Monthly,
    /// Annual finalisation: deductions, caps, ceilings and bracket bounds are
    /// scaled by twelve.
    Annual,
}

impl TaxPeriod {
    pub fn months(&self) -> Decimal {
        match self {
            Self::Monthly => Decimal::ONE,
            Self::Annual => Decimal::from(12),
        }
    }
}

/// Salary-calculation request.
///
/// Built fresh per calculation with [`TaxInput::new`] and the `with_*`
/// methods; every builder call returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInput {
    pub gross_income: Decimal,
    pub dependents: u32,
    pub has_insurance: bool,
    pub insurance_options: InsuranceOptions,
    /// Salary registered for insurance when it differs from gross.
    pub insurance_salary: Option<Decimal>,
    pub region: Region,
    pub other_deductions: OtherDeductions,
    pub reference_date: NaiveDate,
    pub residency: Residency,
    pub period: TaxPeriod,
}

impl TaxInput {
    /// Monthly resident input with all insurance funds enabled in region I.
    pub fn new(
        gross_income: Decimal,
        reference_date: NaiveDate,
    ) -> Self {
        Self {
            gross_income,
            dependents: 0,
            has_insurance: true,
            insurance_options: InsuranceOptions::all(),
            insurance_salary: None,
            region: Region::I,
            other_deductions: OtherDeductions::default(),
            reference_date,
            residency: Residency::Resident,
            period: TaxPeriod::Monthly,
        }
    }

    pub fn with_gross(
        mut self,
        gross_income: Decimal,
    ) -> Self {
        self.gross_income = gross_income;
        self
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

    pub fn with_insurance_salary(
        mut self,
        salary: Decimal,
    ) -> Self {
        self.insurance_salary = Some(salary);
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

    pub fn with_period(
        mut self,
        period: TaxPeriod,
    ) -> Self {
        self.period = period;
        self
    }

    /// Salary base insurance contributions are computed on, before ceilings.
    ///
    /// A declared insurance salary replaces gross but never exceeds it, so
    /// contributions cannot push net income below zero.
    pub fn insurance_base(&self) -> Decimal {
        self.insurance_salary
            .map_or(self.gross_income, |declared| declared.min(self.gross_income))
    }

    pub fn validate(&self) -> Result<(), InputError> {
        check_amount("gross_income", self.gross_income)?;
        if let Some(salary) = self.insurance_salary {
            check_amount("insurance_salary", salary)?;
        }
        self.other_deductions.validate()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn region_accepts_one_through_four() {
        assert_eq!(Region::try_from(1), Ok(Region::I));
        assert_eq!(Region::try_from(4), Ok(Region::IV));
    }

    #[test]
    fn region_rejects_out_of_range() {
        assert_eq!(Region::try_from(0), Err(InputError::InvalidRegion(0)));
        assert_eq!(Region::try_from(5), Err(InputError::InvalidRegion(5)));
    }

    #[test]
    fn classify_uses_day_threshold() {
        assert_eq!(Residency::classify(182, false), Residency::NonResident);
        assert_eq!(Residency::classify(183, false), Residency::Resident);
    }

    #[test]
    fn validate_rejects_negative_gross() {
        let input = TaxInput::new(dec!(-1), date());

        assert_eq!(
            input.validate(),
            Err(InputError::NegativeAmount {
                field: "gross_income",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_charity() {
        let input = TaxInput::new(dec!(1000), date())
            .with_other_deductions(OtherDeductions::new(dec!(0), dec!(-5)));

        assert_eq!(
            input.validate(),
            Err(InputError::NegativeAmount {
                field: "charity",
                value: dec!(-5),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_insurance_salary() {
        let input = TaxInput::new(dec!(1000), date()).with_insurance_salary(dec!(-10));

        assert!(input.validate().is_err());
    }

    #[test]
    fn validate_rejects_amount_above_maximum() {
        let input = TaxInput::new(Decimal::MAX, date());

        assert_eq!(
            input.validate(),
            Err(InputError::AmountTooLarge {
                field: "gross_income",
                value: Decimal::MAX,
            })
        );
    }

    #[test]
    fn validate_accepts_maximum_amount() {
        let input = TaxInput::new(MAX_AMOUNT, date()).with_insurance_salary(MAX_AMOUNT);

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_oversized_pension() {
        let input = TaxInput::new(dec!(1000), date())
            .with_other_deductions(OtherDeductions::new(MAX_AMOUNT + dec!(1), dec!(0)));

        assert!(matches!(
            input.validate(),
            Err(InputError::AmountTooLarge {
                field: "voluntary_pension",
                ..
            })
        ));
    }

    #[test]
    fn max_amount_is_one_quintillion_dong() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000000000));
    }

    #[test]
    fn insurance_base_never_exceeds_gross() {
        let input = TaxInput::new(dec!(5000000), date()).with_insurance_salary(dec!(100000000));

        assert_eq!(input.insurance_base(), dec!(5000000));
    }

    #[test]
    fn insurance_base_prefers_declared_salary() {
        let input = TaxInput::new(dec!(30000000), date()).with_insurance_salary(dec!(10000000));

        assert_eq!(input.insurance_base(), dec!(10000000));
    }

    #[test]
    fn builders_do_not_alias() {
        let base = TaxInput::new(dec!(1000), date());
        let changed = base.clone().without_insurance().with_dependents(2);

        assert!(base.has_insurance);
        assert_eq!(base.dependents, 0);
        assert!(!changed.has_insurance);
        assert_eq!(changed.dependents, 2);
    }
}
