use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::income_source::{BusinessSector, IncomeSource, IncomeType, SourceFlags};

/// Flat rates on household-business revenue, by sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRates {
    pub distribution: Decimal,
    pub services: Decimal,
    pub production_transport: Decimal,
    pub other: Decimal,
}

impl BusinessRates {
    pub fn rate(
        &self,
        sector: BusinessSector,
    ) -> Decimal {
        match sector {
            BusinessSector::Distribution => self.distribution,
            BusinessSector::Services => self.services,
            BusinessSector::ProductionTransport => self.production_transport,
            BusinessSector::Other => self.other,
        }
    }
}

/// Amount below which a flat-rate category is not taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Threshold {
    None,
    /// Subtracted from every payment; tax applies to the excess.
    PerPaymentAllowance(Decimal),
    /// Annual revenue of the whole category at or below this owes nothing.
    /// Above it, the rate applies to the full amount.
    AnnualRevenueFloor(Decimal),
}

/// A relationship or instrument that zeroes tax on an otherwise taxable
/// source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exemption {
    FamilyRelationship,
    GovernmentBond,
}

impl Exemption {
    pub fn applies(
        &self,
        flags: &SourceFlags,
    ) -> bool {
        match self {
            Self::FamilyRelationship => flags.is_from_family,
            Self::GovernmentBond => flags.is_gov_bond,
        }
    }
}

impl fmt::Display for Exemption {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::FamilyRelationship => f.write_str("family relationship"),
            Self::GovernmentBond => f.write_str("government bond"),
        }
    }
}

/// How one income source is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Treatment {
    /// Summed with every other progressive source and run through the
    /// bracket schedule once.
    Progressive,
    FlatRate {
        rate: Decimal,
        threshold: Threshold,
        exemption: Option<Exemption>,
    },
    Exempt,
}

impl Treatment {
    pub fn kind(&self) -> TreatmentKind {
        match self {
            Self::Progressive => TreatmentKind::Progressive,
            Self::FlatRate { .. } => TreatmentKind::FlatRate,
            Self::Exempt => TreatmentKind::Exempt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentKind {
    Progressive,
    FlatRate,
    Exempt,
}

impl fmt::Display for TreatmentKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Progressive => f.write_str("progressive"),
            Self::FlatRate => f.write_str("flat-rate"),
            Self::Exempt => f.write_str("exempt"),
        }
    }
}

/// Per-category flat rates and thresholds of one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRateSchedule {
    pub business: BusinessRates,
    pub rental_rate: Decimal,
    /// Annual revenue floor shared by business and rental income.
    pub revenue_floor: Decimal,
    pub capital_investment_rate: Decimal,
    pub securities_transfer_rate: Decimal,
    pub real_estate_transfer_rate: Decimal,
    pub lottery_rate: Decimal,
    pub royalty_rate: Decimal,
    pub inheritance_gift_rate: Decimal,
    /// Per-payment allowance for lottery, royalty and inheritance/gift income.
    pub per_payment_allowance: Decimal,
    pub digital_asset_rate: Decimal,
}

impl FlatRateSchedule {
    /// Dispatch table from income category to treatment.
    pub fn treatment(
        &self,
        source: &IncomeSource,
    ) -> Treatment {
        let flat = |rate, threshold, exemption| Treatment::FlatRate {
            rate,
            threshold,
            exemption,
        };
        let floor = Threshold::AnnualRevenueFloor(self.revenue_floor);
        let allowance = Threshold::PerPaymentAllowance(self.per_payment_allowance);

        match source.income_type {
            IncomeType::Salary => Treatment::Progressive,
            IncomeType::Business => flat(
                self.business.rate(source.flags.business_sector),
                floor,
                None,
            ),
            IncomeType::Rental => flat(self.rental_rate, floor, None),
            IncomeType::CapitalInvestment => flat(
                self.capital_investment_rate,
                Threshold::None,
                Some(Exemption::GovernmentBond),
            ),
            IncomeType::SecuritiesTransfer => {
                flat(self.securities_transfer_rate, Threshold::None, None)
            }
            IncomeType::RealEstateTransfer => flat(
                self.real_estate_transfer_rate,
                Threshold::None,
                Some(Exemption::FamilyRelationship),
            ),
            IncomeType::Lottery => flat(self.lottery_rate, allowance, None),
            IncomeType::Royalty => flat(self.royalty_rate, allowance, None),
            IncomeType::InheritanceGift => flat(
                self.inheritance_gift_rate,
                allowance,
                Some(Exemption::FamilyRelationship),
            ),
            IncomeType::DigitalAsset => flat(self.digital_asset_rate, Threshold::None, None),
            IncomeType::Exempt => Treatment::Exempt,
        }
    }
}
