use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax_input::check_amount;
use crate::error::InputError;

/// Income categories recognised by the aggregator.
///
/// Declaration order is the order used in per-category summaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    Salary,
    Business,
    Rental,
    CapitalInvestment,
    SecuritiesTransfer,
    RealEstateTransfer,
    Lottery,
    Royalty,
    InheritanceGift,
    DigitalAsset,
    Exempt,
}

impl IncomeType {
    pub const ALL: [IncomeType; 11] = [
        Self::Salary,
        Self::Business,
        Self::Rental,
        Self::CapitalInvestment,
        Self::SecuritiesTransfer,
        Self::RealEstateTransfer,
        Self::Lottery,
        Self::Royalty,
        Self::InheritanceGift,
        Self::DigitalAsset,
        Self::Exempt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Business => "business",
            Self::Rental => "rental",
            Self::CapitalInvestment => "capital_investment",
            Self::SecuritiesTransfer => "securities_transfer",
            Self::RealEstateTransfer => "real_estate_transfer",
            Self::Lottery => "lottery",
            Self::Royalty => "royalty",
            Self::InheritanceGift => "inheritance_gift",
            Self::DigitalAsset => "digital_asset",
            Self::Exempt => "exempt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for IncomeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IncomeType {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or_else(|| InputError::UnknownIncomeType(value.to_string()))
    }
}

/// How often a source pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Yearly,
    OneTime,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::OneTime => "one_time",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            "one_time" => Some(Self::OneTime),
            _ => None,
        }
    }

    /// Number of payments a source makes in one year. A one-time payment is
    /// treated as a single-year event.
    pub fn payments_per_year(&self) -> Decimal {
        match self {
            Self::Monthly => Decimal::from(12),
            Self::Yearly | Self::OneTime => Decimal::ONE,
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or_else(|| InputError::UnknownFrequency(value.to_string()))
    }
}

/// Line of business for household-business revenue. Selects the flat rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessSector {
    Distribution,
    Services,
    ProductionTransport,
    #[default]
    Other,
}

impl BusinessSector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Services => "services",
            Self::ProductionTransport => "production_transport",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "distribution" => Some(Self::Distribution),
            "services" => Some(Self::Services),
            "production_transport" => Some(Self::ProductionTransport),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl TryFrom<&str> for BusinessSector {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or_else(|| InputError::UnknownBusinessSector(value.to_string()))
    }
}

/// Category-specific facts that can change how a source is taxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFlags {
    /// Transfer between spouses, parents and children, siblings, or
    /// grandparents and grandchildren.
    pub is_from_family: bool,
    /// Interest paid on government bonds.
    pub is_gov_bond: bool,
    pub business_sector: BusinessSector,
}

/// One income stream owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: String,
    pub income_type: IncomeType,
    /// Amount per payment.
    pub amount: Decimal,
    pub frequency: Frequency,
    pub flags: SourceFlags,
}

impl IncomeSource {
    pub fn new(
        id: impl Into<String>,
        income_type: IncomeType,
        amount: Decimal,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: id.into(),
            income_type,
            amount,
            frequency,
            flags: SourceFlags::default(),
        }
    }

    pub fn with_flags(
        mut self,
        flags: SourceFlags,
    ) -> Self {
        self.flags = flags;
        self
    }

    pub fn from_family(mut self) -> Self {
        self.flags.is_from_family = true;
        self
    }

    pub fn gov_bond(mut self) -> Self {
        self.flags.is_gov_bond = true;
        self
    }

    pub fn in_sector(
        mut self,
        sector: BusinessSector,
    ) -> Self {
        self.flags.business_sector = sector;
        self
    }

    pub fn annual_amount(&self) -> Decimal {
        self.amount * self.frequency.payments_per_year()
    }

    pub fn validate(&self) -> Result<(), InputError> {
        check_amount("amount", self.amount)
    }
}
