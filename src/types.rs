use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Money, Rate};
use crate::errors::PricingError;

/// loan product kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductKind {
    /// monthly margin over base rate
    VariableBridge,
    /// fixed monthly coupon, no base-rate linkage
    FixedBridge,
    /// annual margin over base rate with optional deferred interest
    Fusion,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::VariableBridge => "variable-bridge",
            ProductKind::FixedBridge => "fixed-bridge",
            ProductKind::Fusion => "fusion",
        }
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self, ProductKind::VariableBridge | ProductKind::FixedBridge)
    }

    /// whether the base rate contributes to the coupon
    pub fn tracks_base_rate(&self) -> bool {
        matches!(self, ProductKind::VariableBridge | ProductKind::Fusion)
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "variable-bridge" | "variable" => Ok(ProductKind::VariableBridge),
            "fixed-bridge" | "fixed" => Ok(ProductKind::FixedBridge),
            "fusion" => Ok(ProductKind::Fusion),
            _ => Err(PricingError::UnknownProductKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// ltv tier boundary used to select a rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LtvBucket {
    Ltv60,
    Ltv70,
    Ltv75,
}

impl LtvBucket {
    /// ceiling bucketing: anything above 70% lands in the top tier
    pub fn from_ltv(ltv_percent: Decimal) -> Self {
        if ltv_percent <= dec!(60) {
            LtvBucket::Ltv60
        } else if ltv_percent <= dec!(70) {
            LtvBucket::Ltv70
        } else {
            LtvBucket::Ltv75
        }
    }

    pub fn percent(&self) -> u32 {
        match self {
            LtvBucket::Ltv60 => 60,
            LtvBucket::Ltv70 => 70,
            LtvBucket::Ltv75 => 75,
        }
    }
}

/// loan amount supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanAmount {
    /// price this gross loan
    Gross(Money),
    /// solve for the gross that yields at least this net
    SpecificNet(Money),
}

/// broker client fee charged to the borrower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerClientFee {
    Flat(Money),
    PercentOfGross(Rate),
}

impl BrokerClientFee {
    pub fn amount(&self, gross: Money) -> Money {
        match self {
            BrokerClientFee::Flat(fee) => *fee,
            BrokerClientFee::PercentOfGross(rate) => gross.portion(*rate),
        }
    }
}

impl Default for BrokerClientFee {
    fn default() -> Self {
        BrokerClientFee::Flat(Money::ZERO)
    }
}

/// existing first-charge exposure behind which this loan sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondCharge {
    pub first_charge_balance: Money,
}

/// which structural limit clamped the gross loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapRule {
    /// combined first + second charge exposure
    SecondCharge,
    /// product ltv ceiling
    MaxLtv,
}

/// how an inverse solve finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveOutcome {
    /// priced net meets the target
    TargetMet,
    /// a cap stopped the search below the target
    CappedShort,
    /// iteration bounds ran out below the target
    Unconverged,
    /// forward pricing, nothing was solved
    NotApplicable,
}

/// non-binding observations against the rate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingWarning {
    LoanBelowMinimum { minimum: Money, gross: Money },
    LoanAboveMaximum { maximum: Money, gross: Money },
    LtvBelowMinimum { minimum: Decimal, ltv: Decimal },
    RolledMonthsOutOfRange { minimum: Option<u32>, maximum: Option<u32>, rolled: u32 },
    DeferredRateAboveMaximum { maximum: Decimal, deferred: Decimal },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_kind_parsing() {
        assert_eq!("variable-bridge".parse::<ProductKind>().unwrap(), ProductKind::VariableBridge);
        assert_eq!("Fixed_Bridge".parse::<ProductKind>().unwrap(), ProductKind::FixedBridge);
        assert_eq!("fusion".parse::<ProductKind>().unwrap(), ProductKind::Fusion);

        let err = "term-loan".parse::<ProductKind>().unwrap_err();
        assert_eq!(err, PricingError::UnknownProductKind { kind: "term-loan".to_string() });
    }

    #[test]
    fn test_product_kind_serde() {
        let json = serde_json::to_string(&ProductKind::FixedBridge).unwrap();
        assert_eq!(json, "\"fixed-bridge\"");

        assert!(serde_json::from_str::<ProductKind>("\"overdraft\"").is_err());
    }

    #[test]
    fn test_ltv_bucket_boundaries() {
        assert_eq!(LtvBucket::from_ltv(dec!(0)), LtvBucket::Ltv60);
        assert_eq!(LtvBucket::from_ltv(dec!(60)), LtvBucket::Ltv60);
        assert_eq!(LtvBucket::from_ltv(dec!(60.01)), LtvBucket::Ltv70);
        assert_eq!(LtvBucket::from_ltv(dec!(70)), LtvBucket::Ltv70);
        assert_eq!(LtvBucket::from_ltv(dec!(70.5)), LtvBucket::Ltv75);
        assert_eq!(LtvBucket::from_ltv(dec!(95)), LtvBucket::Ltv75);
    }

    #[test]
    fn test_ltv_bucket_monotonic() {
        let mut previous = LtvBucket::Ltv60;
        for ltv in 0..=100 {
            let bucket = LtvBucket::from_ltv(Decimal::from(ltv));
            assert!(bucket >= previous);
            previous = bucket;
        }
    }

    #[test]
    fn test_broker_client_fee() {
        let gross = Money::from_major(200_000);

        assert_eq!(BrokerClientFee::Flat(Money::from_major(995)).amount(gross), Money::from_major(995));
        assert_eq!(
            BrokerClientFee::PercentOfGross(Rate::from_percentage(1)).amount(gross),
            Money::from_major(2_000)
        );
    }
}
