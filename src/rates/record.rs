use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::LtvBucket;

/// one row of a lender rate card, selected upstream
///
/// Percent fields hold percentages as written on the card (0.55 means
/// 0.55%). For bridge products `rate` is monthly; for fusion it is an
/// annual margin excluding base rate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RateRecord {
    pub rate: Decimal,
    pub ltv_rates: Option<LtvRateGrid>,
    pub min_loan: Option<Money>,
    pub max_loan: Option<Money>,
    pub min_ltv: Option<Decimal>,
    pub max_ltv: Option<Decimal>,
    pub erc_year1: Option<Decimal>,
    pub erc_year2: Option<Decimal>,
    pub min_rolled_months: Option<u32>,
    pub max_rolled_months: Option<u32>,
    pub max_deferred_rate: Option<Decimal>,
    pub product: Option<String>,
    pub admin_fee: Option<Money>,
}

/// per-bucket overrides of the nominal rate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LtvRateGrid {
    pub ltv60: Option<Decimal>,
    pub ltv70: Option<Decimal>,
    pub ltv75: Option<Decimal>,
}

impl LtvRateGrid {
    pub fn rate_for(&self, bucket: LtvBucket) -> Option<Decimal> {
        match bucket {
            LtvBucket::Ltv60 => self.ltv60,
            LtvBucket::Ltv70 => self.ltv70,
            LtvBucket::Ltv75 => self.ltv75,
        }
    }
}

impl RateRecord {
    /// record with only a nominal rate
    pub fn with_rate(rate: Decimal) -> Self {
        Self {
            rate,
            ..Default::default()
        }
    }

    /// nominal rate for a bucket, falling back to the headline rate
    pub fn rate_for(&self, bucket: LtvBucket) -> Decimal {
        self.ltv_rates
            .as_ref()
            .and_then(|grid| grid.rate_for(bucket))
            .unwrap_or(self.rate)
    }

    /// max ltv when present and positive
    pub fn positive_max_ltv(&self) -> Option<Decimal> {
        self.max_ltv.filter(|ltv| *ltv > Decimal::ZERO)
    }
}
