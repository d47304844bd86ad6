use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::rates::RateRecord;
use crate::types::{LtvBucket, ProductKind};

/// rate components applicable to one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub product: ProductKind,
    pub bucket: LtvBucket,
    /// rate as read from the card, in percent
    pub nominal: Decimal,
    /// coupon or margin per month, excluding base rate
    pub monthly_coupon: Rate,
    /// base rate per month, zero when the product ignores base rate
    pub monthly_base: Rate,
    pub annual_base: Rate,
    /// all-in annual rate including base where applicable
    pub full_annual: Rate,
    pub tier: Option<String>,
}

impl ResolvedRate {
    /// coupon plus base per month
    pub fn monthly_total(&self) -> Rate {
        self.monthly_coupon + self.monthly_base
    }
}

/// derives rate components from a rate record
pub struct RateResolver;

impl RateResolver {
    pub fn resolve(
        product: ProductKind,
        bucket: LtvBucket,
        record: &RateRecord,
        annual_base: Rate,
    ) -> ResolvedRate {
        let nominal = record.rate_for(bucket);

        let (monthly_coupon, monthly_base, annual_base, full_annual, tier) = match product {
            ProductKind::VariableBridge => {
                let margin = Rate::from_percent(nominal);
                let base = annual_base.monthly_rate();
                (margin, base, annual_base, (margin + base).annualized(), None)
            }
            ProductKind::FixedBridge => {
                let coupon = Rate::from_percent(nominal);
                (coupon, Rate::ZERO, Rate::ZERO, coupon.annualized(), None)
            }
            ProductKind::Fusion => {
                let annual_margin = Rate::from_percent(nominal);
                (
                    annual_margin.monthly_rate(),
                    annual_base.monthly_rate(),
                    annual_base,
                    annual_margin + annual_base,
                    record.product.clone(),
                )
            }
        };

        ResolvedRate {
            product,
            bucket,
            nominal,
            monthly_coupon,
            monthly_base,
            annual_base,
            full_annual,
            tier,
        }
    }
}
