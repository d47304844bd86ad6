use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CapPolicy;
use crate::decimal::Money;
use crate::rates::RateRecord;
use crate::request::LoanRequest;
use crate::types::{CapRule, ProductKind};

/// inputs that bound the gross loan
#[derive(Debug, Clone, PartialEq)]
pub struct CapContext {
    pub product: ProductKind,
    pub property_value: Money,
    pub first_charge: Option<Money>,
    pub max_ltv: Option<Decimal>,
}

impl CapContext {
    pub fn new(request: &LoanRequest, record: &RateRecord) -> Self {
        Self {
            product: request.product,
            property_value: request.property_value,
            first_charge: request.second_charge.map(|c| c.first_charge_balance),
            max_ltv: record.positive_max_ltv(),
        }
    }
}

/// the limit that applies to a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapLimit {
    pub rule: CapRule,
    pub max_gross: Money,
    /// ltv percentage the limit is derived from
    pub threshold: Decimal,
}

/// result of clamping a gross loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapOutcome {
    pub requested: Money,
    pub gross: Money,
    pub capped: bool,
    pub limit: Option<CapLimit>,
}

impl CapOutcome {
    pub fn uncapped(gross: Money) -> Self {
        Self {
            requested: gross,
            gross,
            capped: false,
            limit: None,
        }
    }

    pub fn rule(&self) -> Option<CapRule> {
        self.limit.map(|l| l.rule)
    }

    pub fn max_gross(&self) -> Option<Money> {
        self.limit.map(|l| l.max_gross)
    }

    pub fn threshold(&self) -> Option<Decimal> {
        self.limit.map(|l| l.threshold)
    }
}

/// clamps gross loans against structural limits
pub struct CapEnforcer<'a> {
    policy: &'a CapPolicy,
}

impl<'a> CapEnforcer<'a> {
    pub fn new(policy: &'a CapPolicy) -> Self {
        Self { policy }
    }

    /// second-charge exposure first, otherwise the product ltv ceiling
    pub fn limit(&self, context: &CapContext) -> Option<CapLimit> {
        if let Some(first_charge) = context.first_charge {
            let threshold = self.policy.second_charge_max_combined_ltv;
            let max_gross = (context.property_value.percentage(threshold) - first_charge).floor_zero();
            return Some(CapLimit {
                rule: CapRule::SecondCharge,
                max_gross,
                threshold,
            });
        }

        let threshold = match context.product {
            ProductKind::VariableBridge | ProductKind::FixedBridge => {
                Some(context.max_ltv.unwrap_or(self.policy.default_bridge_max_ltv))
            }
            ProductKind::Fusion => context.max_ltv,
        }?;

        Some(CapLimit {
            rule: CapRule::MaxLtv,
            max_gross: context.property_value.percentage(threshold).floor_zero(),
            threshold,
        })
    }

    /// reduce gross to the applicable limit; never negative, idempotent
    pub fn clamp(&self, gross: Money, context: &CapContext) -> CapOutcome {
        let requested = gross;
        let gross = gross.floor_zero();
        let limit = self.limit(context);

        match limit {
            Some(limit) if gross > limit.max_gross => {
                debug!(
                    "clamping gross {} to {} under {:?} at {}%",
                    gross, limit.max_gross, limit.rule, limit.threshold
                );
                CapOutcome {
                    requested,
                    gross: limit.max_gross,
                    capped: true,
                    limit: Some(limit),
                }
            }
            _ => CapOutcome {
                requested,
                gross,
                capped: false,
                limit,
            },
        }
    }
}
