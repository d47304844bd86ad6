use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::caps::CapOutcome;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::pricing::{FeeBreakdown, InterestBreakdown};
use crate::rates::ResolvedRate;
use crate::request::LoanRequest;
use crate::types::{LtvBucket, PricingWarning, ProductKind, SolveOutcome};

/// full economics of one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub product: ProductKind,
    pub property_value: Money,
    pub gross: Money,
    pub net: Money,
    pub term_months: u32,
    pub ltv: LtvView,
    pub rates: RateView,
    pub fees: FeeBreakdown,
    pub interest: InterestBreakdown,
    pub total_interest: Money,
    /// annual percentage rate of charge, in percent
    pub aprc: Decimal,
    pub monthly_payment: Money,
    /// interest coverage in percent, fusion only
    pub icr: Option<Decimal>,
    /// net proceeds to borrower
    pub nbp: Money,
    pub nbp_ltv: Decimal,
    pub erc: EarlyRepaymentCharges,
    pub caps: CapOutcome,
    pub solve: SolveReport,
    pub warnings: Vec<PricingWarning>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtvView {
    /// gross over property value, percent
    pub gross: Decimal,
    /// first charge plus gross over property value, second charge only
    pub combined: Option<Decimal>,
    pub bucket: LtvBucket,
}

/// rate components as percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateView {
    pub nominal: Decimal,
    pub monthly_coupon: Decimal,
    pub monthly_base: Decimal,
    pub monthly_total: Decimal,
    pub annual_base: Decimal,
    pub full_annual: Decimal,
    pub deferred_annual: Decimal,
    pub serviced_annual: Decimal,
    pub tier: Option<String>,
}

impl RateView {
    pub fn new(rate: &ResolvedRate, deferred_annual: Rate, serviced_annual: Rate) -> Self {
        Self {
            nominal: rate.nominal,
            monthly_coupon: rate.monthly_coupon.as_percentage(),
            monthly_base: rate.monthly_base.as_percentage(),
            monthly_total: rate.monthly_total().as_percentage(),
            annual_base: rate.annual_base.as_percentage(),
            full_annual: rate.full_annual.as_percentage(),
            deferred_annual: deferred_annual.as_percentage(),
            serviced_annual: serviced_annual.as_percentage(),
            tier: rate.tier.clone(),
        }
    }

    fn zeroed() -> Self {
        Self {
            nominal: Decimal::ZERO,
            monthly_coupon: Decimal::ZERO,
            monthly_base: Decimal::ZERO,
            monthly_total: Decimal::ZERO,
            annual_base: Decimal::ZERO,
            full_annual: Decimal::ZERO,
            deferred_annual: Decimal::ZERO,
            serviced_annual: Decimal::ZERO,
            tier: None,
        }
    }
}

/// early repayment charges in pounds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EarlyRepaymentCharges {
    pub year1: Option<Money>,
    pub year2: Option<Money>,
}

/// how the gross figure was reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub target_net: Option<Money>,
    pub refine_passes: u32,
    pub step_iterations: u32,
    /// a safety bound stopped the search
    pub bound_reached: bool,
}

impl SolveReport {
    pub fn not_applicable() -> Self {
        Self {
            outcome: SolveOutcome::NotApplicable,
            target_net: None,
            refine_passes: 0,
            step_iterations: 0,
            bound_reached: false,
        }
    }
}

impl PricingResult {
    /// all-zero result carrying an error message
    pub fn invalid(request: &LoanRequest, message: impl Into<String>) -> Self {
        Self {
            product: request.product,
            property_value: request.property_value,
            gross: Money::ZERO,
            net: Money::ZERO,
            term_months: request.term_months,
            ltv: LtvView {
                gross: Decimal::ZERO,
                combined: None,
                bucket: LtvBucket::Ltv60,
            },
            rates: RateView::zeroed(),
            fees: FeeBreakdown::default(),
            interest: InterestBreakdown::default(),
            total_interest: Money::ZERO,
            aprc: Decimal::ZERO,
            monthly_payment: Money::ZERO,
            icr: None,
            nbp: Money::ZERO,
            nbp_ltv: Decimal::ZERO,
            erc: EarlyRepaymentCharges::default(),
            caps: CapOutcome::uncapped(Money::ZERO),
            solve: SolveReport::not_applicable(),
            warnings: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_capped(&self) -> bool {
        self.caps.capped
    }

    /// rolled interest across coupon and base components
    pub fn rolled_interest(&self) -> Money {
        self.interest.rolled()
    }

    /// everything taken out of the gross advance
    pub fn total_deductions(&self) -> Money {
        self.gross - self.net
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
