use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::rates::ResolvedRate;
use crate::request::LoanRequest;
use crate::types::ProductKind;

/// interest split by how it is paid
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterestBreakdown {
    /// accrued and paid at redemption (fusion only)
    pub deferred: Money,
    /// coupon or margin share of rolled interest
    pub rolled_coupon: Money,
    /// base-rate share of rolled interest
    pub rolled_base: Money,
    /// paid monthly over the serviced months
    pub serviced: Money,
    pub rolled_months: u32,
    pub serviced_months: u32,
    /// annual rate charged on the serviced months
    pub serviced_annual_rate: Rate,
}

impl InterestBreakdown {
    pub fn calculate(
        gross: Money,
        rate: &ResolvedRate,
        request: &LoanRequest,
        fusion_base_term_months: u32,
    ) -> Self {
        let rolled_months = request.rolled_months;
        let serviced_months = match request.product {
            ProductKind::Fusion => fusion_base_term_months.saturating_sub(rolled_months),
            _ => request.term_months.saturating_sub(rolled_months),
        };

        let deferred_annual = request.effective_deferred_rate();
        let monthly_deferred = deferred_annual.monthly_rate();

        let deferred = gross.monthly_interest(monthly_deferred, request.term_months);

        // deferred accrual is carved out of the coupon, never below zero
        let rolled_coupon = gross
            .monthly_interest(rate.monthly_coupon - monthly_deferred, rolled_months)
            .floor_zero();

        let rolled_base = if request.product.tracks_base_rate() {
            gross.monthly_interest(rate.monthly_base, rolled_months)
        } else {
            Money::ZERO
        };

        let serviced_annual_rate = (rate.full_annual - deferred_annual).max(Rate::ZERO);
        let serviced = gross.monthly_interest(serviced_annual_rate.monthly_rate(), serviced_months);

        Self {
            deferred,
            rolled_coupon,
            rolled_base,
            serviced,
            rolled_months,
            serviced_months,
            serviced_annual_rate,
        }
    }

    pub fn rolled(&self) -> Money {
        self.rolled_coupon + self.rolled_base
    }

    pub fn total(&self) -> Money {
        self.deferred + self.rolled() + self.serviced
    }

    /// serviced interest per month, zero when nothing is serviced
    pub fn monthly_payment(&self, gross: Money) -> Money {
        if self.serviced_months == 0 {
            return Money::ZERO;
        }
        gross.portion(self.serviced_annual_rate.monthly_rate())
    }
}
