use serde::{Deserialize, Serialize};

use crate::config::TitleInsurancePolicy;
use crate::decimal::Money;
use crate::request::LoanRequest;

/// every fee deducted from the gross advance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub arrangement: Money,
    pub proc: Money,
    pub broker: Money,
    pub broker_client: Money,
    pub admin: Money,
    /// absent when the loan is outside the insurable range
    pub title_insurance: Option<Money>,
}

impl FeeBreakdown {
    pub fn calculate(
        gross: Money,
        request: &LoanRequest,
        admin_fee: Money,
        policy: &TitleInsurancePolicy,
    ) -> Self {
        Self {
            arrangement: gross.portion(request.arrangement_fee),
            proc: gross.portion(request.proc_fee),
            broker: request.broker_fee,
            broker_client: request.broker_client_fee.amount(gross),
            admin: admin_fee,
            title_insurance: title_insurance(gross, policy),
        }
    }

    /// fees taken out of the advance
    pub fn total(&self) -> Money {
        self.arrangement
            + self.proc
            + self.broker
            + self.broker_client
            + self.admin
            + self.title_insurance.unwrap_or(Money::ZERO)
    }
}

/// premium including tax, floored at the minimum premium
pub fn title_insurance(gross: Money, policy: &TitleInsurancePolicy) -> Option<Money> {
    if !gross.is_positive() || gross > policy.maximum_gross {
        return None;
    }

    let premium = gross.portion(policy.premium_rate) * policy.ipt_multiplier;
    Some(premium.max(policy.minimum_premium))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::{BrokerClientFee, ProductKind};
    use rust_decimal_macros::dec;

    fn create_test_request() -> LoanRequest {
        LoanRequest::builder()
            .product(ProductKind::VariableBridge)
            .property_value(Money::from_major(500_000))
            .gross_loan(Money::from_major(300_000))
            .term_months(12)
            .arrangement_fee(Rate::from_percentage(2))
            .proc_fee(Rate::from_percent(dec!(0.5)))
            .broker_fee(Money::from_major(500))
            .broker_client_fee(BrokerClientFee::PercentOfGross(Rate::from_percentage(1)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_title_insurance_floor_binds() {
        let policy = TitleInsurancePolicy::default();
        let premium = title_insurance(Money::from_major(100_000), &policy).unwrap();
        assert_eq!(premium.round_dp(2), Money::from_minor(39_200));
    }

    #[test]
    fn test_title_insurance_formula_binds() {
        let policy = TitleInsurancePolicy::default();
        let premium = title_insurance(Money::from_major(300_000), &policy).unwrap();
        assert_eq!(premium, Money::from_decimal(dec!(436.80)));
    }

    #[test]
    fn test_title_insurance_out_of_range() {
        let policy = TitleInsurancePolicy::default();
        assert!(title_insurance(Money::ZERO, &policy).is_none());
        assert!(title_insurance(Money::from_major(3_000_001), &policy).is_none());
        assert!(title_insurance(Money::from_major(3_000_000), &policy).is_some());
    }

    #[test]
    fn test_fee_breakdown() {
        let request = create_test_request();
        let fees = FeeBreakdown::calculate(
            Money::from_major(300_000),
            &request,
            Money::from_major(250),
            &TitleInsurancePolicy::default(),
        );

        assert_eq!(fees.arrangement, Money::from_major(6_000));
        assert_eq!(fees.proc, Money::from_major(1_500));
        assert_eq!(fees.broker, Money::from_major(500));
        assert_eq!(fees.broker_client, Money::from_major(3_000));
        assert_eq!(fees.admin, Money::from_major(250));
        assert_eq!(fees.total(), Money::from_decimal(dec!(11686.80)));
    }
}
