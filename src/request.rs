use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PricingError, Result};
use crate::types::{BrokerClientFee, LoanAmount, ProductKind, SecondCharge};

/// borrower-chosen loan parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub product: ProductKind,
    pub property_value: Money,
    pub amount: Option<LoanAmount>,
    pub term_months: u32,
    #[serde(default)]
    pub rolled_months: u32,
    /// fusion only
    #[serde(default)]
    pub deferred_rate: Rate,
    #[serde(default)]
    pub base_rate: Rate,
    #[serde(default)]
    pub arrangement_fee: Rate,
    #[serde(default)]
    pub proc_fee: Rate,
    #[serde(default)]
    pub broker_fee: Money,
    #[serde(default)]
    pub broker_client_fee: BrokerClientFee,
    /// overrides the rate record's admin fee when set
    #[serde(default)]
    pub admin_fee: Option<Money>,
    #[serde(default)]
    pub second_charge: Option<SecondCharge>,
    #[serde(default)]
    pub monthly_rent: Money,
    #[serde(default)]
    pub top_slicing: Money,
}

impl LoanRequest {
    pub fn builder() -> LoanRequestBuilder {
        LoanRequestBuilder::new()
    }

    pub fn is_second_charge(&self) -> bool {
        self.second_charge.is_some()
    }

    pub fn first_charge_balance(&self) -> Money {
        self.second_charge
            .map(|charge| charge.first_charge_balance)
            .unwrap_or(Money::ZERO)
    }

    /// rent plus top slicing
    pub fn monthly_income(&self) -> Money {
        self.monthly_rent + self.top_slicing
    }

    /// deferred rate that actually applies to this product
    pub fn effective_deferred_rate(&self) -> Rate {
        match self.product {
            ProductKind::Fusion => self.deferred_rate,
            _ => Rate::ZERO,
        }
    }

    /// same request priced against a different amount
    pub fn with_amount(&self, amount: LoanAmount) -> Self {
        Self {
            amount: Some(amount),
            ..self.clone()
        }
    }
}

/// builder for loan requests
#[derive(Debug, Default)]
pub struct LoanRequestBuilder {
    product: Option<ProductKind>,
    property_value: Option<Money>,
    amount: Option<LoanAmount>,
    term_months: Option<u32>,
    rolled_months: u32,
    deferred_rate: Rate,
    base_rate: Rate,
    arrangement_fee: Rate,
    proc_fee: Rate,
    broker_fee: Money,
    broker_client_fee: BrokerClientFee,
    admin_fee: Option<Money>,
    second_charge: Option<SecondCharge>,
    monthly_rent: Money,
    top_slicing: Money,
}

impl LoanRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(mut self, product: ProductKind) -> Self {
        self.product = Some(product);
        self
    }

    pub fn property_value(mut self, value: Money) -> Self {
        self.property_value = Some(value);
        self
    }

    pub fn gross_loan(mut self, gross: Money) -> Self {
        self.amount = Some(LoanAmount::Gross(gross));
        self
    }

    pub fn specific_net_loan(mut self, net: Money) -> Self {
        self.amount = Some(LoanAmount::SpecificNet(net));
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn rolled_months(mut self, months: u32) -> Self {
        self.rolled_months = months;
        self
    }

    pub fn deferred_rate(mut self, rate: Rate) -> Self {
        self.deferred_rate = rate;
        self
    }

    pub fn base_rate(mut self, rate: Rate) -> Self {
        self.base_rate = rate;
        self
    }

    pub fn arrangement_fee(mut self, rate: Rate) -> Self {
        self.arrangement_fee = rate;
        self
    }

    pub fn proc_fee(mut self, rate: Rate) -> Self {
        self.proc_fee = rate;
        self
    }

    pub fn broker_fee(mut self, fee: Money) -> Self {
        self.broker_fee = fee;
        self
    }

    pub fn broker_client_fee(mut self, fee: BrokerClientFee) -> Self {
        self.broker_client_fee = fee;
        self
    }

    pub fn admin_fee(mut self, fee: Money) -> Self {
        self.admin_fee = Some(fee);
        self
    }

    pub fn second_charge(mut self, first_charge_balance: Money) -> Self {
        self.second_charge = Some(SecondCharge { first_charge_balance });
        self
    }

    pub fn monthly_rent(mut self, rent: Money) -> Self {
        self.monthly_rent = rent;
        self
    }

    pub fn top_slicing(mut self, income: Money) -> Self {
        self.top_slicing = income;
        self
    }

    /// the loan amount is left optional; pricing reports a missing amount as a soft error
    pub fn build(self) -> Result<LoanRequest> {
        let product = self.product.ok_or(PricingError::InvalidRequest {
            message: "Product kind required".to_string(),
        })?;

        let property_value = self.property_value.ok_or(PricingError::InvalidRequest {
            message: "Property value required".to_string(),
        })?;

        let term_months = self.term_months.ok_or(PricingError::InvalidRequest {
            message: "Term required".to_string(),
        })?;

        if term_months == 0 {
            return Err(PricingError::InvalidRequest {
                message: "Term must be at least one month".to_string(),
            });
        }

        if self.rolled_months > term_months && product.is_bridge() {
            return Err(PricingError::InvalidRequest {
                message: format!(
                    "Rolled months {} exceed term {}",
                    self.rolled_months, term_months
                ),
            });
        }

        if let Some(charge) = self.second_charge {
            if charge.first_charge_balance.is_negative() {
                return Err(PricingError::InvalidRequest {
                    message: "First charge balance cannot be negative".to_string(),
                });
            }
        }

        Ok(LoanRequest {
            product,
            property_value,
            amount: self.amount,
            term_months,
            rolled_months: self.rolled_months,
            deferred_rate: self.deferred_rate,
            base_rate: self.base_rate,
            arrangement_fee: self.arrangement_fee,
            proc_fee: self.proc_fee,
            broker_fee: self.broker_fee,
            broker_client_fee: self.broker_client_fee,
            admin_fee: self.admin_fee,
            second_charge: self.second_charge,
            monthly_rent: self.monthly_rent,
            top_slicing: self.top_slicing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_requires_core_fields() {
        let err = LoanRequest::builder()
            .property_value(Money::from_major(500_000))
            .term_months(12)
            .build()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidRequest { .. }));

        let err = LoanRequest::builder()
            .product(ProductKind::FixedBridge)
            .property_value(Money::from_major(500_000))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid request: Term required");
    }

    #[test]
    fn test_builder_rejects_rolled_beyond_term() {
        let result = LoanRequest::builder()
            .product(ProductKind::VariableBridge)
            .property_value(Money::from_major(500_000))
            .term_months(6)
            .rolled_months(9)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_deferred_rate_only_applies_to_fusion() {
        let bridge = LoanRequest::builder()
            .product(ProductKind::VariableBridge)
            .property_value(Money::from_major(400_000))
            .term_months(12)
            .deferred_rate(Rate::from_percentage(2))
            .build()
            .unwrap();
        assert_eq!(bridge.effective_deferred_rate(), Rate::ZERO);

        let fusion = LoanRequest {
            product: ProductKind::Fusion,
            ..bridge
        };
        assert_eq!(fusion.effective_deferred_rate(), Rate::from_percentage(2));
    }

    #[test]
    fn test_second_charge_context() {
        let request = LoanRequest::builder()
            .product(ProductKind::FixedBridge)
            .property_value(Money::from_major(500_000))
            .term_months(12)
            .second_charge(Money::from_major(200_000))
            .monthly_rent(Money::from_major(1_800))
            .top_slicing(Money::from_major(200))
            .build()
            .unwrap();

        assert!(request.is_second_charge());
        assert_eq!(request.first_charge_balance(), Money::from_major(200_000));
        assert_eq!(request.monthly_income(), Money::from_major(2_000));
    }

    #[test]
    fn test_request_from_json() {
        let request: LoanRequest = serde_json::from_str(
            r#"{
                "product": "fusion",
                "property_value": "750000",
                "amount": { "specific_net": "400000" },
                "term_months": 24,
                "rolled_months": 6,
                "deferred_rate": "0.02",
                "base_rate": "0.04",
                "arrangement_fee": "0.02",
                "broker_client_fee": { "percent_of_gross": "0.005" }
            }"#,
        )
        .unwrap();

        assert_eq!(request.product, ProductKind::Fusion);
        assert_eq!(request.amount, Some(LoanAmount::SpecificNet(Money::from_major(400_000))));
        assert_eq!(request.deferred_rate.as_decimal(), dec!(0.02));
        assert_eq!(
            request.broker_client_fee,
            BrokerClientFee::PercentOfGross(Rate::from_decimal(dec!(0.005)))
        );
        assert!(request.second_charge.is_none());
        assert_eq!(request.proc_fee, Rate::ZERO);
    }
}
