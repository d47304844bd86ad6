pub mod fees;
pub mod interest;
pub mod metrics;

use rust_decimal::Decimal;

use crate::caps::CapOutcome;
use crate::config::PricingPolicy;
use crate::decimal::Money;
use crate::rates::{RateRecord, RateResolver, ResolvedRate};
use crate::request::LoanRequest;
use crate::result::{EarlyRepaymentCharges, LtvView, PricingResult, RateView, SolveReport};
use crate::types::{LtvBucket, PricingWarning, ProductKind};

pub use fees::{title_insurance, FeeBreakdown};
pub use interest::InterestBreakdown;

/// prices a concrete gross loan in a single pass
pub struct ForwardPricer<'a> {
    policy: &'a PricingPolicy,
    record: &'a RateRecord,
}

impl<'a> ForwardPricer<'a> {
    pub fn new(policy: &'a PricingPolicy, record: &'a RateRecord) -> Self {
        Self { policy, record }
    }

    /// ltv that selects the rate tier; combined exposure for second charges
    pub fn bucket_ltv(&self, gross: Money, request: &LoanRequest) -> Decimal {
        let exposure = gross + request.first_charge_balance();
        metrics::ltv_percent(exposure, request.property_value)
    }

    pub fn resolve_rate(&self, gross: Money, request: &LoanRequest) -> ResolvedRate {
        let bucket = LtvBucket::from_ltv(self.bucket_ltv(gross, request));
        RateResolver::resolve(request.product, bucket, self.record, request.base_rate)
    }

    /// resolve the tier for this gross, then price it
    pub fn quote(&self, gross: Money, request: &LoanRequest) -> PricingResult {
        let rate = self.resolve_rate(gross, request);
        self.price(gross, &rate, request)
    }

    pub fn price(&self, gross: Money, rate: &ResolvedRate, request: &LoanRequest) -> PricingResult {
        let gross = gross.floor_zero();
        let admin_fee = request
            .admin_fee
            .or(self.record.admin_fee)
            .unwrap_or(Money::ZERO);

        let fees = FeeBreakdown::calculate(gross, request, admin_fee, &self.policy.title_insurance);
        let interest = InterestBreakdown::calculate(
            gross,
            rate,
            request,
            self.policy.fusion_base_term_months,
        );
        let total_interest = interest.total();

        let net = (gross - fees.total() - interest.rolled() - interest.deferred)
            .floor_zero()
            .min(gross);

        let ltv = LtvView {
            gross: metrics::ltv_percent(gross, request.property_value),
            combined: request
                .second_charge
                .map(|_| self.bucket_ltv(gross, request)),
            bucket: rate.bucket,
        };

        let nbp = metrics::net_proceeds(net, gross, fees.arrangement, self.policy.nbp_minimum_fee);

        let icr = match request.product {
            ProductKind::Fusion => metrics::interest_coverage(
                request.monthly_income(),
                interest.serviced_annual_rate,
                gross,
                interest.rolled(),
                self.policy.icr_horizon_months,
            ),
            _ => None,
        };

        PricingResult {
            product: request.product,
            property_value: request.property_value,
            gross,
            net,
            term_months: request.term_months,
            rates: RateView::new(rate, request.effective_deferred_rate(), interest.serviced_annual_rate),
            aprc: metrics::aprc(gross, total_interest, net, request.term_months),
            monthly_payment: interest.monthly_payment(gross),
            icr,
            nbp,
            nbp_ltv: metrics::ltv_percent(nbp, request.property_value),
            erc: EarlyRepaymentCharges {
                year1: self.record.erc_year1.map(|pct| gross.percentage(pct)),
                year2: self.record.erc_year2.map(|pct| gross.percentage(pct)),
            },
            caps: CapOutcome::uncapped(gross),
            solve: SolveReport::not_applicable(),
            warnings: self.warnings(gross, ltv.gross, request),
            error: None,
            ltv,
            fees,
            interest,
            total_interest,
        }
    }

    /// advisory checks against the rate record; these never change figures
    fn warnings(&self, gross: Money, ltv: Decimal, request: &LoanRequest) -> Vec<PricingWarning> {
        let record = self.record;
        let mut warnings = Vec::new();

        if let Some(minimum) = record.min_loan {
            if gross < minimum {
                warnings.push(PricingWarning::LoanBelowMinimum { minimum, gross });
            }
        }

        if let Some(maximum) = record.max_loan {
            if gross > maximum {
                warnings.push(PricingWarning::LoanAboveMaximum { maximum, gross });
            }
        }

        if let Some(minimum) = record.min_ltv {
            if ltv < minimum {
                warnings.push(PricingWarning::LtvBelowMinimum { minimum, ltv });
            }
        }

        let rolled = request.rolled_months;
        let below = record.min_rolled_months.is_some_and(|min| rolled < min);
        let above = record.max_rolled_months.is_some_and(|max| rolled > max);
        if below || above {
            warnings.push(PricingWarning::RolledMonthsOutOfRange {
                minimum: record.min_rolled_months,
                maximum: record.max_rolled_months,
                rolled,
            });
        }

        if let Some(maximum) = record.max_deferred_rate {
            let deferred = request.effective_deferred_rate().as_percentage();
            if deferred > maximum {
                warnings.push(PricingWarning::DeferredRateAboveMaximum { maximum, deferred });
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::BrokerClientFee;
    use rust_decimal_macros::dec;

    fn bridge_request(product: ProductKind) -> LoanRequest {
        LoanRequest::builder()
            .product(product)
            .property_value(Money::from_major(500_000))
            .gross_loan(Money::from_major(300_000))
            .term_months(12)
            .rolled_months(3)
            .base_rate(Rate::from_percentage(4))
            .arrangement_fee(Rate::from_percentage(2))
            .proc_fee(Rate::from_percent(dec!(0.5)))
            .broker_fee(Money::from_major(500))
            .broker_client_fee(BrokerClientFee::Flat(Money::from_major(995)))
            .build()
            .unwrap()
    }

    fn fusion_request() -> LoanRequest {
        LoanRequest::builder()
            .product(ProductKind::Fusion)
            .property_value(Money::from_major(600_000))
            .gross_loan(Money::from_major(360_000))
            .term_months(24)
            .rolled_months(6)
            .deferred_rate(Rate::from_percentage(2))
            .base_rate(Rate::from_percentage(4))
            .arrangement_fee(Rate::from_percentage(2))
            .monthly_rent(Money::from_major(2_500))
            .top_slicing(Money::from_major(500))
            .build()
            .unwrap()
    }

    #[test]
    fn test_variable_bridge_quote() {
        let policy = PricingPolicy::default();
        let record = RateRecord {
            rate: dec!(0.55),
            admin_fee: Some(Money::from_major(250)),
            erc_year1: Some(dec!(1)),
            ..Default::default()
        };
        let pricer = ForwardPricer::new(&policy, &record);
        let request = bridge_request(ProductKind::VariableBridge);

        let result = pricer.quote(Money::from_major(300_000), &request);

        assert_eq!(result.fees.arrangement, Money::from_major(6_000));
        assert_eq!(result.fees.admin, Money::from_major(250));
        assert_eq!(result.fees.title_insurance, Some(Money::from_decimal(dec!(436.80))));
        assert!((result.rolled_interest().as_decimal() - dec!(7950)).abs() <= dec!(100));
        assert_eq!(result.ltv.gross, dec!(60));
        assert_eq!(result.ltv.bucket, LtvBucket::Ltv60);
        assert!(result.ltv.combined.is_none());
        assert!(result.icr.is_none());
        assert_eq!(result.erc.year1, Some(Money::from_major(3_000)));
        assert!(result.erc.year2.is_none());

        // 300k - 6000 - 7950 - 1500 - 500 - 995 - 250 - 436.80
        let expected_net = dec!(282368.20);
        assert!((result.net.as_decimal() - expected_net).abs() < dec!(0.01));

        // nbp adds back the larger of 2% of gross and the arrangement fee
        assert_eq!(result.nbp, result.net + Money::from_major(6_000));
    }

    #[test]
    fn test_fixed_bridge_base_component_is_zero() {
        let policy = PricingPolicy::default();
        let record = RateRecord::with_rate(dec!(0.85));
        let pricer = ForwardPricer::new(&policy, &record);

        let result = pricer.quote(Money::from_major(300_000), &bridge_request(ProductKind::FixedBridge));

        assert_eq!(result.interest.rolled_base, Money::ZERO);
        assert_eq!(result.rates.monthly_base, Decimal::ZERO);
        assert_eq!(result.monthly_payment, Money::from_major(2_550));
        assert!(result.aprc > Decimal::ZERO);
    }

    #[test]
    fn test_fusion_quote() {
        let policy = PricingPolicy::default();
        let record = RateRecord {
            rate: dec!(6),
            product: Some("Fusion Core".to_string()),
            ..Default::default()
        };
        let pricer = ForwardPricer::new(&policy, &record);
        let request = fusion_request();

        let result = pricer.quote(Money::from_major(360_000), &request);

        assert_eq!(result.rates.tier.as_deref(), Some("Fusion Core"));
        assert_eq!(result.rates.full_annual, dec!(10));
        assert_eq!(result.rates.serviced_annual, dec!(8));
        assert_eq!(result.interest.serviced_months, 18);
        assert!(result.interest.deferred.is_positive());

        // 3,000 * 24 / (8% * 360k * 2 - rolled)
        let rolled = result.rolled_interest().as_decimal();
        let expected = dec!(72000) / (dec!(57600) - rolled) * dec!(100);
        let icr = result.icr.unwrap();
        assert!((icr - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn test_fusion_without_income_has_no_icr() {
        let policy = PricingPolicy::default();
        let record = RateRecord::with_rate(dec!(6));
        let pricer = ForwardPricer::new(&policy, &record);
        let mut request = fusion_request();
        request.monthly_rent = Money::ZERO;
        request.top_slicing = Money::ZERO;

        assert!(pricer.quote(Money::from_major(360_000), &request).icr.is_none());
    }

    #[test]
    fn test_second_charge_drives_bucket_by_combined_ltv() {
        let policy = PricingPolicy::default();
        let record = RateRecord {
            rate: dec!(0.80),
            ltv_rates: Some(crate::rates::LtvRateGrid {
                ltv60: Some(dec!(0.70)),
                ltv70: Some(dec!(0.80)),
                ltv75: Some(dec!(0.90)),
            }),
            ..Default::default()
        };
        let pricer = ForwardPricer::new(&policy, &record);
        let mut request = bridge_request(ProductKind::FixedBridge);
        request.second_charge = Some(crate::types::SecondCharge {
            first_charge_balance: Money::from_major(200_000),
        });

        let result = pricer.quote(Money::from_major(100_000), &request);

        assert_eq!(result.ltv.gross, dec!(20));
        assert_eq!(result.ltv.combined, Some(dec!(60)));
        assert_eq!(result.ltv.bucket, LtvBucket::Ltv60);
        assert_eq!(result.rates.nominal, dec!(0.70));

        let result = pricer.quote(Money::from_major(140_000), &request);
        assert_eq!(result.ltv.combined, Some(dec!(68)));
        assert_eq!(result.ltv.bucket, LtvBucket::Ltv70);
        assert_eq!(result.rates.nominal, dec!(0.80));
    }

    #[test]
    fn test_net_never_exceeds_gross() {
        let policy = PricingPolicy::default();
        let record = RateRecord::with_rate(dec!(6));
        let pricer = ForwardPricer::new(&policy, &record);

        for product in [ProductKind::VariableBridge, ProductKind::FixedBridge, ProductKind::Fusion] {
            let mut request = bridge_request(product);
            request.arrangement_fee = Rate::ZERO;
            request.proc_fee = Rate::ZERO;
            request.broker_fee = Money::ZERO;
            request.broker_client_fee = BrokerClientFee::Flat(Money::ZERO);
            request.rolled_months = 0;
            // deferred above the fusion margin would push the coupon negative
            request.deferred_rate = Rate::from_percentage(9);

            for gross in [0, 1_000, 50_000, 350_000, 4_000_000] {
                let result = pricer.quote(Money::from_major(gross), &request);
                assert!(result.net <= result.gross, "{} at {}", product, gross);
                assert!(!result.net.is_negative());
            }
        }
    }

    #[test]
    fn test_small_loan_nets_to_zero() {
        let policy = PricingPolicy::default();
        let record = RateRecord::with_rate(dec!(0.55));
        let pricer = ForwardPricer::new(&policy, &record);

        // the flat fees alone exceed the advance
        let result = pricer.quote(Money::from_major(1_000), &bridge_request(ProductKind::VariableBridge));
        assert_eq!(result.net, Money::ZERO);
        assert_eq!(result.aprc, Decimal::ZERO);
    }

    #[test]
    fn test_monotonic_in_gross() {
        let policy = PricingPolicy::default();
        let record = RateRecord::with_rate(dec!(0.55));
        let pricer = ForwardPricer::new(&policy, &record);
        let request = bridge_request(ProductKind::VariableBridge);

        let mut previous = pricer.quote(Money::ZERO, &request);
        for step in 1..=60 {
            let current = pricer.quote(Money::from_major(step * 10_000), &request);
            assert!(current.net >= previous.net);
            assert!(current.fees.arrangement >= previous.fees.arrangement);
            assert!(current.fees.proc >= previous.fees.proc);
            assert!(current.fees.broker_client >= previous.fees.broker_client);
            assert!(current.fees.total() >= previous.fees.total());
            assert!(current.total_interest >= previous.total_interest);
            previous = current;
        }
    }

    #[test]
    fn test_warnings_are_advisory() {
        let policy = PricingPolicy::default();
        let record = RateRecord {
            rate: dec!(6),
            min_loan: Some(Money::from_major(400_000)),
            max_rolled_months: Some(3),
            max_deferred_rate: Some(dec!(1.5)),
            min_ltv: Some(dec!(65)),
            ..Default::default()
        };
        let pricer = ForwardPricer::new(&policy, &record);
        let request = fusion_request();

        let result = pricer.quote(Money::from_major(360_000), &request);
        let plain = ForwardPricer::new(&policy, &RateRecord::with_rate(dec!(6)))
            .quote(Money::from_major(360_000), &request);

        assert_eq!(result.warnings.len(), 4);
        assert!(result.warnings.iter().any(|w| matches!(w, PricingWarning::LoanBelowMinimum { .. })));
        assert!(result.warnings.iter().any(|w| matches!(w, PricingWarning::RolledMonthsOutOfRange { rolled: 6, .. })));
        assert!(result.warnings.iter().any(|w| matches!(w, PricingWarning::DeferredRateAboveMaximum { .. })));
        assert!(result.warnings.iter().any(|w| matches!(w, PricingWarning::LtvBelowMinimum { .. })));
        assert_eq!(result.net, plain.net);
        assert!(plain.warnings.is_empty());
    }
}
