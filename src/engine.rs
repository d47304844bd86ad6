use log::{debug, warn};
use rayon::prelude::*;

use crate::caps::{CapContext, CapEnforcer};
use crate::config::PricingPolicy;
use crate::decimal::Money;
use crate::errors::Result;
use crate::pricing::ForwardPricer;
use crate::rates::RateRecord;
use crate::request::LoanRequest;
use crate::result::{PricingResult, SolveReport};
use crate::solver::InverseSolver;
use crate::types::LoanAmount;

/// prices loan requests against rate records under one policy
#[derive(Debug, Clone, Default)]
pub struct LoanSolver {
    policy: PricingPolicy,
}

impl LoanSolver {
    pub fn new(policy: PricingPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// price one request; invalid inputs come back as a zeroed result with an error
    pub fn price(&self, request: &LoanRequest, record: &RateRecord) -> PricingResult {
        if !request.property_value.is_positive() {
            return self.reject(request, "property value must be positive");
        }

        match request.amount {
            Some(LoanAmount::Gross(gross)) if gross.is_positive() => {
                self.price_gross(gross, request, record)
            }
            Some(LoanAmount::SpecificNet(target)) if target.is_positive() => {
                self.price_net(target, request, record)
            }
            _ => self.reject(request, "no usable gross loan or target net loan"),
        }
    }

    /// price one request against every row of a rate card in parallel
    pub fn price_rate_card(&self, request: &LoanRequest, records: &[RateRecord]) -> Vec<PricingResult> {
        records
            .par_iter()
            .map(|record| self.price(request, record))
            .collect()
    }

    fn price_gross(&self, gross: Money, request: &LoanRequest, record: &RateRecord) -> PricingResult {
        let context = CapContext::new(request, record);
        let caps = CapEnforcer::new(&self.policy.caps);
        let pricer = ForwardPricer::new(&self.policy, record);

        let clamped = caps.clamp(gross, &context);
        let priced = pricer.quote(clamped.gross, request);

        let final_pass = caps.clamp(priced.gross, &context);
        debug_assert!(!final_pass.capped);

        debug!(
            "priced {} gross {} -> net {} (capped: {})",
            request.product, priced.gross, priced.net, clamped.capped
        );

        PricingResult {
            caps: clamped,
            solve: SolveReport::not_applicable(),
            ..priced
        }
    }

    fn price_net(&self, target: Money, request: &LoanRequest, record: &RateRecord) -> PricingResult {
        let context = CapContext::new(request, record);
        let caps = CapEnforcer::new(&self.policy.caps);
        let pricer = ForwardPricer::new(&self.policy, record);
        let solver = InverseSolver::new(&pricer, &caps, &self.policy.solver);

        let solution = solver.solve(target, request, &context);

        let mut final_pass = caps.clamp(solution.gross, &context);
        let priced = if final_pass.gross == solution.gross {
            solution.priced
        } else {
            pricer.quote(final_pass.gross, request)
        };
        final_pass.capped |= solution.capped_short;

        PricingResult {
            caps: final_pass,
            solve: solution.report,
            ..priced
        }
    }

    fn reject(&self, request: &LoanRequest, message: &str) -> PricingResult {
        warn!("rejecting {} quote: {}", request.product, message);
        PricingResult::invalid(request, message)
    }
}

/// price with the default policy
pub fn price(request: &LoanRequest, record: &RateRecord) -> PricingResult {
    LoanSolver::default().price(request, record)
}
