//! net-to-gross solving
//!
//! Fees and the rate tier both depend on the gross being solved for, so the
//! gross is found by a damped fixed-point refinement followed by fixed-size
//! stepping. The step loops are what guarantee the rounding contract: the
//! returned gross is a whole number of steps and the smallest such value
//! whose priced net reaches the target, unless a cap gets in the way.
//!
//! Net is not monotonic in gross: crossing an ltv boundary moves the loan
//! onto a dearer tier, so the top of each cheaper tier is checked as well.

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::caps::{CapContext, CapEnforcer};
use crate::config::SolverPolicy;
use crate::decimal::Money;
use crate::pricing::ForwardPricer;
use crate::request::LoanRequest;
use crate::result::{PricingResult, SolveReport};
use crate::types::{LtvBucket, SolveOutcome};

/// gross found for a target net, with its priced figures
#[derive(Debug, Clone)]
pub struct Solution {
    pub gross: Money,
    pub priced: PricingResult,
    pub report: SolveReport,
    /// the cap stopped the search before the target was met
    pub capped_short: bool,
}

pub struct InverseSolver<'a> {
    pricer: &'a ForwardPricer<'a>,
    caps: &'a CapEnforcer<'a>,
    policy: &'a SolverPolicy,
}

impl<'a> InverseSolver<'a> {
    pub fn new(
        pricer: &'a ForwardPricer<'a>,
        caps: &'a CapEnforcer<'a>,
        policy: &'a SolverPolicy,
    ) -> Self {
        Self { pricer, caps, policy }
    }

    pub fn solve(&self, target: Money, request: &LoanRequest, context: &CapContext) -> Solution {
        let step = self.policy.step;
        let max_gross = self.caps.limit(context).map(|limit| limit.max_gross);
        let clamp = |gross: Money| match max_gross {
            Some(max) => gross.min(max).floor_zero(),
            None => gross.floor_zero(),
        };

        let (estimate, refine_passes) = self.refine(target, request, &clamp);
        let mut gross = clamp(estimate);
        let mut priced = self.pricer.quote(gross, request);
        let mut step_iterations = 0;
        let mut bound_reached = false;
        let mut cap_hit = false;

        // climb until the target is met
        let floor = target - self.policy.net_tolerance;
        while priced.net < floor {
            if step_iterations >= self.policy.max_step_iterations {
                bound_reached = true;
                warn!(
                    "step refinement exhausted {} iterations at gross {} (net {}, target {})",
                    step_iterations, gross, priced.net, target
                );
                break;
            }
            step_iterations += 1;

            let next = gross + step;
            if let Some(max) = max_gross {
                if next > max {
                    if gross < max {
                        gross = max;
                        priced = self.pricer.quote(gross, request);
                    }
                    cap_hit = true;
                    debug!("cap {} reached while solving for net {}", max, target);
                    break;
                }
            }

            gross = next;
            priced = self.pricer.quote(gross, request);
        }

        // pull an overshoot back down without dropping below the target
        if priced.net - target > self.policy.overshoot_threshold {
            let (lower, lower_priced, descended, exhausted) =
                self.descend(gross, priced, target, request);
            gross = lower;
            priced = lower_priced;
            step_iterations += descended;
            bound_reached |= exhausted;
        }

        // a cheaper tier below an ltv boundary can meet the target with a smaller gross
        if priced.net >= floor {
            for bucket in [LtvBucket::Ltv60, LtvBucket::Ltv70] {
                if bucket >= priced.ltv.bucket {
                    continue;
                }
                let Some(ceiling) = self.tier_ceiling(bucket, context) else {
                    continue;
                };
                let ceiling = clamp(ceiling);
                if ceiling >= gross {
                    continue;
                }

                let ceiling_priced = self.pricer.quote(ceiling, request);
                step_iterations += 1;
                if ceiling_priced.net < target {
                    continue;
                }

                let (lower, lower_priced, descended, exhausted) =
                    self.descend(ceiling, ceiling_priced, target, request);
                step_iterations += descended;
                bound_reached |= exhausted;
                if lower < gross {
                    debug!(
                        "tier {:?} meets net {} at gross {} below {}",
                        bucket, target, lower, gross
                    );
                    gross = lower;
                    priced = lower_priced;
                }
            }
        }

        let met = priced.net >= floor;
        let capped_short = cap_hit && !met;
        let outcome = if met {
            SolveOutcome::TargetMet
        } else if capped_short {
            SolveOutcome::CappedShort
        } else {
            SolveOutcome::Unconverged
        };

        debug!(
            "solved net {} -> gross {} (net {}, {:?}, {} refine passes, {} steps)",
            target, gross, priced.net, outcome, refine_passes, step_iterations
        );

        Solution {
            gross,
            priced,
            report: SolveReport {
                outcome,
                target_net: Some(target),
                refine_passes,
                step_iterations,
                bound_reached,
            },
            capped_short,
        }
    }

    /// step down while the next step still meets the target
    fn descend(
        &self,
        mut gross: Money,
        mut priced: PricingResult,
        target: Money,
        request: &LoanRequest,
    ) -> (Money, PricingResult, u32, bool) {
        let step = self.policy.step;
        let mut descended = 0;

        loop {
            if descended >= self.policy.max_step_iterations {
                warn!(
                    "decrement loop exhausted {} iterations at gross {}",
                    descended, gross
                );
                return (gross, priced, descended, true);
            }
            if gross < step {
                break;
            }

            let lower = gross - step;
            let lower_priced = self.pricer.quote(lower, request);
            if lower_priced.net < target {
                break;
            }

            descended += 1;
            gross = lower;
            priced = lower_priced;
        }

        (gross, priced, descended, false)
    }

    /// largest whole step whose bucket ltv stays within `bucket`
    fn tier_ceiling(&self, bucket: LtvBucket, context: &CapContext) -> Option<Money> {
        let exposure = context.property_value.percentage(Decimal::from(bucket.percent()));
        let first_charge = context.first_charge.unwrap_or(Money::ZERO);
        let gross = (exposure - first_charge).round_down_to(self.policy.step);
        gross.is_positive().then_some(gross)
    }

    /// damped fixed-point pass: add the shortfall back onto the estimate
    fn refine(
        &self,
        target: Money,
        request: &LoanRequest,
        clamp: &impl Fn(Money) -> Money,
    ) -> (Money, u32) {
        let step = self.policy.step;
        let mut estimate = clamp((target * self.policy.seed_factor).round_up_to(step));
        let mut passes = 0;

        while passes < self.policy.max_refine_passes {
            passes += 1;

            let candidate = self.pricer.quote(estimate, request).net;
            let shortfall = target - candidate;
            debug!(
                "refine pass {}: gross {} nets {} (shortfall {})",
                passes, estimate, candidate, shortfall
            );

            if shortfall.abs() < self.policy.convergence_tolerance {
                return (estimate.round_up_to(step), passes);
            }

            let next = clamp(estimate + shortfall);
            if next == estimate {
                break;
            }
            estimate = next;
        }

        (estimate.round_up_to(step), passes)
    }
}
