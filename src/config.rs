use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PricingError, Result};

/// pricing policy shared by every quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// months of serviced term assumed for fusion regardless of requested term
    pub fusion_base_term_months: u32,
    /// floor for the nbp fee measure, as a share of gross
    pub nbp_minimum_fee: Rate,
    /// months of income and interest compared by the fusion icr
    pub icr_horizon_months: u32,
    pub title_insurance: TitleInsurancePolicy,
    pub caps: CapPolicy,
    pub solver: SolverPolicy,
}

/// title insurance premium schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleInsurancePolicy {
    pub minimum_premium: Money,
    pub premium_rate: Rate,
    /// insurance premium tax uplift applied on top of the premium
    pub ipt_multiplier: Decimal,
    /// loans above this are not covered
    pub maximum_gross: Money,
}

/// structural caps on gross loan size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapPolicy {
    /// combined first + second charge ceiling, percent of property value
    pub second_charge_max_combined_ltv: Decimal,
    /// bridge ltv ceiling when the rate record carries none, percent
    pub default_bridge_max_ltv: Decimal,
}

/// net-to-gross solver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverPolicy {
    pub step: Money,
    pub seed_factor: Decimal,
    pub max_refine_passes: u32,
    pub max_step_iterations: u32,
    /// refine pass accepts an estimate within this of the target
    pub convergence_tolerance: Money,
    /// step loop treats a candidate this close below the target as met
    pub net_tolerance: Money,
    /// overshoot beyond which the decrement loop runs
    pub overshoot_threshold: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            fusion_base_term_months: 24,
            nbp_minimum_fee: Rate::from_percentage(2),
            icr_horizon_months: 24,
            title_insurance: TitleInsurancePolicy::default(),
            caps: CapPolicy::default(),
            solver: SolverPolicy::default(),
        }
    }
}

impl Default for TitleInsurancePolicy {
    fn default() -> Self {
        Self {
            minimum_premium: Money::from_major(392),
            premium_rate: Rate::from_decimal(dec!(0.0013)),
            ipt_multiplier: dec!(1.12),
            maximum_gross: Money::from_major(3_000_000),
        }
    }
}

impl Default for CapPolicy {
    fn default() -> Self {
        Self {
            second_charge_max_combined_ltv: dec!(70),
            default_bridge_max_ltv: dec!(75),
        }
    }
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            step: Money::from_major(1_000),
            seed_factor: dec!(1.15),
            max_refine_passes: 10,
            max_step_iterations: 200,
            convergence_tolerance: Money::ONE,
            net_tolerance: Money::from_minor(50),
            overshoot_threshold: Money::from_major(500),
        }
    }
}

impl PricingPolicy {
    /// load a policy from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: PricingPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// reject settings the solver or caps cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.solver.step.is_positive() {
            return Err(PricingError::InvalidConfiguration {
                message: format!("solver step must be positive, got {}", self.solver.step),
            });
        }

        if self.solver.max_refine_passes == 0 || self.solver.max_step_iterations == 0 {
            return Err(PricingError::InvalidConfiguration {
                message: "solver iteration bounds must be non-zero".to_string(),
            });
        }

        if self.solver.seed_factor <= Decimal::ZERO {
            return Err(PricingError::InvalidConfiguration {
                message: format!("seed factor must be positive, got {}", self.solver.seed_factor),
            });
        }

        for (name, pct) in [
            ("second charge combined ltv", self.caps.second_charge_max_combined_ltv),
            ("default bridge max ltv", self.caps.default_bridge_max_ltv),
        ] {
            if pct <= Decimal::ZERO || pct > dec!(100) {
                return Err(PricingError::InvalidConfiguration {
                    message: format!("{} must be within (0, 100], got {}", name, pct),
                });
            }
        }

        if self.fusion_base_term_months == 0 {
            return Err(PricingError::InvalidConfiguration {
                message: "fusion base term must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
