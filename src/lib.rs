pub mod caps;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod pricing;
pub mod rates;
pub mod request;
pub mod result;
pub mod solver;
pub mod types;

// re-export key types
pub use caps::{CapContext, CapEnforcer, CapLimit, CapOutcome};
pub use config::{CapPolicy, PricingPolicy, SolverPolicy, TitleInsurancePolicy};
pub use decimal::{Money, Rate};
pub use engine::{price, LoanSolver};
pub use errors::{PricingError, Result};
pub use pricing::{FeeBreakdown, ForwardPricer, InterestBreakdown};
pub use rates::{LtvRateGrid, RateRecord, RateResolver, ResolvedRate};
pub use request::{LoanRequest, LoanRequestBuilder};
pub use result::{EarlyRepaymentCharges, LtvView, PricingResult, RateView, SolveReport};
pub use solver::{InverseSolver, Solution};
pub use types::{
    BrokerClientFee, CapRule, LoanAmount, LtvBucket, PricingWarning, ProductKind, SecondCharge,
    SolveOutcome,
};

// re-export external dependencies that users will need
pub use rust_decimal::Decimal;
