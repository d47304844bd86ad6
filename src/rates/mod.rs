pub mod record;
pub mod resolver;

pub use record::{LtvRateGrid, RateRecord};
pub use resolver::{RateResolver, ResolvedRate};
