use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};

/// loan to value as a percentage, zero for a non-positive valuation
pub fn ltv_percent(exposure: Money, property_value: Money) -> Decimal {
    exposure.ratio_percent(property_value)
}

/// net proceeds to borrower: net plus the larger of the fee floor and arrangement fee
pub fn net_proceeds(net: Money, gross: Money, arrangement_fee: Money, minimum_fee: Rate) -> Money {
    net + gross.portion(minimum_fee).max(arrangement_fee)
}

/// annualised all-in cost of credit, in percent
///
/// Zero when net or term is zero, since the ratio is undefined there.
pub fn aprc(gross: Money, total_interest: Money, net: Money, term_months: u32) -> Decimal {
    if !net.is_positive() || term_months == 0 {
        return Decimal::ZERO;
    }

    let years = Decimal::from(term_months) / Decimal::from(12);
    let cost_ratio = (gross + total_interest).as_decimal() / net.as_decimal() - Decimal::ONE;
    cost_ratio / years * Decimal::from(100)
}

/// interest coverage ratio in percent
///
/// Compares income over the horizon with the serviced-rate interest over
/// the same horizon, less interest already rolled up front.
pub fn interest_coverage(
    monthly_income: Money,
    serviced_annual_rate: Rate,
    gross: Money,
    rolled_interest: Money,
    horizon_months: u32,
) -> Option<Decimal> {
    if !monthly_income.is_positive() || horizon_months == 0 {
        return None;
    }

    let horizon = Decimal::from(horizon_months);
    let income = monthly_income.as_decimal() * horizon;
    let interest = serviced_annual_rate.as_decimal() * gross.as_decimal() * horizon / Decimal::from(12)
        - rolled_interest.as_decimal();

    if interest <= Decimal::ZERO {
        return None;
    }

    Some(income / interest * Decimal::from(100))
}
