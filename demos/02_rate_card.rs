/// rate card - price one request against every row of a card at once
use bridge_pricer::{LoanSolver, LoanRequest, LtvRateGrid, Money, ProductKind, Rate, RateRecord};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let request = LoanRequest::builder()
        .product(ProductKind::FixedBridge)
        .property_value(Money::from_major(900_000))
        .gross_loan(Money::from_major(600_000))
        .term_months(12)
        .rolled_months(6)
        .arrangement_fee(Rate::from_percentage(2))
        .proc_fee(Rate::from_percent(dec!(0.5)))
        .build()?;

    let card = vec![
        RateRecord {
            rate: dec!(0.79),
            product: Some("Light refurb".to_string()),
            ..Default::default()
        },
        RateRecord {
            rate: dec!(0.89),
            ltv_rates: Some(LtvRateGrid {
                ltv60: Some(dec!(0.79)),
                ltv70: Some(dec!(0.89)),
                ltv75: Some(dec!(0.99)),
            }),
            product: Some("Tiered".to_string()),
            ..Default::default()
        },
        RateRecord {
            rate: dec!(0.95),
            min_loan: Some(Money::from_major(1_000_000)),
            product: Some("Large loan".to_string()),
            ..Default::default()
        },
    ];

    let solver = LoanSolver::default();
    for (record, result) in card.iter().zip(solver.price_rate_card(&request, &card)) {
        println!(
            "{:<14} rate {}%/m  net £{:>12}  aprc {:>6.2}%  warnings {}",
            record.product.as_deref().unwrap_or("-"),
            result.rates.nominal,
            result.net.round_dp(2),
            result.aprc,
            result.warnings.len()
        );
    }

    Ok(())
}
