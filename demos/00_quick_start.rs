/// quick start - price a variable-rate bridge for a known gross loan
use bridge_pricer::{price, LoanRequest, Money, ProductKind, Rate, RateRecord};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // £300,000 against a £500,000 property, 3 months rolled
    let request = LoanRequest::builder()
        .product(ProductKind::VariableBridge)
        .property_value(Money::from_major(500_000))
        .gross_loan(Money::from_major(300_000))
        .term_months(12)
        .rolled_months(3)
        .base_rate(Rate::from_percentage(4))
        .arrangement_fee(Rate::from_percentage(2))
        .build()?;

    let record = RateRecord::with_rate(dec!(0.55));

    let result = price(&request, &record);
    println!("{}", result.to_json_pretty()?);

    Ok(())
}
