/// net to gross - solve for the gross that delivers a target net advance
use bridge_pricer::{LoanSolver, LoanRequest, Money, PricingPolicy, ProductKind, Rate, RateRecord};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let solver = LoanSolver::new(PricingPolicy::default())?;

    let record = RateRecord {
        rate: dec!(6.25),
        max_ltv: Some(dec!(75)),
        max_deferred_rate: Some(dec!(3)),
        product: Some("Fusion Core".to_string()),
        ..Default::default()
    };

    println!("=== fusion, borrower needs £400,000 net ===\n");
    let request = LoanRequest::builder()
        .product(ProductKind::Fusion)
        .property_value(Money::from_major(750_000))
        .specific_net_loan(Money::from_major(400_000))
        .term_months(24)
        .rolled_months(6)
        .deferred_rate(Rate::from_percentage(2))
        .base_rate(Rate::from_percentage(4))
        .arrangement_fee(Rate::from_percentage(2))
        .monthly_rent(Money::from_major(3_200))
        .build()?;

    let result = solver.price(&request, &record);
    println!("  gross: £{}", result.gross);
    println!("  net: £{}", result.net.round_dp(2));
    println!("  ltv: {:.2}% ({:?})", result.ltv.gross, result.ltv.bucket);
    println!("  aprc: {:.2}%", result.aprc);
    println!(
        "  icr: {}",
        result.icr.map(|icr| format!("{:.1}%", icr)).unwrap_or("n/a".to_string())
    );
    println!("  outcome: {:?} after {} refine passes", result.solve.outcome, result.solve.refine_passes);

    println!("\n=== second charge that cannot reach the target ===\n");
    let request = LoanRequest::builder()
        .product(ProductKind::FixedBridge)
        .property_value(Money::from_major(500_000))
        .specific_net_loan(Money::from_major(200_000))
        .term_months(12)
        .rolled_months(12)
        .arrangement_fee(Rate::from_percentage(2))
        .second_charge(Money::from_major(200_000))
        .build()?;

    let result = solver.price(&request, &RateRecord::with_rate(dec!(0.85)));
    println!("  gross: £{} (capped: {})", result.gross, result.is_capped());
    println!("  net: £{}", result.net.round_dp(2));
    println!("  combined ltv: {:.1}%", result.ltv.combined.unwrap_or_default());
    println!("  outcome: {:?}", result.solve.outcome);

    Ok(())
}
