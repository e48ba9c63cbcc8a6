//! Country and entity exposure to EONIA from two trade repositories.
//!
//! Demonstrates deduplication across repositories, LEI enrichment,
//! the Buyer/Seller leg split and exposure aggregation.

use exposure_engine::aggregation::exposure::{ExposureRequest, Granularity};
use exposure_engine::aggregation::ranking::{rank, RankBy, RankQuery};
use exposure_engine::core::entity::{EntityRegistry, ReferenceEntity};
use exposure_engine::core::trade::{Side, TradeRecord, TradeSet};
use exposure_engine::pipeline::Pipeline;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  exposure-engine: EONIA Exposure Example     ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let registry = EntityRegistry::from_entities(vec![
        ReferenceEntity::new("969500BNP0000000000A", "BNP Paribas", "FR"),
        ReferenceEntity::new("529900DBK0000000000B", "Deutsche Bank", "DE"),
        ReferenceEntity::new("815600UCG0000000000C", "UniCredit", "IT"),
        ReferenceEntity::new("969500SOG0000000000D", "Societe Generale", "FR"),
    ])
    .expect("registry LEIs are unique");

    // --- Repository 1 ---
    let tr1: TradeSet = vec![
        TradeRecord::new(
            "UTI-001",
            "969500BNP0000000000A",
            "529900DBK0000000000B",
            dec!(250_000_000),
            Side::Buyer,
            dec!(-0.0035),
            "EONIA",
        ),
        TradeRecord::new(
            "UTI-002",
            "529900DBK0000000000B",
            "815600UCG0000000000C",
            dec!(120_000_000),
            Side::Seller,
            dec!(0.0012),
            "EONIA",
        ),
    ]
    .into_iter()
    .collect();

    // --- Repository 2: repeats UTI-002 and reports an unregistered LEI ---
    let tr2: TradeSet = vec![
        TradeRecord::new(
            "UTI-002",
            "529900DBK0000000000B",
            "815600UCG0000000000C",
            dec!(120_000_000),
            Side::Seller,
            dec!(0.0012),
            "EONIA",
        ),
        TradeRecord::new(
            "UTI-003",
            "969500SOG0000000000D",
            "815600UCG0000000000C",
            dec!(80_000_000),
            Side::Buyer,
            dec!(0.0020),
            "EONIA",
        ),
        TradeRecord::new(
            "UTI-004",
            "969500SOG0000000000D",
            "UNREGISTERED00000000",
            dec!(40_000_000),
            Side::Seller,
            dec!(0.0008),
            "EONIA",
        ),
        TradeRecord::new(
            "UTI-005",
            "815600UCG0000000000C",
            "969500BNP0000000000A",
            dec!(60_000_000),
            Side::Buyer,
            dec!(0.0150),
            "LIBOR",
        ),
    ]
    .into_iter()
    .collect();

    let output = Pipeline::run(vec![tr1, tr2], &[registry]).expect("pipeline inputs are valid");

    println!("━━━ Reconciliation ━━━\n");
    println!("Records in:          {}", output.duplicates.records_in);
    println!("Duplicated UTIs:     {}", output.duplicates.duplicated_count());
    println!("Reconciled trades:   {}", output.reconciled.len());
    println!();

    println!("━━━ Legs ━━━\n");
    for (buyer, seller) in output.legs.pairs() {
        println!(
            "  {:<8} {:<18} {:>14}  |  {:<18} {:>14}",
            buyer.uti.as_str(), buyer.name, buyer.cash_flow, seller.name, seller.cash_flow
        );
    }
    println!();

    let request = ExposureRequest::new(["EONIA"]).expect("index set is not empty");
    let (country, entity) = output
        .exposures_both(&request)
        .expect("legs are not empty");

    println!("{}", country);
    println!("{}", entity);

    println!("━━━ Highest Net/Gross Ratio ━━━\n");
    for row in rank(&entity, &RankQuery::top("EONIA", 2)) {
        println!("  {:<40} {:>8.2}%", row.key, row.ratio_percent());
    }
    println!();

    println!("━━━ Lowest Cash Flow ━━━\n");
    let lowest = rank(
        &country,
        &RankQuery::bottom("EONIA", 1).by(RankBy::CashFlow),
    );
    for row in lowest {
        println!("  {:<40} {:>14}", row.key, row.cash_flow);
    }

    let entity_rows = output
        .exposures(&request.with_granularity(Granularity::Entity))
        .map(|t| t.len())
        .unwrap_or(0);
    println!("\n{} entity rows, {} country rows", entity_rows, country.len());
}
