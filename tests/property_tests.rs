use exposure_engine::aggregation::exposure::{ExposureAggregator, ExposureRequest, Granularity};
use exposure_engine::core::entity::{EntityRegistry, ReferenceEntity};
use exposure_engine::core::trade::{Side, TradeRecord, TradeSet};
use exposure_engine::reconciliation::dedup::deduplicate;
use exposure_engine::reconciliation::legs::adjusted_fixed_rate;
use exposure_engine::pipeline::Pipeline;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// Registered LEIs; "U" is deliberately missing from the registry.
fn registry() -> EntityRegistry {
    EntityRegistry::from_entities(vec![
        ReferenceEntity::new("A", "Alpha", "FR"),
        ReferenceEntity::new("B", "Beta", "DE"),
        ReferenceEntity::new("C", "Gamma", "FR"),
        ReferenceEntity::new("D", "Delta", "IT"),
        ReferenceEntity::new("E", "Epsilon", "DE"),
    ])
    .unwrap()
}

fn arb_lei() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["A", "B", "C", "D", "E", "U"])
}

fn arb_index() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["EONIA", "LIBOR", "ESTR"])
}

/// Notional 0 to 10,000,000.
fn arb_notional() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000u64).prop_map(Decimal::from)
}

/// Fixed rate between -5% and 5%, in basis points.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (-500i64..=500i64).prop_map(|bp| Decimal::new(bp, 4))
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buyer), Just(Side::Seller)]
}

/// UTIs drawn from a small pool so that duplicates are common.
fn arb_trade() -> impl Strategy<Value = TradeRecord> {
    (0u32..30, arb_lei(), arb_lei(), arb_notional(), arb_side(), arb_rate(), arb_index()).prop_map(
        |(uti, rptg, othr, notional, side, fxd, flt)| {
            TradeRecord::new(uti.to_string(), rptg, othr, notional, side, fxd, flt)
        },
    )
}

fn arb_trade_set() -> impl Strategy<Value = TradeSet> {
    prop::collection::vec(arb_trade(), 0..40).prop_map(|v| v.into_iter().collect::<TradeSet>())
}

fn arb_repositories() -> impl Strategy<Value = Vec<TradeSet>> {
    prop::collection::vec(arb_trade_set(), 1..4)
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Deduplicated output never repeats a UTI, and
    // deduplicating it again changes nothing.
    // ===================================================================
    #[test]
    fn dedup_unique_and_idempotent(repos in arb_repositories()) {
        let once = deduplicate(repos).unwrap();
        prop_assert!(once.trades.has_unique_utis());

        let twice = deduplicate(vec![once.trades.clone()]).unwrap();
        prop_assert_eq!(once.trades.trades(), twice.trades.trades());
        prop_assert_eq!(twice.report.duplicated_count(), 0);
    }

    // ===================================================================
    // INVARIANT 2: The first occurrence of each UTI is the one kept.
    // ===================================================================
    #[test]
    fn dedup_keeps_first_occurrence(repos in arb_repositories()) {
        let mut first = BTreeMap::new();
        for trade in repos.iter().flat_map(|r| r.trades()) {
            first.entry(trade.uti.clone()).or_insert_with(|| trade.clone());
        }
        let out = deduplicate(repos).unwrap();
        prop_assert_eq!(out.trades.len(), first.len());
        for trade in out.trades.trades() {
            prop_assert_eq!(trade, &first[&trade.uti]);
        }
    }

    // ===================================================================
    // INVARIANT 3: Each reconciled trade yields one Buyer and one Seller
    // leg with the same UTI, notional and index. The buyer-side
    // correction flips the sign only for buyer reports with fxd < 0.
    // ===================================================================
    #[test]
    fn legs_conserve_notional(repos in arb_repositories()) {
        let out = Pipeline::run(repos, &[registry()]).unwrap();
        prop_assert_eq!(out.legs.buyer().len(), out.reconciled.len());
        prop_assert_eq!(out.legs.seller().len(), out.reconciled.len());

        for ((buyer, seller), trade) in out.legs.pairs().zip(out.reconciled.trades()) {
            prop_assert_eq!(&buyer.uti, &trade.uti);
            prop_assert_eq!(&seller.uti, &trade.uti);
            prop_assert_eq!(buyer.notional, seller.notional);
            prop_assert_eq!(&buyer.index, &seller.index);
            prop_assert_eq!(buyer.cash_flow + seller.cash_flow, Decimal::ZERO);

            let rate = adjusted_fixed_rate(trade.side, trade.fxd);
            match trade.side {
                Side::Buyer => {
                    prop_assert_eq!(&buyer.lei, &trade.rptg.lei);
                    prop_assert!(rate >= Decimal::ZERO);
                    prop_assert_eq!(buyer.cash_flow, trade.notional * trade.fxd.abs());
                }
                Side::Seller => {
                    prop_assert_eq!(&seller.lei, &trade.rptg.lei);
                    prop_assert_eq!(rate, trade.fxd);
                    prop_assert_eq!(seller.cash_flow, trade.notional * trade.fxd);
                }
            }
        }
    }

    // ===================================================================
    // INVARIANT 4: Only trades with both LEIs registered survive.
    // ===================================================================
    #[test]
    fn unresolved_trades_dropped(repos in arb_repositories()) {
        let out = Pipeline::run(repos, &[registry()]).unwrap();
        for trade in out.reconciled.trades() {
            prop_assert_ne!(trade.rptg.lei.as_str(), "U");
            prop_assert_ne!(trade.othr.lei.as_str(), "U");
        }
        let legs: HashSet<_> = out.legs.buyer().iter().map(|l| l.lei.as_str()).collect();
        prop_assert!(!legs.contains("U"));
    }

    // ===================================================================
    // INVARIANT 5: Zero gross gives a ratio of exactly zero; otherwise
    // ratio = net / gross.
    // ===================================================================
    #[test]
    fn ratio_defined_everywhere(repos in arb_repositories()) {
        let out = Pipeline::run(repos, &[registry()]).unwrap();
        prop_assume!(!out.legs.is_empty());
        let request = ExposureRequest::new(["EONIA", "LIBOR", "ESTR"]).unwrap();
        let table = ExposureAggregator::aggregate(&out.legs, &request).unwrap();
        for row in table.rows() {
            if row.gross_exposure == Decimal::ZERO {
                prop_assert_eq!(row.ratio, Decimal::ZERO);
            } else {
                prop_assert_eq!(row.ratio, row.net_exposure / row.gross_exposure);
            }
        }
    }

    // ===================================================================
    // INVARIANT 6: Entity-level rows summed per (Country, Index) equal
    // the country-level rows.
    // ===================================================================
    #[test]
    fn granularity_equivalence(repos in arb_repositories()) {
        let out = Pipeline::run(repos, &[registry()]).unwrap();
        prop_assume!(!out.legs.is_empty());
        let request = ExposureRequest::new(["EONIA", "LIBOR"]).unwrap();
        let country = out.exposures(&request).unwrap();
        let entity = out.exposures(&request.clone().with_granularity(Granularity::Entity)).unwrap();

        let mut summed: BTreeMap<(String, String), (Decimal, Decimal, Decimal)> = BTreeMap::new();
        for row in entity.rows() {
            let e = summed
                .entry((row.key.country.clone(), row.key.index.to_string()))
                .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
            e.0 += row.gross_exposure;
            e.1 += row.net_exposure;
            e.2 += row.cash_flow;
        }
        prop_assert_eq!(summed.len(), country.len());
        for row in country.rows() {
            let (gross, net, cash_flow) = summed[&(row.key.country.clone(), row.key.index.to_string())];
            prop_assert_eq!(gross, row.gross_exposure);
            prop_assert_eq!(net, row.net_exposure);
            prop_assert_eq!(cash_flow, row.cash_flow);
        }
    }

    // ===================================================================
    // INVARIANT 7: Gross over all groups is twice the filtered notional:
    // every trade contributes its notional once per side.
    // ===================================================================
    #[test]
    fn gross_counts_both_sides(repos in arb_repositories()) {
        let out = Pipeline::run(repos, &[registry()]).unwrap();
        prop_assume!(!out.legs.is_empty());
        let request = ExposureRequest::new(["EONIA"]).unwrap();
        let table = out.exposures(&request).unwrap();
        let notional: Decimal = out
            .reconciled
            .trades()
            .iter()
            .filter(|t| t.flt.as_str() == "EONIA")
            .map(|t| t.notional)
            .sum();
        let gross: Decimal = table.rows().iter().map(|r| r.gross_exposure).sum();
        prop_assert_eq!(gross, notional * Decimal::from(2));
    }
}
