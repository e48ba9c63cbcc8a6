//! Random trade repositories for benchmarks and demos.
//!
//! Generates a reference registry, a set of repositories drawing from the
//! same trade population (so that repositories overlap and produce
//! duplicates), and a share of trades whose counterparty is unknown to the
//! registry.

use crate::core::entity::{EntityRegistry, Lei, ReferenceEntity};
use crate::core::error::{PipelineError, Result};
use crate::core::index::IndexName;
use crate::core::trade::{Side, TradeRecord, TradeSet};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Configuration for a generated market.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Number of registered entities.
    pub entity_count: usize,
    pub countries: Vec<String>,
    pub indices: Vec<IndexName>,
    /// Distinct trades in the population.
    pub trade_count: usize,
    /// Repositories the population is spread across.
    pub repository_count: usize,
    /// Probability that a trade is reported to a second repository as well.
    pub duplicate_rate: f64,
    /// Probability that the other party's LEI is missing from the registry.
    pub unknown_lei_rate: f64,
    pub min_notional: u64,
    pub max_notional: u64,
    /// Fixed rates are drawn in [-max_rate_bp, max_rate_bp] basis points.
    pub max_rate_bp: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            entity_count: 20,
            countries: ["FR", "DE", "IT", "ES", "NL", "GB"].iter().map(|c| c.to_string()).collect(),
            indices: vec![IndexName::new("EONIA"), IndexName::new("LIBOR")],
            trade_count: 200,
            repository_count: 2,
            duplicate_rate: 0.05,
            unknown_lei_rate: 0.02,
            min_notional: 100_000,
            max_notional: 50_000_000,
            max_rate_bp: 300,
        }
    }
}

/// A generated market: repositories plus their registry.
#[derive(Debug, Clone)]
pub struct SampleMarket {
    pub repositories: Vec<TradeSet>,
    pub registry: EntityRegistry,
}

fn generated_lei(rng: &mut impl Rng) -> Lei {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let id: String = (0..20)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    Lei::new(id)
}

/// Generate a random market.
pub fn generate_market(config: &MarketConfig) -> Result<SampleMarket> {
    if config.countries.is_empty() || config.indices.is_empty() {
        return Err(PipelineError::configuration(
            "sample market needs at least one country and one index",
        ));
    }
    let mut rng = rand::thread_rng();

    let entities: Vec<ReferenceEntity> = (0..config.entity_count)
        .map(|i| {
            let country = &config.countries[i % config.countries.len()];
            ReferenceEntity::new(generated_lei(&mut rng), format!("ENTITY-{:03}", i), country.as_str())
        })
        .collect();
    let registry = EntityRegistry::from_entities(entities)?;

    let repository_count = config.repository_count.max(1);
    let mut repositories = vec![TradeSet::new(); repository_count];

    for _ in 0..config.trade_count {
        let picked: Vec<&ReferenceEntity> = registry.entities().choose_multiple(&mut rng, 2).collect();
        let (rptg, othr) = match picked.as_slice() {
            [a, b] => (a.lei.clone(), b.lei.clone()),
            _ => break,
        };
        let othr = if rng.gen_bool(config.unknown_lei_rate) {
            generated_lei(&mut rng)
        } else {
            othr
        };

        let notional = Decimal::from(rng.gen_range(config.min_notional..=config.max_notional));
        let fxd = Decimal::new(rng.gen_range(-config.max_rate_bp..=config.max_rate_bp), 4);
        let side = if rng.gen_bool(0.5) { Side::Buyer } else { Side::Seller };
        let flt = config.indices[rng.gen_range(0..config.indices.len())].clone();

        let trade = TradeRecord::new(Uuid::new_v4().to_string(), rptg, othr, notional, side, fxd, flt);

        let home = rng.gen_range(0..repository_count);
        if repository_count > 1 && rng.gen_bool(config.duplicate_rate) {
            let other = (home + rng.gen_range(1..repository_count)) % repository_count;
            repositories[other].add(trade.clone());
        }
        repositories[home].add(trade);
    }

    Ok(SampleMarket {
        repositories,
        registry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::loader::{read_registry, read_trades};
    use crate::io::writer::{write_registry, write_trades};

    #[test]
    fn test_generated_market_shape() {
        let config = MarketConfig {
            trade_count: 100,
            ..Default::default()
        };
        let market = generate_market(&config).unwrap();
        assert_eq!(market.registry.len(), 20);
        assert_eq!(market.repositories.len(), 2);

        let total: usize = market.repositories.iter().map(TradeSet::len).sum();
        assert!(total >= 100);
        for repo in &market.repositories {
            for t in repo.trades() {
                assert!(t.notional >= Decimal::from(config.min_notional));
                assert_ne!(t.lei_rptg, t.lei_othr);
            }
        }
    }

    #[test]
    fn test_csv_round_trip_through_loader() {
        let market = generate_market(&MarketConfig {
            trade_count: 20,
            ..Default::default()
        })
        .unwrap();

        let mut buf = Vec::new();
        write_trades(&market.repositories[0], &mut buf, "TR1.csv").unwrap();
        let reread = read_trades(buf.as_slice(), "TR1.csv").unwrap();
        assert_eq!(reread.trades(), market.repositories[0].trades());

        let mut buf = Vec::new();
        write_registry(&market.registry, &mut buf, "GLEIF.csv").unwrap();
        let registry = read_registry(buf.as_slice(), "GLEIF.csv").unwrap();
        assert_eq!(registry.entities(), market.registry.entities());
    }
}
