//! # exposure-engine
//!
//! Trade repository reconciliation and floating-index exposure aggregation.
//!
//! Derivative trades reported by several trade repositories are merged,
//! resolved against an LEI reference registry, split into Buyer and Seller
//! legs, and aggregated into gross exposure, net exposure, cash flow and
//! net/gross ratio per country or per entity.
//!
//! ## Architecture
//!
//! - **core**: Foundational types: trades, reference entities, legs, errors
//! - **reconciliation**: Deduplication, reference enrichment, leg splitting
//! - **aggregation**: Exposure aggregation and top/bottom ranking
//! - **pipeline**: One-call entry point chaining the stages
//! - **io**: Config file, input file discovery, CSV loading
//! - **simulation**: Random repositories for benchmarks and demos

pub mod aggregation;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod reconciliation;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregation::exposure::{
        ExposureAggregate, ExposureAggregator, ExposureRequest, ExposureTable, Granularity,
    };
    pub use crate::aggregation::ranking::{rank, RankBy, RankOrder, RankQuery};
    pub use crate::core::entity::{EntityRegistry, Lei, ReferenceEntity};
    pub use crate::core::error::PipelineError;
    pub use crate::core::index::IndexName;
    pub use crate::core::leg::{Leg, LegBook, Position};
    pub use crate::core::trade::{Side, TradeRecord, TradeSet, Uti};
    pub use crate::pipeline::{Pipeline, PipelineOutput};
}
