//! End-to-end run: deduplicate, enrich, split.
//!
//! [`Pipeline::run`] does the reconciliation once; the returned
//! [`PipelineOutput`] can then be aggregated any number of times with
//! different [`ExposureRequest`]s.

use crate::aggregation::exposure::{ExposureAggregator, ExposureRequest, ExposureTable, Granularity};
use crate::core::entity::EntityRegistry;
use crate::core::error::Result;
use crate::core::leg::LegBook;
use crate::core::trade::TradeSet;
use crate::reconciliation::dedup::{self, DuplicateReport};
use crate::reconciliation::enrichment::{self, ReconciledBook};
use crate::reconciliation::legs;

/// Everything derived from one set of inputs.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub duplicates: DuplicateReport,
    pub reconciled: ReconciledBook,
    pub legs: LegBook,
}

impl PipelineOutput {
    pub fn exposures(&self, request: &ExposureRequest) -> Result<ExposureTable> {
        ExposureAggregator::aggregate(&self.legs, request)
    }

    /// Country-level and entity-level tables for the same indices.
    pub fn exposures_both(&self, request: &ExposureRequest) -> Result<(ExposureTable, ExposureTable)> {
        let country = self.exposures(&request.clone().with_granularity(Granularity::Country))?;
        let entity = self.exposures(&request.clone().with_granularity(Granularity::Entity))?;
        Ok((country, entity))
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Reconcile trade repositories against the reference registry.
    ///
    /// # Errors
    ///
    /// Configuration errors when no repository or not exactly one registry
    /// is supplied; an overflow error when a cash flow is out of range.
    pub fn run(trade_sets: Vec<TradeSet>, registries: &[EntityRegistry]) -> Result<PipelineOutput> {
        let deduplicated = dedup::deduplicate(trade_sets)?;
        let reconciled = enrichment::enrich(&deduplicated.trades, registries)?;
        let legs = legs::split(&reconciled)?;
        Ok(PipelineOutput {
            duplicates: deduplicated.report,
            reconciled,
            legs,
        })
    }

    /// Run the pipeline and aggregate once.
    pub fn exposures(
        trade_sets: Vec<TradeSet>,
        registries: &[EntityRegistry],
        request: &ExposureRequest,
    ) -> Result<ExposureTable> {
        Self::run(trade_sets, registries)?.exposures(request)
    }
}
