//! Service and write-repository traits for the cascade engine.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::cascade_model::{CascadeMutation, CascadeReport, DeletionSummary, PropagationReport};
use crate::errors::Result;

/// Atomic sink for derived-state mutations.
///
/// `commit` applies the batch in order inside one transaction: either every
/// mutation is persisted or none are. This is the only write path for fund
/// IRRs, portfolio valuations and portfolio IRRs, and the only delete path
/// for fund valuations.
#[async_trait]
pub trait CascadeWriteRepositoryTrait: Send + Sync {
    async fn commit(&self, mutations: Vec<CascadeMutation>) -> Result<()>;
}

/// The cascade engine's contract towards the CRUD/API layer.
///
/// These four handlers are the only place derived IRR data is created or
/// destroyed. Operations on the same portfolio are serialized; operations on
/// distinct portfolios may run concurrently.
#[async_trait]
pub trait CascadeServiceTrait: Send + Sync {
    /// A fund valuation is being deleted. Removes the valuation together with
    /// its fund IRR, and tears down the portfolio valuation and IRR for the
    /// date if the portfolio is no longer complete. Idempotent: an already
    /// deleted valuation yields an empty summary.
    async fn on_fund_valuation_deleted(&self, valuation_id: &str) -> Result<DeletionSummary>;

    /// A fund valuation was created or edited. Recomputes the fund IRR, then
    /// the completeness-gated portfolio valuation and IRR, and propagates
    /// forward when `date` lies before the portfolio's latest data.
    async fn on_fund_valuation_upserted(
        &self,
        portfolio_fund_id: &str,
        date: NaiveDate,
    ) -> Result<CascadeReport>;

    /// A batch of activities changed. Every IRR on or after the earliest
    /// affected date is stale (IRR is a function of the whole cash-flow
    /// history up to its date), so this propagates forward from
    /// `min(affected_dates)`.
    async fn on_activities_changed(
        &self,
        portfolio_id: &str,
        affected_dates: &[NaiveDate],
    ) -> Result<PropagationReport>;

    /// Direct entry point for callers that already know the cut-over date.
    async fn on_historical_edit(
        &self,
        portfolio_id: &str,
        from_date: NaiveDate,
    ) -> Result<PropagationReport>;
}
