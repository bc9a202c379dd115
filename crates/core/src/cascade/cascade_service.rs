//! The cascade orchestrator.
//!
//! Receives mutation events from the CRUD layer, works out which derived
//! records are now stale, and rebuilds or removes them. Fund-level work for a
//! date always precedes the portfolio-level completeness check and
//! recomputation for that date, and each handler commits its entire write set
//! atomically through the cascade write repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::cascade_model::{CascadeMutation, CascadeReport, DeletionSummary, PropagationReport};
use super::cascade_traits::{CascadeServiceTrait, CascadeWriteRepositoryTrait};
use super::completeness::CompletenessChecker;
use super::propagator::HistoricalPropagator;
use super::recompute::Recomputer;
use crate::activities::ActivityRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::irr::{IrrCalculatorTrait, IrrRepositoryTrait};
use crate::portfolios::{PortfolioFund, PortfolioRepositoryTrait};
use crate::valuations::ValuationRepositoryTrait;

pub struct CascadeService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    valuation_repository: Arc<dyn ValuationRepositoryTrait>,
    irr_repository: Arc<dyn IrrRepositoryTrait>,
    cascade_writer: Arc<dyn CascadeWriteRepositoryTrait>,
    checker: CompletenessChecker,
    recomputer: Recomputer,
    propagator: HistoricalPropagator,
    /// One mutex per portfolio: cascades on the same portfolio are
    /// serialized, distinct portfolios proceed in parallel.
    portfolio_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CascadeService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        valuation_repository: Arc<dyn ValuationRepositoryTrait>,
        activity_repository: Arc<dyn ActivityRepositoryTrait>,
        irr_repository: Arc<dyn IrrRepositoryTrait>,
        cascade_writer: Arc<dyn CascadeWriteRepositoryTrait>,
        calculator: Arc<dyn IrrCalculatorTrait>,
    ) -> Self {
        let checker = CompletenessChecker::new(
            portfolio_repository.clone(),
            valuation_repository.clone(),
        );
        let recomputer = Recomputer::new(
            valuation_repository.clone(),
            activity_repository,
            irr_repository.clone(),
            calculator,
        );
        let propagator = HistoricalPropagator::new(
            valuation_repository.clone(),
            irr_repository.clone(),
            checker.clone(),
            recomputer.clone(),
        );
        Self {
            portfolio_repository,
            valuation_repository,
            irr_repository,
            cascade_writer,
            checker,
            recomputer,
            propagator,
            portfolio_locks: DashMap::new(),
        }
    }

    /// The standalone completeness gate, exposed for read-only callers.
    pub fn is_complete(&self, portfolio_id: &str, date: NaiveDate) -> bool {
        self.checker.is_complete(portfolio_id, date)
    }

    async fn lock_portfolio(&self, portfolio_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .portfolio_locks
            .entry(portfolio_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    fn require_fund(&self, portfolio_fund_id: &str) -> Result<PortfolioFund> {
        self.portfolio_repository
            .get_fund(portfolio_fund_id)?
            .ok_or_else(|| Error::NotFound(format!("Portfolio fund {}", portfolio_fund_id)))
    }

    fn require_portfolio(&self, portfolio_id: &str) -> Result<()> {
        self.portfolio_repository
            .get_portfolio(portfolio_id)?
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Portfolio {}", portfolio_id)))
    }
}

#[async_trait]
impl CascadeServiceTrait for CascadeService {
    async fn on_fund_valuation_deleted(&self, valuation_id: &str) -> Result<DeletionSummary> {
        let Some(valuation) = self.valuation_repository.get_fund_valuation(valuation_id)? else {
            debug!(
                "Valuation {} already absent; deletion cascade is a no-op",
                valuation_id
            );
            return Ok(DeletionSummary::empty(valuation_id));
        };
        let fund = self.require_fund(&valuation.portfolio_fund_id)?;
        let date = valuation.valuation_date;

        let _guard = self.lock_portfolio(&fund.portfolio_id).await;

        let mut mutations = Vec::new();
        let fund_irr_deleted = self.irr_repository.get_fund_irr(&fund.id, date)?.is_some();
        mutations.push(CascadeMutation::DeleteFundIrr {
            portfolio_fund_id: fund.id.clone(),
            date,
        });
        mutations.push(CascadeMutation::DeleteFundValuation {
            valuation_id: valuation.id.clone(),
        });

        let mut summary = DeletionSummary {
            valuation_id: valuation.id.clone(),
            fund_irr_deleted,
            fund_valuation_deleted: true,
            portfolio_valuation_deleted: false,
            portfolio_irr_deleted: false,
        };

        // Completeness as it will stand once this valuation is gone.
        let view = self.checker.check(&fund.portfolio_id, date)?;
        if !view.is_complete_without(&fund.id) {
            let torn_down = self.recomputer.tear_down_portfolio_level(
                &fund.portfolio_id,
                date,
                &mut mutations,
            )?;
            summary.portfolio_valuation_deleted = torn_down.valuation_deleted;
            summary.portfolio_irr_deleted = torn_down.irr_deleted;
        }

        self.cascade_writer.commit(mutations).await?;
        info!(
            "Deleted valuation {} for fund {} on {} (fund IRR removed: {}, portfolio records removed: {})",
            valuation.id, fund.id, date, summary.fund_irr_deleted, summary.portfolio_valuation_deleted
        );
        Ok(summary)
    }

    async fn on_fund_valuation_upserted(
        &self,
        portfolio_fund_id: &str,
        date: NaiveDate,
    ) -> Result<CascadeReport> {
        let fund = self.require_fund(portfolio_fund_id)?;
        let portfolio_id = fund.portfolio_id.clone();

        let _guard = self.lock_portfolio(&portfolio_id).await;

        let mut mutations = Vec::new();
        let fund_irr = self.recomputer.fund_irr(&fund.id, date, &mut mutations)?;

        let view = self.checker.check(&portfolio_id, date)?;
        let portfolio = self
            .recomputer
            .portfolio_level(&portfolio_id, date, &view, &mut mutations)?;

        // A change on a past date invalidates everything derived after it.
        let latest = self.valuation_repository.get_latest_valuation_date(&portfolio_id)?;
        let propagation = match (latest, date.succ_opt()) {
            (Some(latest), Some(next)) if date < latest => Some(self.propagator.propagate_from(
                &portfolio_id,
                next,
                &mut mutations,
            )?),
            _ => None,
        };

        self.cascade_writer.commit(mutations).await?;
        debug!(
            "Valuation upsert cascade for fund {} on {}: complete={}, propagated={}",
            fund.id,
            date,
            portfolio.complete,
            propagation.is_some()
        );
        Ok(CascadeReport {
            portfolio_fund_id: fund.id,
            portfolio_id,
            date,
            fund_irr,
            complete: portfolio.complete,
            portfolio_irr: portfolio.irr,
            propagation,
        })
    }

    async fn on_activities_changed(
        &self,
        portfolio_id: &str,
        affected_dates: &[NaiveDate],
    ) -> Result<PropagationReport> {
        let earliest = affected_dates.iter().min().copied().ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(
                "Activity batch must contain at least one affected date".to_string(),
            ))
        })?;
        self.require_portfolio(portfolio_id)?;

        let _guard = self.lock_portfolio(portfolio_id).await;

        let mut mutations = Vec::new();
        let report = self
            .propagator
            .propagate_from(portfolio_id, earliest, &mut mutations)?;
        self.cascade_writer.commit(mutations).await?;
        info!(
            "Activity batch cascade for portfolio {}: {} date(s) revisited from {}",
            portfolio_id,
            report.outcomes.len(),
            earliest
        );
        Ok(report)
    }

    async fn on_historical_edit(
        &self,
        portfolio_id: &str,
        from_date: NaiveDate,
    ) -> Result<PropagationReport> {
        self.require_portfolio(portfolio_id)?;

        let _guard = self.lock_portfolio(portfolio_id).await;

        let mut mutations = Vec::new();
        let report = self
            .propagator
            .propagate_from(portfolio_id, from_date, &mut mutations)?;
        self.cascade_writer.commit(mutations).await?;
        info!(
            "Historical edit cascade for portfolio {}: {} date(s) revisited from {}",
            portfolio_id,
            report.outcomes.len(),
            from_date
        );
        Ok(report)
    }
}
