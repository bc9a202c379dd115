//! Forward propagation of historical changes.
//!
//! When raw data changes on a past date, every IRR dated on or after that
//! date was computed from a cash-flow history that has now changed. The
//! propagator walks the affected dates oldest-first and re-derives each one.

use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::cascade_model::{CascadeMutation, DateOutcome, PropagationReport};
use super::completeness::CompletenessChecker;
use super::recompute::Recomputer;
use crate::errors::Result;
use crate::irr::IrrRepositoryTrait;
use crate::valuations::ValuationRepositoryTrait;

pub struct HistoricalPropagator {
    valuation_repository: Arc<dyn ValuationRepositoryTrait>,
    irr_repository: Arc<dyn IrrRepositoryTrait>,
    checker: CompletenessChecker,
    recomputer: Recomputer,
}

impl HistoricalPropagator {
    pub(crate) fn new(
        valuation_repository: Arc<dyn ValuationRepositoryTrait>,
        irr_repository: Arc<dyn IrrRepositoryTrait>,
        checker: CompletenessChecker,
        recomputer: Recomputer,
    ) -> Self {
        Self {
            valuation_repository,
            irr_repository,
            checker,
            recomputer,
        }
    }

    /// Distinct dates on or after `from` that currently carry any fund
    /// valuation, portfolio valuation, or IRR value for the portfolio -
    /// the frontier needing recomputation, ascending.
    fn gather_frontier(&self, portfolio_id: &str, from: NaiveDate) -> Result<Vec<NaiveDate>> {
        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
        dates.extend(
            self.valuation_repository
                .get_fund_valuation_dates_from(portfolio_id, from)?,
        );
        dates.extend(
            self.valuation_repository
                .get_portfolio_valuation_dates_from(portfolio_id, from)?,
        );
        dates.extend(self.irr_repository.get_irr_dates_from(portfolio_id, from)?);
        Ok(dates.into_iter().collect())
    }

    /// Re-derives every date ≥ `from` in ascending order, pushing the write
    /// set onto `mutations`. Ascending order matters: later IRRs are
    /// path-dependent on the cumulative cash-flow history, so an
    /// out-of-order walk could leave a later date derived against state that
    /// a failed earlier step never refreshed.
    pub(crate) fn propagate_from(
        &self,
        portfolio_id: &str,
        from: NaiveDate,
        mutations: &mut Vec<CascadeMutation>,
    ) -> Result<PropagationReport> {
        let frontier = self.gather_frontier(portfolio_id, from)?;
        debug!(
            "Propagating portfolio {} from {}: {} date(s) to revisit",
            portfolio_id,
            from,
            frontier.len()
        );

        let mut report = PropagationReport::new(portfolio_id, from);
        for date in frontier {
            let view = self.checker.check(portfolio_id, date)?;

            // Fund level first: recompute every active fund valued on this
            // date, in a stable order.
            let mut valued_active: Vec<&String> = view
                .active
                .iter()
                .filter(|fund_id| view.valued.contains(*fund_id))
                .collect();
            valued_active.sort();
            let recomputed_funds = !valued_active.is_empty();
            for fund_id in valued_active {
                self.recomputer.fund_irr(fund_id, date, mutations)?;
            }

            let portfolio = self
                .recomputer
                .portfolio_level(portfolio_id, date, &view, mutations)?;

            let outcome = if portfolio.complete {
                DateOutcome::Recomputed
            } else if portfolio.valuation_deleted || portfolio.irr_deleted {
                DateOutcome::DeletedIncomplete
            } else if recomputed_funds {
                DateOutcome::Recomputed
            } else {
                DateOutcome::SkippedNoData
            };
            report.outcomes.push((date, outcome));
        }
        Ok(report)
    }
}
