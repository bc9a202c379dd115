//! Completeness checking: is every active fund valued on a date?

use chrono::NaiveDate;
use log::warn;
use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::Result;
use crate::portfolios::PortfolioRepositoryTrait;
use crate::valuations::ValuationRepositoryTrait;

/// The two fund sets behind a completeness decision for one (portfolio, date).
#[derive(Debug, Clone)]
pub struct CompletenessView {
    /// Funds active on the date.
    pub active: HashSet<String>,
    /// Funds with a valuation recorded for exactly the date.
    pub valued: HashSet<String>,
}

impl CompletenessView {
    /// Complete iff every active fund is valued and there is at least one
    /// active fund. An empty active set is incomplete: no portfolio IRR can
    /// be derived from zero funds.
    pub fn is_complete(&self) -> bool {
        !self.active.is_empty() && self.active.is_subset(&self.valued)
    }

    /// Completeness as it would stand once `portfolio_fund_id`'s valuation
    /// for the date is removed. Lets the deletion cascade decide the
    /// portfolio's fate before the removal is committed.
    pub fn is_complete_without(&self, portfolio_fund_id: &str) -> bool {
        if self.active.contains(portfolio_fund_id) {
            return false;
        }
        self.is_complete()
    }
}

/// Read-only gate between fund-level and portfolio-level derived data.
#[derive(Clone)]
pub struct CompletenessChecker {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    valuation_repository: Arc<dyn ValuationRepositoryTrait>,
}

impl CompletenessChecker {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        valuation_repository: Arc<dyn ValuationRepositoryTrait>,
    ) -> Self {
        Self {
            portfolio_repository,
            valuation_repository,
        }
    }

    /// Loads both fund sets for `(portfolio_id, date)`.
    ///
    /// Used inside cascade handlers, where a read failure must abort the
    /// whole (atomic) operation rather than silently gate to incomplete.
    pub fn check(&self, portfolio_id: &str, date: NaiveDate) -> Result<CompletenessView> {
        let active = self
            .portfolio_repository
            .get_active_funds(portfolio_id, date)?
            .into_iter()
            .map(|fund| fund.id)
            .collect();
        let valued = self
            .valuation_repository
            .get_fund_valuations_on_date(portfolio_id, date)?
            .into_iter()
            .map(|valuation| valuation.portfolio_fund_id)
            .collect();
        Ok(CompletenessView { active, valued })
    }

    /// The boolean gate: complete iff every active fund has a valuation for
    /// `date`. Any lookup failure logs and answers `false` - completeness is
    /// a gate, not a user-facing operation.
    pub fn is_complete(&self, portfolio_id: &str, date: NaiveDate) -> bool {
        match self.check(portfolio_id, date) {
            Ok(view) => view.is_complete(),
            Err(e) => {
                warn!(
                    "Completeness check failed for portfolio {} on {}: {}",
                    portfolio_id, date, e
                );
                false
            }
        }
    }
}
