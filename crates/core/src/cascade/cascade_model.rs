//! Outcome types and the mutation batch for cascade operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::irr::{FundIrrValue, PortfolioIrrValue};
use crate::valuations::PortfolioValuation;

/// One derived-state mutation inside a cascade commit.
///
/// A handler invocation accumulates its whole write set as a `Vec` of these
/// and commits it in a single atomic transaction. Deletes are idempotent:
/// deleting an absent row is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeMutation {
    SaveFundIrr(FundIrrValue),
    DeleteFundIrr {
        portfolio_fund_id: String,
        date: NaiveDate,
    },
    DeleteFundValuation {
        valuation_id: String,
    },
    SavePortfolioValuation(PortfolioValuation),
    DeletePortfolioValuation {
        portfolio_id: String,
        date: NaiveDate,
    },
    SavePortfolioIrr(PortfolioIrrValue),
    DeletePortfolioIrr {
        portfolio_id: String,
        date: NaiveDate,
    },
}

/// What a valuation-deletion cascade actually removed.
///
/// All flags false means there was nothing to delete (the initiating
/// valuation was already gone); the second delete of the same valuation
/// returns this empty summary rather than raising.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSummary {
    pub valuation_id: String,
    pub fund_irr_deleted: bool,
    pub fund_valuation_deleted: bool,
    pub portfolio_valuation_deleted: bool,
    pub portfolio_irr_deleted: bool,
}

impl DeletionSummary {
    pub fn empty(valuation_id: &str) -> Self {
        Self {
            valuation_id: valuation_id.to_string(),
            fund_irr_deleted: false,
            fund_valuation_deleted: false,
            portfolio_valuation_deleted: false,
            portfolio_irr_deleted: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.fund_irr_deleted
            && !self.fund_valuation_deleted
            && !self.portfolio_valuation_deleted
            && !self.portfolio_irr_deleted
    }
}

/// Per-date outcome reported by the historical propagator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DateOutcome {
    /// Fund and/or portfolio figures were recomputed for the date.
    Recomputed,
    /// The date is incomplete; stale portfolio-level records were deleted.
    DeletedIncomplete,
    /// The date carried no recomputable data and nothing stale to delete.
    SkippedNoData,
}

impl DateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateOutcome::Recomputed => "recomputed",
            DateOutcome::DeletedIncomplete => "deleted-incomplete",
            DateOutcome::SkippedNoData => "skipped-no-data",
        }
    }
}

/// Ordered per-date outcomes of one propagation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropagationReport {
    pub portfolio_id: String,
    pub from_date: NaiveDate,
    pub outcomes: Vec<(NaiveDate, DateOutcome)>,
}

impl PropagationReport {
    pub fn new(portfolio_id: &str, from_date: NaiveDate) -> Self {
        Self {
            portfolio_id: portfolio_id.to_string(),
            from_date,
            outcomes: Vec::new(),
        }
    }
}

/// Result of a valuation creation/edit cascade for one (fund, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub portfolio_fund_id: String,
    pub portfolio_id: String,
    pub date: NaiveDate,
    /// Recomputed fund IRR; `None` means not computable (recorded as absence).
    pub fund_irr: Option<Decimal>,
    /// Whether the completeness invariant held for the date after the change.
    pub complete: bool,
    /// Recomputed portfolio IRR; `None` when incomplete or not computable.
    pub portfolio_irr: Option<Decimal>,
    /// Forward propagation triggered when the date lies in the past.
    pub propagation: Option<PropagationReport>,
}
