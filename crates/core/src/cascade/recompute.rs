//! Shared recomputation steps used by the cascade service and the
//! historical propagator.
//!
//! These helpers never write; they read current raw state, decide what the
//! derived records should look like, and push the corresponding mutations
//! onto the handler's batch.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::cascade_model::CascadeMutation;
use super::completeness::CompletenessView;
use crate::activities::ActivityRepositoryTrait;
use crate::errors::Result;
use crate::irr::{CashFlow, FundIrrValue, IrrCalculatorTrait, IrrRepositoryTrait, PortfolioIrrValue};
use crate::valuations::{PortfolioValuation, ValuationRepositoryTrait};

/// What happened to the portfolio-level records for one date.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PortfolioRecompute {
    pub complete: bool,
    pub irr: Option<Decimal>,
    /// A stale portfolio valuation existed and was queued for deletion.
    pub valuation_deleted: bool,
    /// A stale portfolio IRR existed and was queued for deletion.
    pub irr_deleted: bool,
}

#[derive(Clone)]
pub(crate) struct Recomputer {
    valuation_repository: Arc<dyn ValuationRepositoryTrait>,
    activity_repository: Arc<dyn ActivityRepositoryTrait>,
    irr_repository: Arc<dyn IrrRepositoryTrait>,
    calculator: Arc<dyn IrrCalculatorTrait>,
}

impl Recomputer {
    pub(crate) fn new(
        valuation_repository: Arc<dyn ValuationRepositoryTrait>,
        activity_repository: Arc<dyn ActivityRepositoryTrait>,
        irr_repository: Arc<dyn IrrRepositoryTrait>,
        calculator: Arc<dyn IrrCalculatorTrait>,
    ) -> Self {
        Self {
            valuation_repository,
            activity_repository,
            irr_repository,
            calculator,
        }
    }

    /// Recomputes one fund's IRR as of `date` from its activity history up to
    /// and including `date`, with the fund valuation on `date` as terminal
    /// value. A missing valuation or a non-computable series is recorded as
    /// absence: any existing fund IRR for the date is queued for deletion.
    pub(crate) fn fund_irr(
        &self,
        portfolio_fund_id: &str,
        date: NaiveDate,
        mutations: &mut Vec<CascadeMutation>,
    ) -> Result<Option<Decimal>> {
        let valuation = self
            .valuation_repository
            .find_fund_valuation(portfolio_fund_id, date)?;
        let Some(valuation) = valuation else {
            mutations.push(CascadeMutation::DeleteFundIrr {
                portfolio_fund_id: portfolio_fund_id.to_string(),
                date,
            });
            return Ok(None);
        };

        let activities = self
            .activity_repository
            .get_activities_for_fund(portfolio_fund_id, date)?;
        let flows: Vec<CashFlow> = activities
            .iter()
            .map(|activity| CashFlow {
                date: activity.activity_date,
                amount: activity.signed_cash_flow(),
            })
            .collect();

        let rate = self.calculator.compute(&flows, date, valuation.amount)?;
        match rate {
            Some(rate) => {
                mutations.push(CascadeMutation::SaveFundIrr(FundIrrValue::new(
                    portfolio_fund_id,
                    date,
                    rate,
                )));
            }
            None => {
                debug!(
                    "IRR not computable for fund {} on {}; recording absence",
                    portfolio_fund_id, date
                );
                mutations.push(CascadeMutation::DeleteFundIrr {
                    portfolio_fund_id: portfolio_fund_id.to_string(),
                    date,
                });
            }
        }
        Ok(rate)
    }

    /// Refreshes the portfolio valuation and IRR for `date` against the given
    /// completeness view. Incomplete dates have any stale portfolio-level
    /// records queued for deletion instead.
    pub(crate) fn portfolio_level(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
        view: &CompletenessView,
        mutations: &mut Vec<CascadeMutation>,
    ) -> Result<PortfolioRecompute> {
        if !view.is_complete() {
            return self.tear_down_portfolio_level(portfolio_id, date, mutations);
        }

        let fund_valuations = self
            .valuation_repository
            .get_fund_valuations_on_date(portfolio_id, date)?;
        let total: Decimal = fund_valuations
            .iter()
            .filter(|valuation| view.active.contains(&valuation.portfolio_fund_id))
            .map(|valuation| valuation.amount)
            .sum();
        mutations.push(CascadeMutation::SavePortfolioValuation(
            PortfolioValuation::new(portfolio_id, date, total),
        ));

        let mut fund_ids: Vec<String> = view.active.iter().cloned().collect();
        fund_ids.sort();
        let activities = self
            .activity_repository
            .get_activities_for_funds(&fund_ids, date)?;
        let flows: Vec<CashFlow> = activities
            .iter()
            .map(|activity| CashFlow {
                date: activity.activity_date,
                amount: activity.signed_cash_flow(),
            })
            .collect();

        let rate = self.calculator.compute(&flows, date, total)?;
        let mut irr_deleted = false;
        match rate {
            Some(rate) => {
                mutations.push(CascadeMutation::SavePortfolioIrr(PortfolioIrrValue::new(
                    portfolio_id,
                    date,
                    rate,
                )));
            }
            None => {
                debug!(
                    "Portfolio IRR not computable for {} on {}; recording absence",
                    portfolio_id, date
                );
                irr_deleted = self
                    .irr_repository
                    .get_portfolio_irr(portfolio_id, date)?
                    .is_some();
                mutations.push(CascadeMutation::DeletePortfolioIrr {
                    portfolio_id: portfolio_id.to_string(),
                    date,
                });
            }
        }
        Ok(PortfolioRecompute {
            complete: true,
            irr: rate,
            valuation_deleted: false,
            irr_deleted,
        })
    }

    /// Queues deletion of whatever portfolio-level records exist for an
    /// incomplete date, reporting what was actually there.
    pub(crate) fn tear_down_portfolio_level(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
        mutations: &mut Vec<CascadeMutation>,
    ) -> Result<PortfolioRecompute> {
        let valuation_deleted = self
            .valuation_repository
            .get_portfolio_valuation(portfolio_id, date)?
            .is_some();
        let irr_deleted = self
            .irr_repository
            .get_portfolio_irr(portfolio_id, date)?
            .is_some();
        if valuation_deleted || irr_deleted {
            debug!(
                "Portfolio {} incomplete on {}; deleting stale portfolio-level records",
                portfolio_id, date
            );
        }
        mutations.push(CascadeMutation::DeletePortfolioValuation {
            portfolio_id: portfolio_id.to_string(),
            date,
        });
        mutations.push(CascadeMutation::DeletePortfolioIrr {
            portfolio_id: portfolio_id.to_string(),
            date,
        });
        Ok(PortfolioRecompute {
            complete: false,
            irr: None,
            valuation_deleted,
            irr_deleted,
        })
    }
}
