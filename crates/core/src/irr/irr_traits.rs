//! Traits for IRR persistence and the IRR calculation primitive.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{CashFlow, FundIrrValue, PortfolioIrrValue};
use crate::errors::Result;

/// Read-only repository contract for computed IRR values.
///
/// Writes go through the cascade write repository so that derived records are
/// only ever mutated inside an atomic cascade commit.
pub trait IrrRepositoryTrait: Send + Sync {
    fn get_fund_irr(
        &self,
        portfolio_fund_id: &str,
        date: NaiveDate,
    ) -> Result<Option<FundIrrValue>>;

    fn get_portfolio_irr(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PortfolioIrrValue>>;

    /// Distinct dates on or after `from` that carry a fund IRR for any of the
    /// portfolio's funds or a portfolio IRR, ascending.
    fn get_irr_dates_from(&self, portfolio_id: &str, from: NaiveDate) -> Result<Vec<NaiveDate>>;
}

/// The IRR calculation primitive.
///
/// Given a dated series of cash flows and a terminal value, returns the
/// annualized rate that zeroes the net present value. `Ok(None)` is the
/// not-computable state (too few data points, no sign change, or no root);
/// it is an expected outcome, not an error.
pub trait IrrCalculatorTrait: Send + Sync {
    fn compute(
        &self,
        cash_flows: &[CashFlow],
        terminal_date: NaiveDate,
        terminal_value: Decimal,
    ) -> Result<Option<Decimal>>;
}
