//! Repository trait for fund and portfolio valuations.

use chrono::NaiveDate;

use super::{FundValuation, PortfolioValuation};
use crate::errors::Result;

/// Read-only repository contract for valuations.
///
/// All writes to valuation records go through the cascade write repository so
/// that a whole cascade commits atomically.
pub trait ValuationRepositoryTrait: Send + Sync {
    fn get_fund_valuation(&self, valuation_id: &str) -> Result<Option<FundValuation>>;

    /// The valuation of one fund on exactly `date`, if recorded.
    fn find_fund_valuation(
        &self,
        portfolio_fund_id: &str,
        date: NaiveDate,
    ) -> Result<Option<FundValuation>>;

    /// All fund valuations recorded on `date` across the portfolio's funds,
    /// active or not.
    fn get_fund_valuations_on_date(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<FundValuation>>;

    /// The most recent date with any fund valuation for the portfolio.
    fn get_latest_valuation_date(&self, portfolio_id: &str) -> Result<Option<NaiveDate>>;

    /// Distinct dates on or after `from` that carry a fund valuation for any
    /// of the portfolio's funds, ascending.
    fn get_fund_valuation_dates_from(
        &self,
        portfolio_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>>;

    fn get_portfolio_valuation(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PortfolioValuation>>;

    /// Distinct dates on or after `from` that carry a portfolio valuation,
    /// ascending.
    fn get_portfolio_valuation_dates_from(
        &self,
        portfolio_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>>;
}
