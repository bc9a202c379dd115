//! Repository trait for portfolios and portfolio funds.

use chrono::NaiveDate;

use super::{Portfolio, PortfolioFund};
use crate::errors::Result;

/// Read-only repository contract for portfolio structure.
///
/// Lookups return `Ok(None)` for missing records; the cascade service decides
/// whether absence is an error for the operation at hand.
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Option<Portfolio>>;

    fn get_fund(&self, portfolio_fund_id: &str) -> Result<Option<PortfolioFund>>;

    fn get_funds(&self, portfolio_id: &str) -> Result<Vec<PortfolioFund>>;

    /// Funds of the portfolio that are active on `as_of`: no end date, or an
    /// end date after `as_of`.
    fn get_active_funds(&self, portfolio_id: &str, as_of: NaiveDate) -> Result<Vec<PortfolioFund>>;
}
