//! Portfolio domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A client portfolio: the owner of portfolio-fund relationships and of the
/// derived portfolio-level valuation and IRR records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A fund held within a portfolio.
///
/// The relationship carries its own identity (`id`) because the same fund can
/// be held by many portfolios; valuations, activities and fund-level IRRs all
/// hang off this id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFund {
    pub id: String,
    pub portfolio_id: String,
    pub fund_name: String,
    pub start_date: NaiveDate,
    /// Date the holding was closed out. `None` means the fund is still held.
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl PortfolioFund {
    /// Whether this fund counts as active on `date`: no end date, or an end
    /// date strictly after `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self.end_date {
            None => true,
            Some(end) => end > date,
        }
    }
}
