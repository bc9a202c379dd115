//! Computed IRR domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One dated cash flow handed to the IRR solver. Negative amounts are money
/// paid in by the investor, positive amounts are money coming back out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// The internal rate of return of one portfolio fund as of one date.
///
/// Must not exist unless a fund valuation for the same date exists; deleting
/// the valuation deletes this record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundIrrValue {
    pub id: String,
    pub portfolio_fund_id: String,
    pub irr_date: NaiveDate,
    /// Annualized effective rate as a fraction (0.10 = 10%).
    pub irr: Decimal,
    pub calculated_at: DateTime<Utc>,
}

impl FundIrrValue {
    pub fn new(portfolio_fund_id: &str, irr_date: NaiveDate, irr: Decimal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            portfolio_fund_id: portfolio_fund_id.to_string(),
            irr_date,
            irr,
            calculated_at: Utc::now(),
        }
    }
}

/// The internal rate of return of a whole portfolio as of one date.
///
/// Must not exist unless a portfolio valuation for the same date exists,
/// which in turn requires the completeness invariant to hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioIrrValue {
    pub id: String,
    pub portfolio_id: String,
    pub irr_date: NaiveDate,
    /// Annualized effective rate as a fraction (0.10 = 10%).
    pub irr: Decimal,
    pub calculated_at: DateTime<Utc>,
}

impl PortfolioIrrValue {
    pub fn new(portfolio_id: &str, irr_date: NaiveDate, irr: Decimal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            irr_date,
            irr,
            calculated_at: Utc::now(),
        }
    }
}
