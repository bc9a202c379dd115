//! Valuation domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single observation of the market value of one fund holding on one date.
///
/// Written by the CRUD layer; the cascade engine only ever deletes these (as
/// part of a valuation-deletion cascade) and reads them everywhere else.
/// Within a portfolio fund, the valuation date is the natural key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundValuation {
    pub id: String,
    pub portfolio_fund_id: String,
    pub valuation_date: NaiveDate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// The aggregate value of a portfolio on a date.
///
/// Derived from the sum of its active funds' valuations on that date, but
/// persisted as its own record so a portfolio IRR can reference a concrete
/// terminal value. Exists only while every active fund has a valuation for
/// the date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub id: String,
    pub portfolio_id: String,
    pub valuation_date: NaiveDate,
    pub amount: Decimal,
    pub calculated_at: DateTime<Utc>,
}

impl PortfolioValuation {
    pub fn new(portfolio_id: &str, valuation_date: NaiveDate, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            valuation_date,
            amount,
            calculated_at: Utc::now(),
        }
    }
}
