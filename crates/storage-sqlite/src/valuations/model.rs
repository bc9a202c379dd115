//! Database models for fund and portfolio valuations.

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::portfolios::model::{parse_date, parse_timestamp};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::valuations::{FundValuation, PortfolioValuation};

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::fund_valuations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct FundValuationDb {
    pub id: String,
    pub portfolio_fund_id: String,
    pub valuation_date: String,
    pub amount: String,
    pub created_at: String,
}

impl From<FundValuationDb> for FundValuation {
    fn from(db: FundValuationDb) -> Self {
        Self {
            id: db.id,
            portfolio_fund_id: db.portfolio_fund_id,
            valuation_date: parse_date(&db.valuation_date),
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<FundValuation> for FundValuationDb {
    fn from(domain: FundValuation) -> Self {
        Self {
            id: domain.id,
            portfolio_fund_id: domain.portfolio_fund_id,
            valuation_date: domain.valuation_date.format(DATE_FORMAT).to_string(),
            amount: domain.amount.to_string(),
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::portfolio_valuations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuationDb {
    pub id: String,
    pub portfolio_id: String,
    pub valuation_date: String,
    pub amount: String,
    pub calculated_at: String,
}

impl From<PortfolioValuationDb> for PortfolioValuation {
    fn from(db: PortfolioValuationDb) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            valuation_date: parse_date(&db.valuation_date),
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}

impl From<PortfolioValuation> for PortfolioValuationDb {
    fn from(domain: PortfolioValuation) -> Self {
        Self {
            id: domain.id,
            portfolio_id: domain.portfolio_id,
            valuation_date: domain.valuation_date.format(DATE_FORMAT).to_string(),
            amount: domain.amount.to_string(),
            calculated_at: domain.calculated_at.to_rfc3339(),
        }
    }
}
