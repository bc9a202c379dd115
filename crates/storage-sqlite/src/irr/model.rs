//! Database models for computed IRR values.

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::portfolios::model::{parse_date, parse_timestamp};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::irr::{FundIrrValue, PortfolioIrrValue};

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::fund_irr_values)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct FundIrrValueDb {
    pub id: String,
    pub portfolio_fund_id: String,
    pub irr_date: String,
    pub irr: String,
    pub calculated_at: String,
}

impl From<FundIrrValueDb> for FundIrrValue {
    fn from(db: FundIrrValueDb) -> Self {
        Self {
            id: db.id,
            portfolio_fund_id: db.portfolio_fund_id,
            irr_date: parse_date(&db.irr_date),
            irr: Decimal::from_str(&db.irr).unwrap_or_default(),
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}

impl From<FundIrrValue> for FundIrrValueDb {
    fn from(domain: FundIrrValue) -> Self {
        Self {
            id: domain.id,
            portfolio_fund_id: domain.portfolio_fund_id,
            irr_date: domain.irr_date.format(DATE_FORMAT).to_string(),
            irr: domain.irr.to_string(),
            calculated_at: domain.calculated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::portfolio_irr_values)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioIrrValueDb {
    pub id: String,
    pub portfolio_id: String,
    pub irr_date: String,
    pub irr: String,
    pub calculated_at: String,
}

impl From<PortfolioIrrValueDb> for PortfolioIrrValue {
    fn from(db: PortfolioIrrValueDb) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            irr_date: parse_date(&db.irr_date),
            irr: Decimal::from_str(&db.irr).unwrap_or_default(),
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}

impl From<PortfolioIrrValue> for PortfolioIrrValueDb {
    fn from(domain: PortfolioIrrValue) -> Self {
        Self {
            id: domain.id,
            portfolio_id: domain.portfolio_id,
            irr_date: domain.irr_date.format(DATE_FORMAT).to_string(),
            irr: domain.irr.to_string(),
            calculated_at: domain.calculated_at.to_rfc3339(),
        }
    }
}
