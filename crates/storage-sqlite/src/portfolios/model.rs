//! Database models for portfolios and portfolio funds.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kingston_core::constants::DATE_FORMAT;
use kingston_core::portfolios::{Portfolio, PortfolioFund};

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDb {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<PortfolioDb> for Portfolio {
    fn from(db: PortfolioDb) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<Portfolio> for PortfolioDb {
    fn from(domain: Portfolio) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::portfolio_funds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFundDb {
    pub id: String,
    pub portfolio_id: String,
    pub fund_name: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_at: String,
}

impl From<PortfolioFundDb> for PortfolioFund {
    fn from(db: PortfolioFundDb) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            fund_name: db.fund_name,
            start_date: parse_date(&db.start_date),
            end_date: db.end_date.as_deref().map(parse_date),
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<PortfolioFund> for PortfolioFundDb {
    fn from(domain: PortfolioFund) -> Self {
        Self {
            id: domain.id,
            portfolio_id: domain.portfolio_id,
            fund_name: domain.fund_name,
            start_date: domain.start_date.format(DATE_FORMAT).to_string(),
            end_date: domain
                .end_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}

pub(crate) fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_default()
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
