//! Database model for cash-flow activities.

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::portfolios::model::{parse_date, parse_timestamp};
use kingston_core::activities::{Activity, ActivityType};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::errors::{Error, ValidationError};

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::activities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ActivityDb {
    pub id: String,
    pub portfolio_fund_id: String,
    pub activity_type: String,
    pub activity_date: String,
    pub amount: String,
    pub created_at: String,
}

// An unknown activity type string is data corruption, not a default; unlike
// the date/decimal fields this conversion is fallible.
impl TryFrom<ActivityDb> for Activity {
    type Error = Error;

    fn try_from(db: ActivityDb) -> Result<Self, Self::Error> {
        let activity_type = ActivityType::from_str(&db.activity_type)
            .map_err(|e| Error::Validation(ValidationError::InvalidInput(e)))?;
        Ok(Self {
            id: db.id,
            portfolio_fund_id: db.portfolio_fund_id,
            activity_date: parse_date(&db.activity_date),
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            activity_type,
            created_at: parse_timestamp(&db.created_at),
        })
    }
}

impl From<Activity> for ActivityDb {
    fn from(domain: Activity) -> Self {
        Self {
            id: domain.id,
            portfolio_fund_id: domain.portfolio_fund_id,
            activity_type: domain.activity_type.as_str().to_string(),
            activity_date: domain.activity_date.format(DATE_FORMAT).to_string(),
            amount: domain.amount.to_string(),
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}
