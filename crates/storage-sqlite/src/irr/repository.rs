use chrono::NaiveDate;
use diesel::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::model::{FundIrrValueDb, PortfolioIrrValueDb};
use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::{fund_irr_values, portfolio_funds, portfolio_irr_values};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::errors::Result;
use kingston_core::irr::{FundIrrValue, IrrRepositoryTrait, PortfolioIrrValue};

pub struct IrrRepository {
    pool: Arc<DbPool>,
}

impl IrrRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl IrrRepositoryTrait for IrrRepository {
    fn get_fund_irr(&self, portfolio_fund_id: &str, date: NaiveDate) -> Result<Option<FundIrrValue>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fund_irr_values::table
            .filter(fund_irr_values::portfolio_fund_id.eq(portfolio_fund_id))
            .filter(fund_irr_values::irr_date.eq(date.format(DATE_FORMAT).to_string()))
            .first::<FundIrrValueDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(FundIrrValue::from))
    }

    fn get_portfolio_irr(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PortfolioIrrValue>> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolio_irr_values::table
            .filter(portfolio_irr_values::portfolio_id.eq(portfolio_id))
            .filter(portfolio_irr_values::irr_date.eq(date.format(DATE_FORMAT).to_string()))
            .first::<PortfolioIrrValueDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PortfolioIrrValue::from))
    }

    fn get_irr_dates_from(&self, portfolio_id: &str, from: NaiveDate) -> Result<Vec<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let from_str = from.format(DATE_FORMAT).to_string();

        let fund_dates: Vec<String> = fund_irr_values::table
            .inner_join(portfolio_funds::table)
            .filter(portfolio_funds::portfolio_id.eq(portfolio_id))
            .filter(fund_irr_values::irr_date.ge(&from_str))
            .select(fund_irr_values::irr_date)
            .distinct()
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        let portfolio_dates: Vec<String> = portfolio_irr_values::table
            .filter(portfolio_irr_values::portfolio_id.eq(portfolio_id))
            .filter(portfolio_irr_values::irr_date.ge(&from_str))
            .select(portfolio_irr_values::irr_date)
            .distinct()
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;

        let dates: BTreeSet<NaiveDate> = fund_dates
            .iter()
            .chain(portfolio_dates.iter())
            .filter_map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .collect();
        Ok(dates.into_iter().collect())
    }
}
