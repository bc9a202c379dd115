use chrono::NaiveDate;
use diesel::dsl::max;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{FundValuationDb, PortfolioValuationDb};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{fund_valuations, portfolio_funds, portfolio_valuations};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::errors::Result;
use kingston_core::valuations::{FundValuation, PortfolioValuation, ValuationRepositoryTrait};

pub struct ValuationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ValuationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Persists a raw fund valuation. Used by the CRUD layer before it hands
    /// the change to the cascade engine; the engine itself never creates fund
    /// valuations.
    pub async fn save_fund_valuation(&self, valuation: &FundValuation) -> Result<()> {
        let row = FundValuationDb::from(valuation.clone());
        self.writer
            .exec(move |conn| {
                diesel::replace_into(fund_valuations::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

impl ValuationRepositoryTrait for ValuationRepository {
    fn get_fund_valuation(&self, valuation_id: &str) -> Result<Option<FundValuation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fund_valuations::table
            .find(valuation_id)
            .first::<FundValuationDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(FundValuation::from))
    }

    fn find_fund_valuation(
        &self,
        portfolio_fund_id: &str,
        date: NaiveDate,
    ) -> Result<Option<FundValuation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fund_valuations::table
            .filter(fund_valuations::portfolio_fund_id.eq(portfolio_fund_id))
            .filter(fund_valuations::valuation_date.eq(date.format(DATE_FORMAT).to_string()))
            .first::<FundValuationDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(FundValuation::from))
    }

    fn get_fund_valuations_on_date(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<FundValuation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fund_valuations::table
            .inner_join(portfolio_funds::table)
            .filter(portfolio_funds::portfolio_id.eq(portfolio_id))
            .filter(fund_valuations::valuation_date.eq(date.format(DATE_FORMAT).to_string()))
            .select(fund_valuations::all_columns)
            .load::<FundValuationDb>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(FundValuation::from).collect())
    }

    fn get_latest_valuation_date(&self, portfolio_id: &str) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        // Dates are stored %Y-%m-%d, so the lexicographic MAX is the latest.
        let result: Option<Option<String>> = fund_valuations::table
            .inner_join(portfolio_funds::table)
            .filter(portfolio_funds::portfolio_id.eq(portfolio_id))
            .select(max(fund_valuations::valuation_date))
            .first::<Option<String>>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(result
            .flatten()
            .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()))
    }

    fn get_fund_valuation_dates_from(
        &self,
        portfolio_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<String> = fund_valuations::table
            .inner_join(portfolio_funds::table)
            .filter(portfolio_funds::portfolio_id.eq(portfolio_id))
            .filter(fund_valuations::valuation_date.ge(from.format(DATE_FORMAT).to_string()))
            .select(fund_valuations::valuation_date)
            .distinct()
            .order(fund_valuations::valuation_date.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .iter()
            .filter_map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .collect())
    }

    fn get_portfolio_valuation(
        &self,
        portfolio_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PortfolioValuation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolio_valuations::table
            .filter(portfolio_valuations::portfolio_id.eq(portfolio_id))
            .filter(portfolio_valuations::valuation_date.eq(date.format(DATE_FORMAT).to_string()))
            .first::<PortfolioValuationDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PortfolioValuation::from))
    }

    fn get_portfolio_valuation_dates_from(
        &self,
        portfolio_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<String> = portfolio_valuations::table
            .filter(portfolio_valuations::portfolio_id.eq(portfolio_id))
            .filter(portfolio_valuations::valuation_date.ge(from.format(DATE_FORMAT).to_string()))
            .select(portfolio_valuations::valuation_date)
            .distinct()
            .order(portfolio_valuations::valuation_date.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .iter()
            .filter_map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .collect())
    }
}
