use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{PortfolioDb, PortfolioFundDb};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{portfolio_funds, portfolios};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::errors::Result;
use kingston_core::portfolios::{Portfolio, PortfolioFund, PortfolioRepositoryTrait};

pub struct PortfolioRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Persists a portfolio. Used by the CRUD layer, not by the cascade.
    pub async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        let row = PortfolioDb::from(portfolio.clone());
        self.writer
            .exec(move |conn| {
                diesel::replace_into(portfolios::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    /// Persists a portfolio-fund relationship. Used by the CRUD layer.
    pub async fn save_fund(&self, fund: &PortfolioFund) -> Result<()> {
        let row = PortfolioFundDb::from(fund.clone());
        self.writer
            .exec(move |conn| {
                diesel::replace_into(portfolio_funds::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Option<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolios::table
            .find(portfolio_id)
            .first::<PortfolioDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Portfolio::from))
    }

    fn get_fund(&self, portfolio_fund_id: &str) -> Result<Option<PortfolioFund>> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolio_funds::table
            .find(portfolio_fund_id)
            .first::<PortfolioFundDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PortfolioFund::from))
    }

    fn get_funds(&self, portfolio_id: &str) -> Result<Vec<PortfolioFund>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = portfolio_funds::table
            .filter(portfolio_funds::portfolio_id.eq(portfolio_id))
            .load::<PortfolioFundDb>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PortfolioFund::from).collect())
    }

    fn get_active_funds(&self, portfolio_id: &str, as_of: NaiveDate) -> Result<Vec<PortfolioFund>> {
        let mut conn = get_connection(&self.pool)?;
        let as_of_str = as_of.format(DATE_FORMAT).to_string();
        let rows = portfolio_funds::table
            .filter(portfolio_funds::portfolio_id.eq(portfolio_id))
            .filter(
                portfolio_funds::end_date
                    .is_null()
                    .or(portfolio_funds::end_date.gt(as_of_str)),
            )
            .load::<PortfolioFundDb>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PortfolioFund::from).collect())
    }
}
