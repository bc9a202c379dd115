//! The atomic write path for cascade commits.
//!
//! A whole mutation batch is submitted to the writer actor as one job, which
//! runs inside one immediate transaction. A failing mutation anywhere in the
//! batch rolls back everything before it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::irr::model::{FundIrrValueDb, PortfolioIrrValueDb};
use crate::schema::{fund_irr_values, fund_valuations, portfolio_irr_values, portfolio_valuations};
use crate::valuations::model::PortfolioValuationDb;
use kingston_core::cascade::{CascadeMutation, CascadeWriteRepositoryTrait};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::errors::Result;

pub struct CascadeWriteRepository {
    writer: WriteHandle,
}

impl CascadeWriteRepository {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl CascadeWriteRepositoryTrait for CascadeWriteRepository {
    async fn commit(&self, mutations: Vec<CascadeMutation>) -> Result<()> {
        if mutations.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                for mutation in mutations {
                    apply(conn, mutation)?;
                }
                Ok(())
            })
            .await
    }
}

fn apply(conn: &mut SqliteConnection, mutation: CascadeMutation) -> Result<()> {
    match mutation {
        CascadeMutation::SaveFundIrr(irr) => {
            // The unique (fund, date) index makes this an upsert.
            diesel::replace_into(fund_irr_values::table)
                .values(FundIrrValueDb::from(irr))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        CascadeMutation::DeleteFundIrr {
            portfolio_fund_id,
            date,
        } => {
            diesel::delete(
                fund_irr_values::table
                    .filter(fund_irr_values::portfolio_fund_id.eq(portfolio_fund_id))
                    .filter(fund_irr_values::irr_date.eq(date.format(DATE_FORMAT).to_string())),
            )
            .execute(conn)
            .map_err(StorageError::from)?;
        }
        CascadeMutation::DeleteFundValuation { valuation_id } => {
            diesel::delete(fund_valuations::table.filter(fund_valuations::id.eq(valuation_id)))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        CascadeMutation::SavePortfolioValuation(valuation) => {
            diesel::replace_into(portfolio_valuations::table)
                .values(PortfolioValuationDb::from(valuation))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        CascadeMutation::DeletePortfolioValuation { portfolio_id, date } => {
            diesel::delete(
                portfolio_valuations::table
                    .filter(portfolio_valuations::portfolio_id.eq(portfolio_id))
                    .filter(
                        portfolio_valuations::valuation_date
                            .eq(date.format(DATE_FORMAT).to_string()),
                    ),
            )
            .execute(conn)
            .map_err(StorageError::from)?;
        }
        CascadeMutation::SavePortfolioIrr(irr) => {
            diesel::replace_into(portfolio_irr_values::table)
                .values(PortfolioIrrValueDb::from(irr))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        CascadeMutation::DeletePortfolioIrr { portfolio_id, date } => {
            diesel::delete(
                portfolio_irr_values::table
                    .filter(portfolio_irr_values::portfolio_id.eq(portfolio_id))
                    .filter(
                        portfolio_irr_values::irr_date.eq(date.format(DATE_FORMAT).to_string()),
                    ),
            )
            .execute(conn)
            .map_err(StorageError::from)?;
        }
    }
    Ok(())
}
