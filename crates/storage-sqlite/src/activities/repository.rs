use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::ActivityDb;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::activities;
use kingston_core::activities::{Activity, ActivityRepositoryTrait};
use kingston_core::constants::DATE_FORMAT;
use kingston_core::errors::Result;

pub struct ActivityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ActivityRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Persists a batch of raw activities in one transaction. Used by the
    /// CRUD layer; it then reports the affected dates to the cascade engine.
    pub async fn save_activities(&self, batch: Vec<Activity>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let rows: Vec<ActivityDb> = batch.into_iter().map(ActivityDb::from).collect();
        self.writer
            .exec(move |conn| {
                for chunk in rows.chunks(1000) {
                    diesel::replace_into(activities::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    /// Deletes a batch of activities by id in one transaction.
    pub async fn delete_activities(&self, activity_ids: Vec<String>) -> Result<()> {
        if activity_ids.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                diesel::delete(activities::table.filter(activities::id.eq_any(activity_ids)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

impl ActivityRepositoryTrait for ActivityRepository {
    fn get_activities_for_fund(
        &self,
        portfolio_fund_id: &str,
        up_to: NaiveDate,
    ) -> Result<Vec<Activity>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = activities::table
            .filter(activities::portfolio_fund_id.eq(portfolio_fund_id))
            .filter(activities::activity_date.le(up_to.format(DATE_FORMAT).to_string()))
            .order(activities::activity_date.asc())
            .load::<ActivityDb>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Activity::try_from).collect()
    }

    fn get_activities_for_funds(
        &self,
        portfolio_fund_ids: &[String],
        up_to: NaiveDate,
    ) -> Result<Vec<Activity>> {
        if portfolio_fund_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;
        let rows = activities::table
            .filter(activities::portfolio_fund_id.eq_any(portfolio_fund_ids))
            .filter(activities::activity_date.le(up_to.format(DATE_FORMAT).to_string()))
            .order(activities::activity_date.asc())
            .load::<ActivityDb>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Activity::try_from).collect()
    }
}
