//! Repository trait for cash-flow activities.

use chrono::NaiveDate;

use super::Activity;
use crate::errors::Result;

/// Read-only repository contract for activities.
pub trait ActivityRepositoryTrait: Send + Sync {
    /// Activities for one fund dated on or before `up_to`, ascending by date.
    fn get_activities_for_fund(
        &self,
        portfolio_fund_id: &str,
        up_to: NaiveDate,
    ) -> Result<Vec<Activity>>;

    /// Activities across a set of funds dated on or before `up_to`,
    /// ascending by date.
    fn get_activities_for_funds(
        &self,
        portfolio_fund_ids: &[String],
        up_to: NaiveDate,
    ) -> Result<Vec<Activity>>;
}
