//! Activity domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classification of a dated cash-flow event against a portfolio fund.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Contribution,
    Withdrawal,
    SwitchIn,
    SwitchOut,
    Fee,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Contribution => "CONTRIBUTION",
            ActivityType::Withdrawal => "WITHDRAWAL",
            ActivityType::SwitchIn => "SWITCH_IN",
            ActivityType::SwitchOut => "SWITCH_OUT",
            ActivityType::Fee => "FEE",
        }
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CONTRIBUTION" => Ok(ActivityType::Contribution),
            "WITHDRAWAL" => Ok(ActivityType::Withdrawal),
            "SWITCH_IN" => Ok(ActivityType::SwitchIn),
            "SWITCH_OUT" => Ok(ActivityType::SwitchOut),
            "FEE" => Ok(ActivityType::Fee),
            other => Err(format!("Unknown activity type: {}", other)),
        }
    }
}

/// A dated cash-flow event against a portfolio fund.
///
/// `amount` is an unsigned magnitude; the direction of the flow comes from
/// the activity type. Activities are mutated in batches by the CRUD layer and
/// are read-only inside the cascade engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub portfolio_fund_id: String,
    pub activity_date: NaiveDate,
    pub amount: Decimal,
    pub activity_type: ActivityType,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Signed cash flow from the investor's perspective, as fed to the IRR
    /// solver: money paid into the fund is negative, money coming back out
    /// is positive. Fees are charges leaving the wrapper and count as
    /// outflows alongside withdrawals.
    pub fn signed_cash_flow(&self) -> Decimal {
        match self.activity_type {
            ActivityType::Contribution | ActivityType::SwitchIn => -self.amount,
            ActivityType::Withdrawal | ActivityType::SwitchOut | ActivityType::Fee => self.amount,
        }
    }
}
