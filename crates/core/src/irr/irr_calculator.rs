//! Internal Rate of Return solver for dated cash flows.
//!
//! Newton-Raphson on the annualized rate with a bisection fallback. Dates are
//! converted to year fractions against the earliest flow, so irregular
//! spacing is handled directly rather than through fixed periods.

use chrono::NaiveDate;
use log::debug;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use super::irr_traits::IrrCalculatorTrait;
use super::CashFlow;
use crate::constants::{DAYS_PER_YEAR, IRR_DECIMAL_PRECISION};
use crate::errors::{CalculatorError, Result};

const TOLERANCE: f64 = 1e-9;
const MAX_ITERATIONS: usize = 100;
const RATE_LOWER_BOUND: f64 = -0.9999;
const RATE_UPPER_BOUND: f64 = 10.0;

/// Dated-cash-flow IRR solver.
pub struct XirrCalculator;

impl XirrCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XirrCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl IrrCalculatorTrait for XirrCalculator {
    fn compute(
        &self,
        cash_flows: &[CashFlow],
        terminal_date: NaiveDate,
        terminal_value: Decimal,
    ) -> Result<Option<Decimal>> {
        let mut flows: Vec<(NaiveDate, f64)> = Vec::with_capacity(cash_flows.len() + 1);
        for flow in cash_flows {
            if flow.date > terminal_date {
                debug!(
                    "Ignoring cash flow dated {} after terminal date {}",
                    flow.date, terminal_date
                );
                continue;
            }
            flows.push((flow.date, decimal_to_f64(flow.amount)?));
        }
        flows.push((terminal_date, decimal_to_f64(terminal_value)?));
        flows.sort_by_key(|(date, _)| *date);

        // An IRR needs an initial flow and a terminal value on distinct dates,
        // and at least one sign change. Anything less is not computable.
        if flows.len() < 2 || flows.first().map(|(d, _)| *d) == Some(terminal_date) {
            return Ok(None);
        }
        let has_positive = flows.iter().any(|(_, amount)| *amount > TOLERANCE);
        let has_negative = flows.iter().any(|(_, amount)| *amount < -TOLERANCE);
        if !has_positive || !has_negative {
            return Ok(None);
        }

        let origin = flows[0].0;
        let timed: Vec<(f64, f64)> = flows
            .iter()
            .map(|(date, amount)| {
                let years = (*date - origin).num_days() as f64 / DAYS_PER_YEAR;
                (years, *amount)
            })
            .collect();

        let rate = newton_raphson(&timed).or_else(|| bisection(&timed));
        match rate {
            Some(rate) => Ok(f64_to_decimal(rate)),
            None => Ok(None),
        }
    }
}

fn decimal_to_f64(value: Decimal) -> Result<f64> {
    value.to_f64().ok_or_else(|| {
        CalculatorError::Conversion(format!("Cannot represent {} as f64", value)).into()
    })
}

fn f64_to_decimal(rate: f64) -> Option<Decimal> {
    if !rate.is_finite() {
        return None;
    }
    Decimal::from_f64(rate).map(|d| d.round_dp(IRR_DECIMAL_PRECISION))
}

/// NPV and its derivative with respect to the annualized rate.
fn npv_and_derivative(flows: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    for (years, amount) in flows {
        let discount = (1.0 + rate).powf(-years);
        npv += amount * discount;
        dnpv += amount * (-years) * (1.0 + rate).powf(-years - 1.0);
    }
    (npv, dnpv)
}

fn npv_at_rate(flows: &[(f64, f64)], rate: f64) -> f64 {
    flows
        .iter()
        .map(|(years, amount)| amount * (1.0 + rate).powf(-years))
        .sum()
}

fn newton_raphson(flows: &[(f64, f64)]) -> Option<f64> {
    let scale = flows
        .iter()
        .map(|(_, amount)| amount.abs())
        .fold(1.0_f64, f64::max);
    let mut rate = 0.1;
    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(flows, rate);
        if dnpv.abs() < 1e-12 {
            // Flat derivative; let bisection take over.
            return None;
        }
        let next = (rate - npv / dnpv).clamp(RATE_LOWER_BOUND, RATE_UPPER_BOUND);
        if (next - rate).abs() < TOLERANCE {
            return if npv_at_rate(flows, next).abs() < 1e-6 * scale {
                Some(next)
            } else {
                None
            };
        }
        rate = next;
    }
    None
}

fn bisection(flows: &[(f64, f64)]) -> Option<f64> {
    let mut low = RATE_LOWER_BOUND;
    let mut high = RATE_UPPER_BOUND;
    let npv_low = npv_at_rate(flows, low);
    let npv_high = npv_at_rate(flows, high);
    if npv_low * npv_high > 0.0 {
        // No root bracketed in the plausible rate range.
        return None;
    }
    for _ in 0..2 * MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(flows, mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv_at_rate(flows, low) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }
    None
}
