/// Decimal precision for stored IRR figures
pub const IRR_DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for monetary amounts
pub const AMOUNT_DECIMAL_PRECISION: u32 = 2;

/// Canonical date format for persisted calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-count denominator used when annualizing dated cash flows
pub const DAYS_PER_YEAR: f64 = 365.0;
