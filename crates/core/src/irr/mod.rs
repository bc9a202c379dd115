//! IRR module - computed IRR models, the solver, and their traits.

mod irr_calculator;
mod irr_model;
mod irr_traits;

pub use irr_calculator::XirrCalculator;
pub use irr_model::{CashFlow, FundIrrValue, PortfolioIrrValue};
pub use irr_traits::{IrrCalculatorTrait, IrrRepositoryTrait};
