//! Portfolios module - portfolio and portfolio-fund domain models and traits.

mod portfolios_model;
mod portfolios_traits;


pub use portfolios_model::{Portfolio, PortfolioFund};
pub use portfolios_traits::PortfolioRepositoryTrait;
