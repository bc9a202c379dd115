//! Valuations module - fund and portfolio valuation models and traits.

mod valuations_model;
mod valuations_traits;

pub use valuations_model::{FundValuation, PortfolioValuation};
pub use valuations_traits::ValuationRepositoryTrait;
