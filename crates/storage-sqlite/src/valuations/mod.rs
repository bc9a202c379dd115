pub mod model;
pub mod repository;

pub use model::{FundValuationDb, PortfolioValuationDb};
pub use repository::ValuationRepository;
