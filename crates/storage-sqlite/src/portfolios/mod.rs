pub mod model;
pub mod repository;

pub use model::{PortfolioDb, PortfolioFundDb};
pub use repository::PortfolioRepository;
