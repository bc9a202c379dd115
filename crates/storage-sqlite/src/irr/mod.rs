pub mod model;
pub mod repository;

pub use model::{FundIrrValueDb, PortfolioIrrValueDb};
pub use repository::IrrRepository;
