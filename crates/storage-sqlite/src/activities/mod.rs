pub mod model;
pub mod repository;

pub use model::ActivityDb;
pub use repository::ActivityRepository;
