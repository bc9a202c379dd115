pub mod repository;

pub use repository::CascadeWriteRepository;
