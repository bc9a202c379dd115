//! Kingston Core - IRR cascade engine for Kingston's Portal.
//!
//! This crate contains the domain logic that keeps fund-level and
//! portfolio-level IRR figures consistent as valuations and cash-flow
//! activity records change over time. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod activities;
pub mod cascade;
pub mod constants;
pub mod errors;
pub mod irr;
pub mod portfolios;
pub mod valuations;

// Re-export the cascade components and their outcome types
pub use cascade::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
