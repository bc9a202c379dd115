//! SQLite storage implementation for the Kingston cascade engine.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `kingston-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for the cascade engine's entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist. The core
//! crate is database-agnostic and works with traits.
//!
//! ```text
//!          core (cascade engine)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! All derived-state writes funnel through a single writer actor that runs
//! each cascade commit inside one immediate transaction, so a handler's
//! whole write set lands atomically and writes are serialized.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod activities;
pub mod cascade;
pub mod irr;
pub mod portfolios;
pub mod valuations;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from kingston-core for convenience
pub use kingston_core::errors::{DatabaseError, Error, Result};
