//! Cascade module - the engine that keeps derived IRR data consistent.
//!
//! Three components: the completeness checker (is every active fund valued on
//! a date), the cascade service (handlers for the mutation events the CRUD
//! layer reports), and the historical propagator (forward recomputation when
//! a change lands on a past date).

mod cascade_model;
mod cascade_service;
mod cascade_traits;
mod completeness;
mod propagator;
mod recompute;

#[cfg(test)]
mod cascade_service_tests;


pub use cascade_model::{
    CascadeMutation, CascadeReport, DateOutcome, DeletionSummary, PropagationReport,
};
pub use cascade_service::CascadeService;
pub use cascade_traits::{CascadeServiceTrait, CascadeWriteRepositoryTrait};
pub use completeness::{CompletenessChecker, CompletenessView};
