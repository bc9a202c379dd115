//! Activities module - cash-flow activity models and traits.

mod activities_model;
mod activities_traits;


pub use activities_model::{Activity, ActivityType};
pub use activities_traits::ActivityRepositoryTrait;
