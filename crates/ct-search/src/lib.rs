//! # ct-search
//!
//! Hyperparameter search space for the catboost-tune classifier.
//!
//! Provides the search configuration schema, a validating JSON loader, value
//! coercion helpers for tuners, and the search space bundled with the
//! repository.

mod bundled;
mod loader;
mod schema;

pub use bundled::BUNDLED_SEARCH_CONFIG;
pub use schema::{HyperparameterSpec, ParamType, SearchConfig, SearchType};
