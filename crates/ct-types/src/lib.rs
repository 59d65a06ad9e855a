pub mod errors;
pub mod hyperparameters;

pub use errors::*;
pub use hyperparameters::*;
