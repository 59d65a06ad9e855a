//! The search space shipped with this repository.

use ct_types::ConfigError;

use crate::schema::SearchConfig;

/// Contents of `config/hyperparameters.json`.
pub const BUNDLED_SEARCH_CONFIG: &str = include_str!("../../../config/hyperparameters.json");

impl SearchConfig {
    /// Load the bundled search space.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json_str(BUNDLED_SEARCH_CONFIG)
    }
}
