use anyhow::Context;
use ct_search::SearchConfig;
use ct_types::ClassifierHyperparameters;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_VAR: &str = "CT_SEARCH_CONFIG";

/// Where the search configuration is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    Path(String),
    Bundled,
}

/// Command-line argument first, then the environment, then the bundled file.
fn resolve_source(arg: Option<String>, env: Option<String>) -> ConfigSource {
    arg.or(env).map_or(ConfigSource::Bundled, ConfigSource::Path)
}

fn load(source: &ConfigSource) -> anyhow::Result<SearchConfig> {
    match source {
        ConfigSource::Path(path) => SearchConfig::from_path(path)
            .with_context(|| format!("failed to load search configuration from {path}")),
        ConfigSource::Bundled => {
            info!("No configuration path given, validating the bundled search space");
            SearchConfig::bundled().context("bundled search configuration is invalid")
        }
    }
}

/// Names and values of classifier defaults that fall outside the space.
fn defaults_outside(config: &SearchConfig, defaults: &ClassifierHyperparameters) -> Vec<String> {
    config
        .out_of_range(&defaults.to_assignment())
        .into_iter()
        .map(|(spec, value)| format!("{} = {}", spec.name, value))
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let source = resolve_source(std::env::args().nth(1), std::env::var(CONFIG_PATH_VAR).ok());
    let config = load(&source)?;

    for entry in defaults_outside(&config, &ClassifierHyperparameters::default()) {
        warn!("Classifier default {} lies outside the search range", entry);
    }

    println!("num_trials: {}", config.num_trials);
    for spec in &config.hyperparameters {
        println!("  {spec}");
    }
    Ok(())
}
