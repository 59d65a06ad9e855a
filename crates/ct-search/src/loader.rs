//! Loading search configurations from JSON.
//!
//! Malformed JSON is a parse error, a missing or mistyped key is a schema
//! error naming its path, an unknown enumeration is reported with the
//! accepted values, and bound violations are range errors. Keys the schema
//! does not define are ignored.

use ct_types::{ConfigError, HtResult};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::schema::{HyperparameterSpec, SearchConfig};

impl SearchConfig {
    /// Parse and validate a configuration document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(input).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> HtResult<Self> {
        let path = path.as_ref();
        debug!("Reading search configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&contents)?)
    }

    /// Build a configuration from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let root = value.as_object().ok_or_else(|| ConfigError::Parse {
            message: "top-level value must be a JSON object".to_string(),
        })?;

        let num_trials = parse_num_trials(required(root, "num_trials", "num_trials")?)?;

        let entries = required(root, "hyperparameters", "hyperparameters")?
            .as_array()
            .ok_or_else(|| ConfigError::wrong_type("hyperparameters", "an array"))?;

        let hyperparameters = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_spec(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self {
            num_trials,
            hyperparameters,
        };
        config.validate()?;

        for spec in &config.hyperparameters {
            debug!(
                "Hyperparameter {}: {} {} in [{}, {}]",
                spec.name, spec.param_type, spec.search_type, spec.range_low, spec.range_high
            );
        }
        info!(
            "Loaded search configuration: {} hyperparameters, {} trials",
            config.len(),
            config.num_trials
        );

        Ok(config)
    }
}

impl<'de> Deserialize<'de> for SearchConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn required<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value, ConfigError> {
    object.get(key).ok_or_else(|| ConfigError::missing(path))
}

fn parse_num_trials(value: &Value) -> Result<u64, ConfigError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_i64() {
        Some(n) => Err(ConfigError::range(
            "num_trials",
            format!("must be a positive integer, got {n}"),
        )),
        None => Err(ConfigError::wrong_type("num_trials", "an integer")),
    }
}

fn parse_spec(index: usize, entry: &Value) -> Result<HyperparameterSpec, ConfigError> {
    let base = format!("hyperparameters[{index}]");
    let object = entry
        .as_object()
        .ok_or_else(|| ConfigError::wrong_type(base.as_str(), "an object"))?;

    Ok(HyperparameterSpec {
        name: string_field(object, &base, "name")?,
        short_desc: string_field(object, &base, "short_desc")?,
        param_type: parse_enum(&string_field(object, &base, "type")?, &format!("{base}.type"))?,
        search_type: parse_enum(
            &string_field(object, &base, "search_type")?,
            &format!("{base}.search_type"),
        )?,
        range_low: number_field(object, &base, "range_low")?,
        range_high: number_field(object, &base, "range_high")?,
    })
}

fn string_field(object: &Map<String, Value>, base: &str, key: &str) -> Result<String, ConfigError> {
    let path = format!("{base}.{key}");
    required(object, key, &path)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::wrong_type(path, "a string"))
}

fn number_field(object: &Map<String, Value>, base: &str, key: &str) -> Result<f64, ConfigError> {
    let path = format!("{base}.{key}");
    required(object, key, &path)?
        .as_f64()
        .ok_or_else(|| ConfigError::wrong_type(path, "a number"))
}

fn parse_enum<T: FromStr<Err = ConfigError>>(raw: &str, path: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|err| match err {
        ConfigError::UnsupportedEnum { value, expected, .. } => ConfigError::UnsupportedEnum {
            field: path.to_string(),
            value,
            expected,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParamType, SearchType};
    use serde_json::json;
    use std::io::Write;

    fn document() -> Value {
        json!({
            "num_trials": 5,
            "hyperparameters": [
                {
                    "name": "learning_rate",
                    "short_desc": "The gradient step",
                    "type": "real",
                    "search_type": "log-uniform",
                    "range_low": 1e-3,
                    "range_high": 1.0
                },
                {
                    "name": "depth",
                    "short_desc": "Depth of the tree",
                    "type": "int",
                    "search_type": "uniform",
                    "range_low": 2,
                    "range_high": 8
                }
            ]
        })
    }

    #[test]
    fn loads_well_formed_document() {
        let config = SearchConfig::from_value(&document()).unwrap();
        assert_eq!(config.num_trials, 5);
        assert_eq!(config.len(), 2);
        let depth = config.get("depth").unwrap();
        assert_eq!(depth.param_type, ParamType::Int);
        assert_eq!(depth.search_type, SearchType::Uniform);
        assert_eq!((depth.range_low, depth.range_high), (2.0, 8.0));
    }

    #[test]
    fn preserves_entry_order() {
        let config = SearchConfig::from_value(&document()).unwrap();
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["learning_rate", "depth"]);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = SearchConfig::from_json_str("{ \"num_trials\": 20, ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn non_object_root_is_parse_error() {
        let err = SearchConfig::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_field_is_named() {
        let mut doc = document();
        doc["hyperparameters"][1]
            .as_object_mut()
            .unwrap()
            .remove("range_high");
        match SearchConfig::from_value(&doc) {
            Err(ConfigError::Schema { field, .. }) => {
                assert_eq!(field, "hyperparameters[1].range_high")
            }
            other => panic!("expected schema error, got {other:?}"),
        }

        let mut doc = document();
        doc.as_object_mut().unwrap().remove("num_trials");
        match SearchConfig::from_value(&doc) {
            Err(ConfigError::Schema { field, .. }) => assert_eq!(field, "num_trials"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_schema_error() {
        let mut doc = document();
        doc["hyperparameters"][0]["range_low"] = json!("small");
        match SearchConfig::from_value(&doc) {
            Err(ConfigError::Schema { field, message }) => {
                assert_eq!(field, "hyperparameters[0].range_low");
                assert!(message.contains("number"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }

        let mut doc = document();
        doc["hyperparameters"] = json!({"depth": {}});
        assert!(matches!(
            SearchConfig::from_value(&doc),
            Err(ConfigError::Schema { .. })
        ));
    }

    #[test]
    fn unknown_enum_reports_path() {
        let mut doc = document();
        doc["hyperparameters"][1]["search_type"] = json!("normal");
        match SearchConfig::from_value(&doc) {
            Err(ConfigError::UnsupportedEnum { field, value, expected }) => {
                assert_eq!(field, "hyperparameters[1].search_type");
                assert_eq!(value, "normal");
                assert_eq!(expected, "log-uniform, uniform");
            }
            other => panic!("expected unsupported enum, got {other:?}"),
        }
    }

    #[test]
    fn negative_trials_is_range_error() {
        let mut doc = document();
        doc["num_trials"] = json!(-3);
        assert!(matches!(
            SearchConfig::from_value(&doc),
            Err(ConfigError::Range { .. })
        ));

        doc["num_trials"] = json!(2.5);
        assert!(matches!(
            SearchConfig::from_value(&doc),
            Err(ConfigError::Schema { .. })
        ));
    }

    #[test]
    fn bound_violation_fails_whole_load() {
        let mut doc = document();
        doc["hyperparameters"][0]["range_low"] = json!(-1.0);
        match SearchConfig::from_value(&doc) {
            Err(ConfigError::Range { name, .. }) => assert_eq!(name, "learning_rate"),
            other => panic!("expected range error, got {other:?}"),
        }
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut doc = document();
        doc["owner"] = json!("tuning");
        doc["hyperparameters"][0]["notes"] = json!("try lower");
        assert!(SearchConfig::from_value(&doc).is_ok());
    }

    #[test]
    fn serde_deserialize_validates() {
        let mut doc = document();
        doc["hyperparameters"][1]["name"] = json!("learning_rate");
        let err = serde_json::from_value::<SearchConfig>(doc).unwrap_err();
        assert!(err.to_string().contains("Duplicate hyperparameter name"));

        let config: SearchConfig = serde_json::from_value(document()).unwrap();
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn round_trip_is_value_equivalent() {
        let doc = document();
        let config = SearchConfig::from_value(&doc).unwrap();
        let text = config.to_json_string().unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn oversized_int_bound_fails_load() {
        let mut doc = document();
        doc["hyperparameters"][1]["range_high"] = json!(1e19);
        match SearchConfig::from_value(&doc) {
            Err(ConfigError::Range { name, .. }) => assert_eq!(name, "depth"),
            other => panic!("expected range error, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_keeps_only_schema_fields() {
        let mut doc = document();
        doc["owner"] = json!("tuning");
        doc["hyperparameters"][0]["notes"] = json!("try lower");
        doc["hyperparameters"][0]["range_high"] = json!(1);

        let config = SearchConfig::from_value(&doc).unwrap();
        let back: Value = serde_json::from_str(&config.to_json_string().unwrap()).unwrap();
        assert!(back.get("owner").is_none());
        assert!(back["hyperparameters"][0].get("notes").is_none());
        assert!(back["hyperparameters"][0]["range_high"].is_f64());
        assert_eq!(back["hyperparameters"][0]["range_high"].as_f64(), Some(1.0));
        assert_eq!(back["hyperparameters"][1], document()["hyperparameters"][1]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", document()).unwrap();
        let config = SearchConfig::from_path(file.path()).unwrap();
        assert_eq!(config.num_trials, 5);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchConfig::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ct_types::HtError::Io(_)));
    }
}
