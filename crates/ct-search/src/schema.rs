//! Search space schema: hyperparameter specifications and their validation.

use ct_types::{ConfigError, HtResult, ParameterValue};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// How a hyperparameter's bounds and sampled values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Real,
    Int,
}

impl ParamType {
    pub const ALL: [ParamType; 2] = [ParamType::Real, ParamType::Int];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Int => "int",
        }
    }
}

/// Sampling distribution between the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SearchType {
    /// Sampled uniformly in log-space, then exponentiated.
    #[serde(rename = "log-uniform")]
    LogUniform,
    /// Sampled linearly between the bounds.
    #[serde(rename = "uniform")]
    Uniform,
}

impl SearchType {
    pub const ALL: [SearchType; 2] = [SearchType::LogUniform, SearchType::Uniform];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogUniform => "log-uniform",
            Self::Uniform => "uniform",
        }
    }
}

fn expected_list<T, F: Fn(&T) -> &'static str>(all: &[T], name: F) -> String {
    all.iter().map(name).collect::<Vec<_>>().join(", ")
}

impl FromStr for ParamType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedEnum {
                field: "type".to_string(),
                value: s.to_string(),
                expected: expected_list(&Self::ALL, Self::as_str),
            })
    }
}

impl FromStr for SearchType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedEnum {
                field: "search_type".to_string(),
                value: s.to_string(),
                expected: expected_list(&Self::ALL, Self::as_str),
            })
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tunable hyperparameter. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparameterSpec {
    pub name: String,
    pub short_desc: String,
    pub param_type: ParamType,
    pub search_type: SearchType,
    pub range_low: f64,
    pub range_high: f64,
}

impl HyperparameterSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (low, high) = (self.range_low, self.range_high);

        if !low.is_finite() || !high.is_finite() {
            return Err(ConfigError::range(&self.name, "bounds must be finite numbers"));
        }
        if low >= high {
            return Err(ConfigError::range(
                &self.name,
                format!("range_low ({low}) must be less than range_high ({high})"),
            ));
        }
        if self.search_type == SearchType::LogUniform && low <= 0.0 {
            return Err(ConfigError::range(
                &self.name,
                format!("log-uniform bounds must be strictly positive, got range_low = {low}"),
            ));
        }
        if self.param_type == ParamType::Int && (low.fract() != 0.0 || high.fract() != 0.0) {
            return Err(ConfigError::range(
                &self.name,
                format!("int bounds must be integral, got [{low}, {high}]"),
            ));
        }
        // 2^63 itself is not representable as i64
        if self.param_type == ParamType::Int && (low < i64::MIN as f64 || high >= i64::MAX as f64) {
            return Err(ConfigError::range(
                &self.name,
                format!("int bounds must fit in a 64-bit integer, got [{low}, {high}]"),
            ));
        }
        Ok(())
    }

    /// Bring a raw draw into this hyperparameter's domain: clamp to the
    /// bounds and, for `int`, round to the nearest integer. NaN maps to
    /// `range_low`.
    pub fn coerce(&self, raw: f64) -> ParameterValue {
        let clamped = if raw.is_nan() {
            self.range_low
        } else {
            raw.clamp(self.range_low, self.range_high)
        };
        match self.param_type {
            ParamType::Real => ParameterValue::Float(clamped),
            ParamType::Int => ParameterValue::Int(clamped.round() as i64),
        }
    }

    /// Whether `value` is a legal assignment for this hyperparameter.
    pub fn contains(&self, value: &ParameterValue) -> bool {
        let v = value.as_f64();
        if self.param_type == ParamType::Int && v.fract() != 0.0 {
            return false;
        }
        v >= self.range_low && v <= self.range_high
    }

    /// Natural-log bounds for log-uniform entries.
    pub fn log_bounds(&self) -> Option<(f64, f64)> {
        match self.search_type {
            SearchType::LogUniform => Some((self.range_low.ln(), self.range_high.ln())),
            SearchType::Uniform => None,
        }
    }
}

impl Serialize for HyperparameterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HyperparameterSpec", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("short_desc", &self.short_desc)?;
        state.serialize_field("type", &self.param_type)?;
        state.serialize_field("search_type", &self.search_type)?;
        // int bounds are written back as JSON integers
        match self.param_type {
            ParamType::Int => {
                state.serialize_field("range_low", &(self.range_low as i64))?;
                state.serialize_field("range_high", &(self.range_high as i64))?;
            }
            ParamType::Real => {
                state.serialize_field("range_low", &self.range_low)?;
                state.serialize_field("range_high", &self.range_high)?;
            }
        }
        state.end()
    }
}

impl std::fmt::Display for HyperparameterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {}) in [{}, {}]: {}",
            self.name, self.param_type, self.search_type, self.range_low, self.range_high, self.short_desc
        )
    }
}

/// A full search configuration: trial budget plus the ordered search space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchConfig {
    pub num_trials: u64,
    pub hyperparameters: Vec<HyperparameterSpec>,
}

impl SearchConfig {
    /// Check every invariant, stopping at the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_trials == 0 {
            return Err(ConfigError::range("num_trials", "must be a positive integer"));
        }

        let mut seen = HashSet::new();
        for spec in &self.hyperparameters {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HyperparameterSpec> {
        self.hyperparameters.iter().find(|spec| spec.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hyperparameters.iter().map(|spec| spec.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.hyperparameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hyperparameters.is_empty()
    }

    /// Entries of `assignment` that name a hyperparameter of this space but
    /// hold a value outside its bounds. Names not in the space are skipped.
    pub fn out_of_range<'a>(
        &'a self,
        assignment: &HashMap<String, ParameterValue>,
    ) -> Vec<(&'a HyperparameterSpec, ParameterValue)> {
        self.hyperparameters
            .iter()
            .filter_map(|spec| {
                let value = *assignment.get(&spec.name)?;
                (!spec.contains(&value)).then_some((spec, value))
            })
            .collect()
    }

    /// Pretty-printed wire form. Only the schema's own fields are written:
    /// keys ignored on load do not survive a round trip, and `real` bounds
    /// are always written as JSON floats.
    pub fn to_json_string(&self) -> HtResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
