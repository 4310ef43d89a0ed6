//! Assessment frameworks: typed, validated rubrics.
//!
//! Frameworks are stored as loose JSON columns. Nothing downstream reads those
//! columns directly: `FrameworkConfig::from_json` parses them into this schema and
//! rejects malformed rubrics before they reach the scorer. In particular the top-level
//! weights, and each criterion's sub-criteria weights, must sum to 100.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Allowed deviation from 100 when summing weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;
const EXPECTED_WEIGHT_SUM: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum FrameworkError {
    #[error("invalid {field} configuration: {message}")]
    Schema { field: &'static str, message: String },

    #[error("framework defines no criteria")]
    NoCriteria,

    #[error("weight for '{criterion}' must be a finite, non-negative number (got {weight})")]
    InvalidWeight { criterion: String, weight: f64 },

    #[error("weights must sum to 100 (got {sum})")]
    WeightSum { sum: f64 },

    #[error("sub-criteria weights of '{criterion}' must sum to 100 (got {sum})")]
    SubcriteriaWeightSum { criterion: String, sum: f64 },

    #[error("weight given for unknown criterion '{0}'")]
    UnknownWeight(String),

    #[error("criterion '{0}' has no entry in the weights map")]
    MissingWeight(String),

    #[error("criterion '{criterion}' declares weight {declared} but the weights map says {mapped}")]
    WeightMismatch {
        criterion: String,
        declared: f64,
        mapped: f64,
    },

    #[error("unknown scoring method '{0}'")]
    UnknownScoringMethod(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMethod {
    WeightedAverage,
}

impl ScoringMethod {
    pub fn parse(s: &str) -> Result<Self, FrameworkError> {
        match s {
            "WEIGHTED_AVERAGE" => Ok(Self::WeightedAverage),
            other => Err(FrameworkError::UnknownScoringMethod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeightedAverage => "WEIGHTED_AVERAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCriterion {
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Optional copy of the weights-map entry; must agree with it when present.
    pub weight: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subcriteria: BTreeMap<String, SubCriterion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomPrompts {
    pub main_analysis: Option<String>,
    pub red_flags_detection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub video_fps: Option<f64>,
    pub analyze_emotions: bool,
    pub detect_pauses: bool,
    pub analyze_confidence: bool,
    pub min_confidence_threshold: Option<u32>,
    pub custom_prompts: CustomPrompts,
}

/// Toggles for the red-flag section of the evaluation prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedFlagsConfig {
    pub detect_inconsistencies: bool,
    pub detect_evasiveness: bool,
    pub detect_template_answers: bool,
    pub confidence_threshold: Option<u32>,
    pub pause_threshold_seconds: Option<u32>,
}

impl RedFlagsConfig {
    pub fn any_enabled(&self) -> bool {
        self.detect_inconsistencies
            || self.detect_evasiveness
            || self.detect_template_answers
            || self.confidence_threshold().is_some()
            || self.pause_threshold_seconds().is_some()
    }

    /// A zero threshold counts as unset.
    pub fn confidence_threshold(&self) -> Option<u32> {
        self.confidence_threshold.filter(|&t| t > 0)
    }

    pub fn pause_threshold_seconds(&self) -> Option<u32> {
        self.pause_threshold_seconds.filter(|&t| t > 0)
    }
}

/// A validated rubric. Construct through `from_json` or `new`; both validate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameworkConfig {
    pub criteria: BTreeMap<String, Criterion>,
    pub weights: BTreeMap<String, f64>,
    pub scoring_method: ScoringMethod,
    pub analysis: AnalysisConfig,
    pub red_flags: RedFlagsConfig,
}

impl FrameworkConfig {
    pub fn new(
        criteria: BTreeMap<String, Criterion>,
        weights: BTreeMap<String, f64>,
        scoring_method: ScoringMethod,
        analysis: AnalysisConfig,
        red_flags: RedFlagsConfig,
    ) -> Result<Self, FrameworkError> {
        let config = Self {
            criteria,
            weights,
            scoring_method,
            analysis,
            red_flags,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses the stored JSON columns. `null` analysis / red-flag columns mean "all off".
    pub fn from_json(
        criteria: &Value,
        weights: &Value,
        scoring_method: &str,
        analysis: &Value,
        red_flags: &Value,
    ) -> Result<Self, FrameworkError> {
        Self::new(
            parse_field("criteria", criteria)?,
            parse_field("weights", weights)?,
            ScoringMethod::parse(scoring_method)?,
            parse_optional_field("analysis_config", analysis)?,
            parse_optional_field("red_flags_config", red_flags)?,
        )
    }

    pub fn validate(&self) -> Result<(), FrameworkError> {
        if self.criteria.is_empty() {
            return Err(FrameworkError::NoCriteria);
        }

        for (name, weight) in &self.weights {
            check_weight(name, *weight)?;
            if !self.criteria.contains_key(name) {
                return Err(FrameworkError::UnknownWeight(name.clone()));
            }
        }

        for (name, criterion) in &self.criteria {
            let mapped = *self
                .weights
                .get(name)
                .ok_or_else(|| FrameworkError::MissingWeight(name.clone()))?;

            if let Some(declared) = criterion.weight {
                if (declared - mapped).abs() > WEIGHT_SUM_TOLERANCE {
                    return Err(FrameworkError::WeightMismatch {
                        criterion: name.clone(),
                        declared,
                        mapped,
                    });
                }
            }

            if !criterion.subcriteria.is_empty() {
                let mut sum = 0.0;
                for (sub_name, sub) in &criterion.subcriteria {
                    check_weight(&format!("{name}.{sub_name}"), sub.weight)?;
                    sum += sub.weight;
                }
                if !sums_to_hundred(sum) {
                    return Err(FrameworkError::SubcriteriaWeightSum {
                        criterion: name.clone(),
                        sum,
                    });
                }
            }
        }

        let sum: f64 = self.weights.values().sum();
        if !sums_to_hundred(sum) {
            return Err(FrameworkError::WeightSum { sum });
        }

        Ok(())
    }

    /// Frames-per-second hint sent with the video.
    pub fn video_fps(&self) -> Option<f64> {
        self.analysis.video_fps.filter(|fps| fps.is_finite() && *fps > 0.0)
    }
}

fn check_weight(name: &str, weight: f64) -> Result<(), FrameworkError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(FrameworkError::InvalidWeight {
            criterion: name.to_string(),
            weight,
        })
    }
}

fn sums_to_hundred(sum: f64) -> bool {
    (sum - EXPECTED_WEIGHT_SUM).abs() <= WEIGHT_SUM_TOLERANCE
}

fn parse_field<T: serde::de::DeserializeOwned>(
    field: &'static str,
    value: &Value,
) -> Result<T, FrameworkError> {
    serde_json::from_value(value.clone()).map_err(|e| FrameworkError::Schema {
        field,
        message: e.to_string(),
    })
}

fn parse_optional_field<T: serde::de::DeserializeOwned + Default>(
    field: &'static str,
    value: &Value,
) -> Result<T, FrameworkError> {
    if value.is_null() {
        Ok(T::default())
    } else {
        parse_field(field, value)
    }
}
