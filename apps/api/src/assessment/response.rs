//! Strict parser for evaluator replies.
//!
//! A reply is accepted only if, after removing an optional markdown fence, the
//! remaining text is exactly one JSON object. Text around the object is rejected
//! rather than searched for braces.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::assessment::scoring::Recommendation;
use crate::llm_client::strip_json_fences;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("reply is not a single JSON object: {0}")]
    Malformed(String),
}

/// Per-criterion result. The evaluator may send either the full object or a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCriterionScore")]
pub struct CriterionScore {
    pub score: f64,
    pub evidence: Vec<String>,
    pub subcriteria: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCriterionScore {
    Bare(f64),
    Full {
        score: f64,
        #[serde(default)]
        evidence: Vec<String>,
        #[serde(default)]
        subcriteria: BTreeMap<String, f64>,
    },
}

impl From<RawCriterionScore> for CriterionScore {
    fn from(raw: RawCriterionScore) -> Self {
        match raw {
            RawCriterionScore::Bare(score) => Self {
                score,
                evidence: Vec::new(),
                subcriteria: BTreeMap::new(),
            },
            RawCriterionScore::Full {
                score,
                evidence,
                subcriteria,
            } => Self {
                score,
                evidence,
                subcriteria,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub time: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReply {
    #[serde(default)]
    pub criteria_scores: BTreeMap<String, CriterionScore>,
    pub overall_score: Option<f64>,
    pub confidence: Option<f64>,
    pub recommendation: Option<Recommendation>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub detailed_feedback: Option<String>,
    #[serde(default)]
    pub timestamps: Vec<Timestamp>,
    pub processing_notes: Option<String>,
    pub emotional_analysis: Option<Value>,
}

impl EvaluationReply {
    /// Scores keyed by criterion, as the aggregator consumes them.
    pub fn score_map(&self) -> BTreeMap<String, f64> {
        self.criteria_scores
            .iter()
            .map(|(key, score)| (key.clone(), score.score))
            .collect()
    }
}

pub fn parse_evaluation_reply(text: &str) -> Result<EvaluationReply, ResponseError> {
    parse_json_object(text)
}

/// Fence-tolerant, otherwise strict: the body must be one JSON object and nothing else.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, ResponseError> {
    let body = strip_json_fences(text);
    let value: Value =
        serde_json::from_str(body).map_err(|e| ResponseError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(ResponseError::Malformed(format!(
            "expected an object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| ResponseError::Malformed(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
        "criteria_scores": {
            "technical": {"score": 85, "evidence": ["Уверенно объяснил хуки"], "subcriteria": {"coding_skills": 80}},
            "communication": 70
        },
        "overall_score": 82,
        "confidence": 90,
        "recommendation": "HIRE",
        "strengths": ["React"],
        "weaknesses": [],
        "red_flags": [],
        "detailed_feedback": "Хороший кандидат",
        "timestamps": [{"time": "01:23", "event": "Отличный ответ"}],
        "processing_notes": "ok"
    }"#;

    #[test]
    fn test_plain_object_parses() {
        let reply = parse_evaluation_reply(REPLY).unwrap();
        assert_eq!(reply.overall_score, Some(82.0));
        assert_eq!(reply.recommendation, Some(Recommendation::Hire));
        assert_eq!(reply.criteria_scores["technical"].subcriteria["coding_skills"], 80.0);
        assert_eq!(reply.timestamps[0].time, "01:23");
    }

    #[test]
    fn test_bare_number_criterion_score() {
        let reply = parse_evaluation_reply(REPLY).unwrap();
        let communication = &reply.criteria_scores["communication"];
        assert_eq!(communication.score, 70.0);
        assert!(communication.evidence.is_empty());
        assert_eq!(reply.score_map()["technical"], 85.0);
    }

    #[test]
    fn test_fenced_reply_matches_unfenced() {
        let fenced = format!("```json\n{REPLY}\n```");
        assert_eq!(
            parse_evaluation_reply(&fenced).unwrap(),
            parse_evaluation_reply(REPLY).unwrap()
        );
    }

    #[test]
    fn test_uppercase_fence_tag_tolerated() {
        let fenced = "```JSON\n{\"criteria_scores\": {\"technical\": 80}, \"confidence\": 90}\n```";
        let reply = parse_evaluation_reply(fenced).unwrap();
        assert_eq!(reply.score_map()["technical"], 80.0);
        assert_eq!(reply.confidence, Some(90.0));
    }

    #[test]
    fn test_non_json_fence_tag_tolerated() {
        let fenced = format!("```javascript\n{REPLY}\n```");
        assert_eq!(
            parse_evaluation_reply(&fenced).unwrap(),
            parse_evaluation_reply(REPLY).unwrap()
        );
    }

    #[test]
    fn test_prose_around_object_rejected() {
        let text = format!("Вот результат анализа:\n{REPLY}\nНадеюсь, это поможет.");
        assert!(matches!(
            parse_evaluation_reply(&text),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_trailing_text_rejected() {
        let text = format!("{REPLY} готово");
        assert!(parse_evaluation_reply(&text).is_err());
    }

    #[test]
    fn test_two_objects_rejected() {
        assert!(parse_json_object::<Value>("{\"a\": 1} {\"b\": 2}").is_err());
    }

    #[test]
    fn test_array_rejected() {
        let err = parse_json_object::<Value>("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_minimal_reply_uses_defaults() {
        let reply = parse_evaluation_reply("{\"criteria_scores\": {\"technical\": 60}}").unwrap();
        assert_eq!(reply.overall_score, None);
        assert_eq!(reply.confidence, None);
        assert!(reply.strengths.is_empty());
        assert!(reply.timestamps.is_empty());
    }

    #[test]
    fn test_unknown_recommendation_rejected() {
        assert!(parse_evaluation_reply("{\"recommendation\": \"MAYBE\"}").is_err());
    }
}
