//! Resume Matching: how well one resume fits one job, on a 0–100 scale.
//!
//! - `LlmResumeMatcher` asks the model for a scored analysis (one call, strict JSON).
//! - `KeywordResumeMatcher` is a deterministic skills/experience/education heuristic.
//! - `FallbackMatcher` runs a primary matcher and degrades to keywords when it fails.
//!
//! `AppState` holds an `Arc<dyn ResumeMatcher>`, wired in `main`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::response::{parse_json_object, ResponseError};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{GenerativeModel, LlmError};
use crate::matching::prompts::*;
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;

pub const STRONG_MATCH_THRESHOLD: u32 = 85;
pub const GOOD_MATCH_THRESHOLD: u32 = 70;
pub const WEAK_MATCH_THRESHOLD: u32 = 50;

const SKILLS_WEIGHT: f64 = 0.5;
const EXPERIENCE_WEIGHT: f64 = 0.3;
const EDUCATION_WEIGHT: f64 = 0.2;

/// Keyword scores are a heuristic; report them with moderate confidence.
const KEYWORD_CONFIDENCE: u32 = 70;
const RECOMMENDED_SKILLS_SHOWN: usize = 3;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("matcher call failed: {0}")]
    UpstreamCallFailed(#[from] LlmError),

    #[error("matcher reply could not be parsed: {0}")]
    MalformedResponse(#[from] ResponseError),
}

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchRecommendation {
    StrongMatch,
    GoodMatch,
    WeakMatch,
    NoMatch,
}

impl MatchRecommendation {
    pub fn from_score(score: u32) -> Self {
        if score >= STRONG_MATCH_THRESHOLD {
            Self::StrongMatch
        } else if score >= GOOD_MATCH_THRESHOLD {
            Self::GoodMatch
        } else if score >= WEAK_MATCH_THRESHOLD {
            Self::WeakMatch
        } else {
            Self::NoMatch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongMatch => "STRONG_MATCH",
            Self::GoodMatch => "GOOD_MATCH",
            Self::WeakMatch => "WEAK_MATCH",
            Self::NoMatch => "NO_MATCH",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedAnalysis {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_gap: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub red_flags: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub overall_score: u32,
    pub skills_match: u32,
    pub experience_match: u32,
    pub education_match: u32,
    pub confidence: u32,
    pub detailed_analysis: DetailedAnalysis,
    pub recommendation: MatchRecommendation,
    pub reasoning_notes: String,
    pub scorer_backend: String, // "llm" | "keyword"
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeMatcher: Send + Sync {
    async fn score(
        &self,
        job: &JobRow,
        resume: &ResumeRow,
        applicant_name: &str,
    ) -> Result<MatchReport, MatchError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResumeMatcher
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeMatcher {
    model: Arc<dyn GenerativeModel>,
}

impl LlmResumeMatcher {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

/// Model reply. Scores arrive as JSON numbers and are rounded into 0..=100.
#[derive(Debug, Deserialize)]
struct MatchReply {
    overall_score: f64,
    skills_match: f64,
    experience_match: f64,
    education_match: f64,
    confidence: f64,
    detailed_analysis: DetailedAnalysis,
    recommendation: MatchRecommendation,
    #[serde(default)]
    reasoning_notes: String,
}

impl MatchReply {
    fn into_report(self) -> MatchReport {
        MatchReport {
            overall_score: percent(self.overall_score),
            skills_match: percent(self.skills_match),
            experience_match: percent(self.experience_match),
            education_match: percent(self.education_match),
            confidence: percent(self.confidence),
            detailed_analysis: self.detailed_analysis,
            recommendation: self.recommendation,
            reasoning_notes: self.reasoning_notes,
            scorer_backend: "llm".to_string(),
        }
    }
}

#[async_trait]
impl ResumeMatcher for LlmResumeMatcher {
    async fn score(
        &self,
        job: &JobRow,
        resume: &ResumeRow,
        applicant_name: &str,
    ) -> Result<MatchReport, MatchError> {
        let prompt = build_match_prompt(job, resume, applicant_name);
        let text = self.model.generate(&prompt, None).await?;
        let report = parse_json_object::<MatchReply>(&text)?.into_report();
        info!(
            "Resume {} vs job {}: {} ({})",
            resume.id,
            job.id,
            report.overall_score,
            report.recommendation.as_str()
        );
        Ok(report)
    }
}

pub fn build_match_prompt(job: &JobRow, resume: &ResumeRow, applicant_name: &str) -> String {
    let job_skills = join_or(&job.skills, NO_SKILLS);
    let candidate_skills = join_or(&resume.skills, NO_SKILLS);
    let candidate_experience = format!("{} лет", resume.experience.unwrap_or(0).max(0));

    fill_template(
        RESUME_MATCH_PROMPT_TEMPLATE,
        &[
            ("job_title", job.title.as_str()),
            ("job_description", job.description.as_str()),
            ("job_requirements", job.requirements.as_str()),
            ("job_skills", job_skills.as_str()),
            ("job_experience", non_blank(job.experience.as_deref()).unwrap_or(NO_JOB_EXPERIENCE)),
            ("candidate_name", non_blank(Some(applicant_name)).unwrap_or(NO_CANDIDATE_NAME)),
            ("candidate_summary", non_blank(resume.ai_summary.as_deref()).unwrap_or(NO_SUMMARY)),
            ("candidate_skills", candidate_skills.as_str()),
            ("candidate_experience", candidate_experience.as_str()),
            ("candidate_education", non_blank(resume.education.as_deref()).unwrap_or(NO_EDUCATION)),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordResumeMatcher
// ────────────────────────────────────────────────────────────────────────────

/// No model call. Algorithm:
/// 1. A job skill matches when it and some resume skill contain one another (case-insensitive)
/// 2. skills = matched / required × 100 (50 when the job lists no skills)
/// 3. experience from declared years vs the first number in the job's experience band
/// 4. education = 80 when the resume names one, else 60
/// 5. overall = 0.5 × skills + 0.3 × experience + 0.2 × education
pub struct KeywordResumeMatcher;

#[async_trait]
impl ResumeMatcher for KeywordResumeMatcher {
    async fn score(
        &self,
        job: &JobRow,
        resume: &ResumeRow,
        _applicant_name: &str,
    ) -> Result<MatchReport, MatchError> {
        Ok(compute_keyword_match(job, resume))
    }
}

fn compute_keyword_match(job: &JobRow, resume: &ResumeRow) -> MatchReport {
    let resume_skills: Vec<String> = resume
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let (matched, missing): (Vec<String>, Vec<String>) = job
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .partition(|skill| {
            let skill = skill.to_lowercase();
            resume_skills
                .iter()
                .any(|have| have.contains(&skill) || skill.contains(have.as_str()))
        });

    let required = matched.len() + missing.len();
    let skills_match = if required == 0 {
        50.0
    } else {
        matched.len() as f64 / required as f64 * 100.0
    };
    let experience_match = experience_match(resume.experience, job.experience.as_deref());
    let education_match = if non_blank(resume.education.as_deref()).is_some() {
        80.0
    } else {
        60.0
    };

    let overall_score = percent(
        skills_match * SKILLS_WEIGHT
            + experience_match * EXPERIENCE_WEIGHT
            + education_match * EDUCATION_WEIGHT,
    );

    let mut analysis = DetailedAnalysis::default();
    if !matched.is_empty() {
        analysis
            .strengths
            .push(format!("Владеет {} из {required} требуемых навыков", matched.len()));
    }
    if !missing.is_empty() {
        analysis
            .weaknesses
            .push(format!("Отсутствуют навыки: {}", missing.join(", ")));
        let shown: Vec<&str> = missing
            .iter()
            .take(RECOMMENDED_SKILLS_SHOWN)
            .map(String::as_str)
            .collect();
        analysis
            .recommendations
            .push(format!("Рекомендуется изучить: {}", shown.join(", ")));
    }
    let reasoning_notes = format!("Базовый анализ: {}/{required} навыков совпадает", matched.len());
    analysis.matched_skills = matched;
    analysis.missing_skills = missing;

    MatchReport {
        overall_score,
        skills_match: percent(skills_match),
        experience_match: percent(experience_match),
        education_match: percent(education_match),
        confidence: KEYWORD_CONFIDENCE,
        detailed_analysis: analysis,
        recommendation: MatchRecommendation::from_score(overall_score),
        reasoning_notes,
        scorer_backend: "keyword".to_string(),
    }
}

/// 70 when the job states no parseable requirement; otherwise banded by the
/// share of required years the candidate declares.
fn experience_match(declared_years: Option<i32>, job_experience: Option<&str>) -> f64 {
    let Some(required) = job_experience.and_then(first_number) else {
        return 70.0;
    };
    let years = f64::from(declared_years.unwrap_or(0).max(0));
    let required = f64::from(required);

    if years >= required {
        100.0
    } else if years >= required * 0.7 {
        80.0
    } else if years >= required * 0.5 {
        60.0
    } else if years > 0.0 {
        40.0
    } else {
        20.0
    }
}

fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ────────────────────────────────────────────────────────────────────────────
// FallbackMatcher
// ────────────────────────────────────────────────────────────────────────────

/// Runs `primary`; on any failure logs it and returns the keyword match instead.
pub struct FallbackMatcher {
    primary: Arc<dyn ResumeMatcher>,
    fallback: KeywordResumeMatcher,
}

impl FallbackMatcher {
    pub fn new(primary: Arc<dyn ResumeMatcher>) -> Self {
        Self {
            primary,
            fallback: KeywordResumeMatcher,
        }
    }
}

#[async_trait]
impl ResumeMatcher for FallbackMatcher {
    async fn score(
        &self,
        job: &JobRow,
        resume: &ResumeRow,
        applicant_name: &str,
    ) -> Result<MatchReport, MatchError> {
        match self.primary.score(job, resume, applicant_name).await {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!("Resume {} match fell back to keywords: {err}", resume.id);
                self.fallback.score(job, resume, applicant_name).await
            }
        }
    }
}

fn percent(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use uuid::Uuid;

    use crate::assessment::orchestrator::tests::{job, ScriptedModel};

    fn resume(skills: &[&str], experience: Option<i32>, education: Option<&str>) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            file_name: "cv.pdf".to_string(),
            content: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience,
            education: education.map(str::to_string),
            ai_summary: Some("Фронтенд-разработчик".to_string()),
            uploaded_at: Utc::now(),
        }
    }

    const REPLY: &str = r#"```JSON
{
  "overall_score": 104,
  "skills_match": 90.4,
  "experience_match": 80,
  "education_match": 70,
  "confidence": 85,
  "detailed_analysis": {
    "matched_skills": ["React"],
    "missing_skills": ["TypeScript"],
    "experience_gap": null,
    "strengths": ["Сильный React"],
    "weaknesses": [],
    "red_flags": [],
    "recommendations": ["Подтянуть TypeScript"]
  },
  "recommendation": "STRONG_MATCH",
  "reasoning_notes": "Почти полное совпадение"
}
```"#;

    #[test]
    fn test_keyword_match_is_case_insensitive_and_weighted() {
        // job: React, TypeScript; "2-4 года"
        let job = job(Uuid::new_v4());
        let report = compute_keyword_match(&job, &resume(&["react", "Redux"], Some(3), Some("МГУ")));
        assert_eq!(report.detailed_analysis.matched_skills, vec!["React"]);
        assert_eq!(report.detailed_analysis.missing_skills, vec!["TypeScript"]);
        assert_eq!(report.skills_match, 50);
        assert_eq!(report.experience_match, 100);
        assert_eq!(report.education_match, 80);
        // 25 + 30 + 16
        assert_eq!(report.overall_score, 71);
        assert_eq!(report.recommendation, MatchRecommendation::GoodMatch);
        assert_eq!(report.confidence, KEYWORD_CONFIDENCE);
        assert_eq!(report.scorer_backend, "keyword");
        assert_eq!(report.reasoning_notes, "Базовый анализ: 1/2 навыков совпадает");
        assert_eq!(
            report.detailed_analysis.recommendations,
            vec!["Рекомендуется изучить: TypeScript"]
        );
    }

    #[test]
    fn test_job_without_skills_scores_fifty_on_skills() {
        let mut job = job(Uuid::new_v4());
        job.skills.clear();
        job.experience = None;
        let report = compute_keyword_match(&job, &resume(&["Rust"], None, None));
        assert_eq!(report.skills_match, 50);
        assert_eq!(report.experience_match, 70);
        assert_eq!(report.education_match, 60);
        // 25 + 21 + 12
        assert_eq!(report.overall_score, 58);
        assert!(report.detailed_analysis.strengths.is_empty());
    }

    #[test]
    fn test_blank_resume_skill_matches_nothing() {
        let job = job(Uuid::new_v4());
        let report = compute_keyword_match(&job, &resume(&["  "], None, None));
        assert!(report.detailed_analysis.matched_skills.is_empty());
    }

    #[test]
    fn test_experience_bands() {
        let cases = [
            (Some(5), Some("от 5 лет"), 100.0),
            (Some(4), Some("5+ лет"), 80.0),
            (Some(3), Some("5 лет"), 60.0),
            (Some(1), Some("5 лет"), 40.0),
            (None, Some("5 лет"), 20.0),
            (Some(2), Some("без опыта"), 70.0),
            (Some(2), None, 70.0),
        ];
        for (declared, band, expected) in cases {
            assert_eq!(experience_match(declared, band), expected, "{declared:?} vs {band:?}");
        }
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(MatchRecommendation::from_score(85), MatchRecommendation::StrongMatch);
        assert_eq!(MatchRecommendation::from_score(84), MatchRecommendation::GoodMatch);
        assert_eq!(MatchRecommendation::from_score(70), MatchRecommendation::GoodMatch);
        assert_eq!(MatchRecommendation::from_score(69), MatchRecommendation::WeakMatch);
        assert_eq!(MatchRecommendation::from_score(50), MatchRecommendation::WeakMatch);
        assert_eq!(MatchRecommendation::from_score(49), MatchRecommendation::NoMatch);
    }

    #[tokio::test]
    async fn test_llm_match_parses_fenced_reply_and_clamps() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPLY.to_string())]));
        let matcher = LlmResumeMatcher::new(model.clone());
        let job = job(Uuid::new_v4());
        let report = matcher
            .score(&job, &resume(&["React"], Some(3), None), "Анна Кузнецова")
            .await
            .unwrap();

        assert_eq!(report.overall_score, 100);
        assert_eq!(report.skills_match, 90);
        assert_eq!(report.recommendation, MatchRecommendation::StrongMatch);
        assert_eq!(report.detailed_analysis.experience_gap, None);
        assert_eq!(report.scorer_backend, "llm");

        let prompts = model.prompts.lock().unwrap();
        let (prompt, fps) = &prompts[0];
        assert!(fps.is_none());
        assert!(prompt.contains("Название: Frontend Developer"));
        assert!(prompt.contains("Имя: Анна Кузнецова"));
        assert!(prompt.contains("Опыт работы: 3 лет"));
        assert!(prompt.contains("\"overall_score\": число от 0 до 100"));
    }

    #[tokio::test]
    async fn test_llm_reply_without_recommendation_is_malformed() {
        let reply = r#"{"overall_score": 60, "skills_match": 60, "experience_match": 60,
            "education_match": 60, "confidence": 50, "detailed_analysis": {}}"#;
        let model = Arc::new(ScriptedModel::new(vec![Ok(reply.to_string())]));
        let err = LlmResumeMatcher::new(model)
            .score(&job(Uuid::new_v4()), &resume(&[], None, None), "")
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fallback_keeps_model_report() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPLY.to_string())]));
        let matcher = FallbackMatcher::new(Arc::new(LlmResumeMatcher::new(model)));
        let report = matcher
            .score(&job(Uuid::new_v4()), &resume(&["React"], Some(3), None), "Анна")
            .await
            .unwrap();
        assert_eq!(report.scorer_backend, "llm");
    }

    #[tokio::test]
    async fn test_fallback_uses_keywords_when_model_fails() {
        let model = Arc::new(ScriptedModel::new(vec![Err(LlmError::EmptyContent)]));
        let matcher = FallbackMatcher::new(Arc::new(LlmResumeMatcher::new(model.clone())));
        let report = matcher
            .score(&job(Uuid::new_v4()), &resume(&["react"], Some(3), Some("МГУ")), "Анна")
            .await
            .unwrap();
        assert_eq!(report.scorer_backend, "keyword");
        assert_eq!(report.overall_score, 71);
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prompt_fallbacks_for_sparse_resume() {
        let mut job = job(Uuid::new_v4());
        job.experience = Some("  ".to_string());
        let mut sparse = resume(&[], None, None);
        sparse.ai_summary = None;
        let prompt = build_match_prompt(&job, &sparse, " ");
        assert!(prompt.contains(&format!("Имя: {NO_CANDIDATE_NAME}\n")));
        assert!(prompt.contains(&format!("Краткое описание: {NO_SUMMARY}\n")));
        assert!(prompt.contains(&format!("Навыки: {NO_SKILLS}\n")));
        assert!(prompt.contains(&format!("Опыт: {NO_JOB_EXPERIENCE}\n")));
        assert!(prompt.contains("Опыт работы: 0 лет\n"));
        assert!(prompt.contains(&format!("Образование: {NO_EDUCATION}\n")));
    }
}
