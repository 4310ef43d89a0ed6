//! Interview Prompt Builder: assembles the instruction string for the video-interview agent.
//!
//! Pure and deterministic: identical inputs always yield byte-identical prompts.
//! Missing or empty fields are replaced by fixed fallback phrases so no bullet is
//! ever rendered blank.
//!
//! The live interview and the prompt simulation use the same builder. They differ
//! only in the `InterviewContext` they pass (duration label).

use serde::{Deserialize, Serialize};

use crate::interview::prompts::*;
use crate::llm_client::prompts::fill_template;
use crate::models::interview::InterviewSnapshot;
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;

/// Resume excerpts longer than this are cut to keep the agent prompt compact.
const BACKGROUND_MAX_CHARS: usize = 600;
/// Number of job skills named explicitly in the task list.
const FOCUS_SKILL_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub background: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: String,
    pub description: String,
    pub requirements: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience: Option<String>,
}

/// A named interview criterion with its percentage weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeight {
    pub name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewContext {
    pub company: String,
    pub duration: String,
    pub language: String,
    /// Rendered in order.
    pub assessment_criteria: Vec<CriterionWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPromptData {
    pub candidate: CandidateProfile,
    pub job: JobProfile,
    pub interview_context: InterviewContext,
}

/// Criteria the agent is told to score against.
pub fn default_assessment_criteria() -> Vec<CriterionWeight> {
    [
        ("технические навыки", 40),
        ("коммуникация", 30),
        ("опыт", 20),
        ("мотивация", 10),
    ]
    .into_iter()
    .map(|(name, weight)| CriterionWeight {
        name: name.to_string(),
        weight,
    })
    .collect()
}

/// Builds the full agent instruction.
pub fn construct_interview_prompt(data: &InterviewPromptData) -> String {
    let InterviewPromptData {
        candidate,
        job,
        interview_context: ctx,
    } = data;

    let candidate_skills = if candidate.skills.is_empty() {
        NO_CANDIDATE_SKILLS.to_string()
    } else {
        format!("Навыки из резюме: {}", candidate.skills.join(", "))
    };

    let candidate_experience = match candidate.experience_years.filter(|&years| years > 0) {
        Some(years) => format!("Заявленный опыт: {years} лет"),
        None => NO_CANDIDATE_EXPERIENCE.to_string(),
    };

    let candidate_background = match non_blank(candidate.background.as_deref()) {
        Some(text) => format!("Краткое резюме: {}", truncate_chars(text, BACKGROUND_MAX_CHARS)),
        None => NO_CANDIDATE_BACKGROUND.to_string(),
    };

    let required_skills = if job.skills.is_empty() {
        NO_JOB_SKILLS.to_string()
    } else {
        format!("Ключевые навыки: {}", job.skills.join(", "))
    };

    let experience_band = non_blank(job.experience.as_deref()).unwrap_or(NO_EXPERIENCE_BAND);
    let job_description = non_blank(Some(job.description.as_str())).unwrap_or(NO_DESCRIPTION);
    let job_requirements = non_blank(Some(job.requirements.as_str())).unwrap_or(NO_REQUIREMENTS);

    fill_template(
        INTERVIEW_PROMPT_TEMPLATE,
        &[
            ("company", ctx.company.as_str()),
            ("duration", ctx.duration.as_str()),
            ("language", ctx.language.as_str()),
            ("candidate_name", candidate.name.as_str()),
            ("job_title", job.title.as_str()),
            ("candidate_skills", candidate_skills.as_str()),
            ("candidate_experience", candidate_experience.as_str()),
            ("candidate_background", candidate_background.as_str()),
            ("required_skills", required_skills.as_str()),
            ("experience_band", experience_band),
            ("job_description", job_description),
            ("job_requirements", job_requirements),
            ("focus_skills", focus_skills(&job.skills).as_str()),
            ("criteria_summary", criteria_summary(&ctx.assessment_criteria).as_str()),
        ],
    )
}

/// Context for a live interview, built from the stored interview snapshot.
pub fn interview_prompt_data(snapshot: &InterviewSnapshot, company: &str) -> InterviewPromptData {
    let resume = snapshot.latest_resume.as_ref();
    InterviewPromptData {
        candidate: CandidateProfile {
            name: snapshot.applicant_name.clone(),
            background: resume.and_then(|r| r.content.clone()),
            skills: resume.map(|r| r.skills.clone()).unwrap_or_default(),
            experience_years: resume.and_then(experience_years),
        },
        job: job_profile(&snapshot.job),
        interview_context: context(company, INTERVIEW_DURATION),
    }
}

/// Context for a prompt simulation: same builder, longer duration.
pub fn simulation_prompt_data(
    job: &JobRow,
    resume: &ResumeRow,
    applicant_name: &str,
    company: &str,
) -> InterviewPromptData {
    InterviewPromptData {
        candidate: CandidateProfile {
            name: applicant_name.to_string(),
            background: resume.content.clone(),
            skills: resume.skills.clone(),
            experience_years: experience_years(resume),
        },
        job: job_profile(job),
        interview_context: context(company, SIMULATION_DURATION),
    }
}

pub fn job_profile(job: &JobRow) -> JobProfile {
    JobProfile {
        title: job.title.clone(),
        description: job.description.clone(),
        requirements: job.requirements.clone(),
        skills: job.skills.clone(),
        experience: job.experience.clone(),
    }
}

fn context(company: &str, duration: &str) -> InterviewContext {
    InterviewContext {
        company: company.to_string(),
        duration: duration.to_string(),
        language: DEFAULT_LANGUAGE.to_string(),
        assessment_criteria: default_assessment_criteria(),
    }
}

fn experience_years(resume: &ResumeRow) -> Option<u32> {
    resume
        .experience
        .and_then(|y| u32::try_from(y).ok())
        .filter(|&y| y > 0)
}

/// First three job skills by position, with a tail marker when more exist.
fn focus_skills(skills: &[String]) -> String {
    if skills.is_empty() {
        return NO_FOCUS_SKILLS.to_string();
    }
    let head = skills
        .iter()
        .take(FOCUS_SKILL_COUNT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if skills.len() > FOCUS_SKILL_COUNT {
        format!("{head} и другие")
    } else {
        head
    }
}

fn criteria_summary(criteria: &[CriterionWeight]) -> String {
    if criteria.is_empty() {
        return NO_CRITERIA.to_string();
    }
    criteria
        .iter()
        .map(|c| format!("{} {}%", c.name, c.weight))
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> InterviewPromptData {
        InterviewPromptData {
            candidate: CandidateProfile {
                name: "Иван Петров".to_string(),
                background: Some("Backend-разработчик, 5 лет в финтехе".to_string()),
                skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
                experience_years: Some(5),
            },
            job: JobProfile {
                title: "Senior Backend Engineer".to_string(),
                description: "Разработка платёжных сервисов".to_string(),
                requirements: "5+ лет коммерческой разработки".to_string(),
                skills: vec![
                    "Rust".to_string(),
                    "Kafka".to_string(),
                    "PostgreSQL".to_string(),
                    "Kubernetes".to_string(),
                ],
                experience: Some("3-6 лет".to_string()),
            },
            interview_context: context("ВТБ", INTERVIEW_DURATION),
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let data = sample_data();
        assert_eq!(construct_interview_prompt(&data), construct_interview_prompt(&data));
    }

    #[test]
    fn test_prompt_opens_with_role_sentence() {
        let prompt = construct_interview_prompt(&sample_data());
        assert!(prompt.starts_with(
            "Вы - опытный HR-специалист ВТБ, проводящий 10-15 минут видеоинтервью"
        ));
        assert!(prompt.contains("собеседуете Иван Петров на позицию \"Senior Backend Engineer\""));
        assert!(prompt.ends_with("представления себя как HR-специалиста ВТБ."));
    }

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let prompt = construct_interview_prompt(&sample_data());
        let order = [
            "КОНТЕКСТ ИНТЕРВЬЮ:",
            "ОПИСАНИЕ ПОЗИЦИИ:",
            "КЛЮЧЕВЫЕ ТРЕБОВАНИЯ:",
            "ВАШИ ЗАДАЧИ:",
            "СТРАТЕГИЯ ИНТЕРВЬЮ:",
            "ВАЖНЫЕ ПРИНЦИПЫ:",
            "Начните интервью",
        ];
        let positions: Vec<usize> = order.iter().map(|s| prompt.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn test_empty_candidate_skills_use_fallback_phrase() {
        let mut data = sample_data();
        data.candidate.skills.clear();
        let prompt = construct_interview_prompt(&data);
        assert!(prompt.contains(&format!("• {NO_CANDIDATE_SKILLS}")));
        assert!(!prompt.contains("Навыки из резюме: \n"));
        assert!(!prompt.contains("• \n"));
    }

    #[test]
    fn test_missing_optional_fields_use_fallbacks() {
        let mut data = sample_data();
        data.candidate.experience_years = None;
        data.candidate.background = Some("   ".to_string());
        data.job.experience = None;
        data.job.skills.clear();
        let prompt = construct_interview_prompt(&data);
        assert!(prompt.contains(NO_CANDIDATE_EXPERIENCE));
        assert!(prompt.contains(NO_CANDIDATE_BACKGROUND));
        assert!(prompt.contains(&format!("Требования к опыту: {NO_EXPERIENCE_BAND}")));
        assert!(prompt.contains(NO_JOB_SKILLS));
        assert!(prompt.contains(&format!("Оценить технические навыки: {NO_FOCUS_SKILLS}")));
    }

    #[test]
    fn test_zero_experience_uses_fallback_phrase() {
        let mut data = sample_data();
        data.candidate.experience_years = Some(0);
        let prompt = construct_interview_prompt(&data);
        assert!(prompt.contains(NO_CANDIDATE_EXPERIENCE));
        assert!(!prompt.contains("Заявленный опыт: 0 лет"));
    }

    #[test]
    fn test_task_list_names_top_three_job_skills() {
        let prompt = construct_interview_prompt(&sample_data());
        assert!(prompt.contains("2. Оценить технические навыки: Rust, Kafka, PostgreSQL и другие"));
    }

    #[test]
    fn test_three_or_fewer_skills_have_no_tail_marker() {
        assert_eq!(focus_skills(&["Go".to_string(), "SQL".to_string()]), "Go, SQL");
    }

    #[test]
    fn test_criteria_weights_rendered_in_order() {
        let prompt = construct_interview_prompt(&sample_data());
        assert!(prompt.contains(
            "(технические навыки 40%, коммуникация 30%, опыт 20%, мотивация 10%)"
        ));
    }

    #[test]
    fn test_simulation_variant_differs_only_in_duration() {
        let interview = sample_data();
        let mut simulation = sample_data();
        simulation.interview_context.duration = SIMULATION_DURATION.to_string();
        let a = construct_interview_prompt(&interview);
        let b = construct_interview_prompt(&simulation);
        assert_eq!(a.replace(INTERVIEW_DURATION, SIMULATION_DURATION), b);
    }

    #[test]
    fn test_long_background_is_truncated() {
        let mut data = sample_data();
        data.candidate.background = Some("я".repeat(BACKGROUND_MAX_CHARS + 50));
        let prompt = construct_interview_prompt(&data);
        let expected = format!("Краткое резюме: {}…", "я".repeat(BACKGROUND_MAX_CHARS));
        assert!(prompt.contains(&expected));
    }

    #[test]
    fn test_placeholder_text_in_candidate_name_is_not_expanded() {
        let mut data = sample_data();
        data.candidate.name = "{company}".to_string();
        let prompt = construct_interview_prompt(&data);
        assert!(prompt.contains("Кандидат: {company}"));
    }
}
