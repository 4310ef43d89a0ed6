//! Evaluation prompt assembly for video analysis.
//!
//! Renders the framework's criteria tree as an indented outline, the job and
//! candidate context, and the red-flag instructions switched on by the framework.

use serde::{Deserialize, Serialize};

use crate::assessment::framework::{Criterion, FrameworkConfig, RedFlagsConfig};
use crate::assessment::prompts::*;
use crate::interview::prompt_builder::JobProfile;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: Option<u32>,
    pub resume_summary: Option<String>,
}

/// Optional facts about the recording, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_minutes: Option<f64>,
    pub file_size_mb: Option<f64>,
}

pub struct EvaluationPromptInput<'a> {
    pub framework_name: &'a str,
    pub framework_version: &'a str,
    pub config: &'a FrameworkConfig,
    pub job: &'a JobProfile,
    pub candidate: &'a CandidateInfo,
    pub video: Option<&'a VideoMetadata>,
}

pub fn build_evaluation_prompt(input: &EvaluationPromptInput<'_>) -> String {
    let config = input.config;

    let mut optional = Vec::new();
    if let Some(video) = input.video.and_then(video_section) {
        optional.push(video);
    }
    let red_flags = red_flag_instructions(&config.red_flags);
    if !red_flags.is_empty() {
        optional.push(red_flags);
    }
    if let Some(custom) = non_blank(config.analysis.custom_prompts.red_flags_detection.as_deref()) {
        optional.push(custom.to_string());
    }
    if let Some(custom) = non_blank(config.analysis.custom_prompts.main_analysis.as_deref()) {
        optional.push(custom.to_string());
    }
    if config.analysis.analyze_emotions {
        optional.push(EMOTIONAL_ANALYSIS_PROMPT.to_string());
    }
    let optional_sections: String = optional.iter().map(|s| format!("\n{s}\n")).collect();

    let emotional_schema = if config.analysis.analyze_emotions {
        EMOTIONAL_SCHEMA_FIELD
    } else {
        ""
    };

    let criteria_keys = ordered_criteria(config)
        .iter()
        .map(|(key, _)| format!("\"{key}\""))
        .collect::<Vec<_>>()
        .join(", ");

    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("framework_name", input.framework_name),
            ("framework_version", input.framework_version),
            ("job_context", format_job_context(input.job).as_str()),
            ("candidate_info", format_candidate_info(input.candidate).as_str()),
            ("criteria_outline", format_criteria_outline(config).as_str()),
            ("optional_sections", optional_sections.as_str()),
            ("emotional_schema", emotional_schema),
            ("criteria_keys", criteria_keys.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

/// One line per enabled toggle under a fixed header; empty when nothing is enabled.
pub fn red_flag_instructions(config: &RedFlagsConfig) -> String {
    if !config.any_enabled() {
        return String::new();
    }

    let mut lines = vec![RED_FLAGS_HEADER.to_string()];
    if config.detect_inconsistencies {
        lines.push(RED_FLAG_INCONSISTENCIES.to_string());
    }
    if config.detect_evasiveness {
        lines.push(RED_FLAG_EVASIVENESS.to_string());
    }
    if config.detect_template_answers {
        lines.push(RED_FLAG_TEMPLATE_ANSWERS.to_string());
    }
    if let Some(threshold) = config.confidence_threshold() {
        lines.push(format!("- Низкий уровень уверенности (менее {threshold}%)"));
    }
    if let Some(seconds) = config.pause_threshold_seconds() {
        lines.push(format!("- Чрезмерные паузы (более {seconds} секунд)"));
    }
    lines.join("\n")
}

/// Heaviest criteria first; ties broken by key so the order is stable.
fn ordered_criteria(config: &FrameworkConfig) -> Vec<(&String, &Criterion)> {
    let mut criteria: Vec<_> = config.criteria.iter().collect();
    criteria.sort_by(|(a_key, _), (b_key, _)| {
        let a = config.weights.get(*a_key).copied().unwrap_or(0.0);
        let b = config.weights.get(*b_key).copied().unwrap_or(0.0);
        b.total_cmp(&a).then_with(|| a_key.cmp(b_key))
    });
    criteria
}

fn format_criteria_outline(config: &FrameworkConfig) -> String {
    ordered_criteria(config)
        .into_iter()
        .map(|(key, criterion)| {
            let weight = config.weights.get(key).copied().unwrap_or(0.0);
            let mut block = format!(
                "• {} (вес: {}%) - {}",
                key.to_uppercase(),
                format_weight(weight),
                criterion.description
            );
            for (sub_key, sub) in &criterion.subcriteria {
                block.push_str(&format!(
                    "\n  - {}: {}% - {}",
                    sub_key,
                    format_weight(sub.weight),
                    sub.description
                ));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_candidate_info(candidate: &CandidateInfo) -> String {
    let mut parts = vec![format!("• Имя: {}", candidate.name)];
    if !candidate.skills.is_empty() {
        parts.push(format!("• Навыки из резюме: {}", candidate.skills.join(", ")));
    }
    if let Some(years) = candidate.experience_years.filter(|&y| y > 0) {
        parts.push(format!("• Заявленный опыт: {years} лет"));
    }
    if let Some(summary) = non_blank(candidate.resume_summary.as_deref()) {
        parts.push(format!("• Краткое резюме: {summary}"));
    }
    parts.join("\n")
}

fn format_job_context(job: &JobProfile) -> String {
    let skills = if job.skills.is_empty() {
        NO_JOB_SKILLS.to_string()
    } else {
        job.skills.join(", ")
    };
    let experience = non_blank(job.experience.as_deref()).unwrap_or(NO_EXPERIENCE_BAND);
    format!(
        "• Позиция: {}\n• Требуемые навыки: {}\n• Требования к опыту: {}\n\nОПИСАНИЕ ПОЗИЦИИ:\n{}\n\nКЛЮЧЕВЫЕ ТРЕБОВАНИЯ:\n{}",
        job.title, skills, experience, job.description, job.requirements
    )
}

fn video_section(video: &VideoMetadata) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(minutes) = video.duration_minutes {
        lines.push(format!("- Длительность записи: {minutes:.0} мин"));
    }
    if let Some(mb) = video.file_size_mb {
        lines.push(format!("- Размер файла: {mb:.1} МБ"));
    }
    if lines.is_empty() {
        None
    } else {
        Some(format!("ЗАПИСЬ ИНТЕРВЬЮ:\n{}", lines.join("\n")))
    }
}

fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{}", weight as i64)
    } else {
        format!("{weight}")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::framework::tests::tech_interview;

    fn job() -> JobProfile {
        JobProfile {
            title: "Frontend Developer".to_string(),
            description: "Разработка интерфейсов".to_string(),
            requirements: "React, TypeScript".to_string(),
            skills: vec!["React".to_string(), "TypeScript".to_string()],
            experience: None,
        }
    }

    fn candidate() -> CandidateInfo {
        CandidateInfo {
            name: "Мария Смирнова".to_string(),
            skills: vec![],
            experience_years: Some(3),
            resume_summary: None,
        }
    }

    fn build(config: &FrameworkConfig) -> String {
        let job = job();
        let candidate = candidate();
        build_evaluation_prompt(&EvaluationPromptInput {
            framework_name: "Tech Interview",
            framework_version: "1.0",
            config,
            job: &job,
            candidate: &candidate,
            video: None,
        })
    }

    #[test]
    fn test_methodology_line_names_framework_and_version() {
        let prompt = build(&tech_interview());
        assert!(prompt.starts_with(
            "Вы - эксперт по анализу видео интервью, использующий методологию \"Tech Interview\" v1.0."
        ));
    }

    #[test]
    fn test_criteria_outline_heaviest_first_with_subcriteria() {
        let outline = format_criteria_outline(&tech_interview());
        assert!(outline.starts_with("• TECHNICAL (вес: 50%) - Технические навыки и знания"));
        assert!(outline.contains("\n  - coding_skills: 40% - Навыки программирования и алгоритмы"));
        let technical = outline.find("TECHNICAL").unwrap();
        let communication = outline.find("COMMUNICATION").unwrap();
        let soft = outline.find("SOFT_SKILLS").unwrap();
        assert!(technical < communication && communication < soft);
    }

    #[test]
    fn test_red_flags_render_enabled_toggles_only() {
        let config = RedFlagsConfig {
            detect_inconsistencies: true,
            detect_evasiveness: false,
            detect_template_answers: true,
            confidence_threshold: None,
            pause_threshold_seconds: Some(10),
        };
        let text = red_flag_instructions(&config);
        assert_eq!(
            text,
            format!(
                "{RED_FLAGS_HEADER}\n{RED_FLAG_INCONSISTENCIES}\n{RED_FLAG_TEMPLATE_ANSWERS}\n- Чрезмерные паузы (более 10 секунд)"
            )
        );
    }

    #[test]
    fn test_zero_thresholds_count_as_unset() {
        let config = RedFlagsConfig {
            detect_evasiveness: true,
            confidence_threshold: Some(0),
            pause_threshold_seconds: Some(0),
            ..Default::default()
        };
        assert_eq!(
            red_flag_instructions(&config),
            format!("{RED_FLAGS_HEADER}\n{RED_FLAG_EVASIVENESS}")
        );

        let only_zeros = RedFlagsConfig {
            confidence_threshold: Some(0),
            pause_threshold_seconds: Some(0),
            ..Default::default()
        };
        assert!(red_flag_instructions(&only_zeros).is_empty());
    }

    #[test]
    fn test_zero_experience_omitted_from_candidate_info() {
        let mut info = candidate();
        info.experience_years = Some(0);
        assert!(!format_candidate_info(&info).contains("Заявленный опыт"));
    }

    #[test]
    fn test_no_red_flags_renders_nothing() {
        assert!(red_flag_instructions(&RedFlagsConfig::default()).is_empty());
        let mut config = tech_interview();
        config.red_flags = RedFlagsConfig::default();
        assert!(!build(&config).contains(RED_FLAGS_HEADER));
    }

    #[test]
    fn test_emotional_block_follows_config() {
        let mut config = tech_interview();
        assert!(build(&config).contains("emotional_analysis"));
        config.analysis.analyze_emotions = false;
        assert!(!build(&config).contains("emotional_analysis"));
    }

    #[test]
    fn test_custom_main_prompt_included() {
        let prompt = build(&tech_interview());
        assert!(prompt.contains("Focus on problem-solving approach"));
    }

    #[test]
    fn test_candidate_info_omits_missing_fields() {
        let info = format_candidate_info(&candidate());
        assert_eq!(info, "• Имя: Мария Смирнова\n• Заявленный опыт: 3 лет");
    }

    #[test]
    fn test_json_schema_survives_templating() {
        let prompt = build(&tech_interview());
        assert!(prompt.contains("\"criteria_scores\": {"));
        assert!(prompt.contains("\"technical\", \"communication\", \"experience\", \"soft_skills\""));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_video_metadata_section() {
        let video = VideoMetadata {
            duration_minutes: Some(14.0),
            file_size_mb: None,
        };
        assert_eq!(
            video_section(&video).unwrap(),
            "ЗАПИСЬ ИНТЕРВЬЮ:\n- Длительность записи: 14 мин"
        );
        assert!(video_section(&VideoMetadata::default()).is_none());
    }

    #[test]
    fn test_fractional_weight_formatting() {
        assert_eq!(format_weight(50.0), "50");
        assert_eq!(format_weight(33.5), "33.5");
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let config = tech_interview();
        assert_eq!(build(&config), build(&config));
    }
}
