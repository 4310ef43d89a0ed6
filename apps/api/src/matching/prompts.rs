// Prompt text for resume-to-job matching.

pub const RESUME_MATCH_PROMPT_TEMPLATE: &str = r#"Ты - эксперт по подбору персонала. Проанализируй соответствие резюме кандидата требованиям вакансии и верни результат СТРОГО в JSON формате.

ВАКАНСИЯ:
Название: {job_title}
Описание: {job_description}
Требования: {job_requirements}
Навыки: {job_skills}
Опыт: {job_experience}

РЕЗЮМЕ КАНДИДАТА:
Имя: {candidate_name}
Краткое описание: {candidate_summary}
Навыки: {candidate_skills}
Опыт работы: {candidate_experience}
Образование: {candidate_education}

ЗАДАЧА:
Оцени соответствие по шкале 0-100 и предоставь детальный анализ.

ВЕРНИ ОТВЕТ В СТРОГОМ JSON ФОРМАТЕ:
{
  "overall_score": число от 0 до 100,
  "skills_match": число от 0 до 100,
  "experience_match": число от 0 до 100,
  "education_match": число от 0 до 100,
  "confidence": число от 0 до 100,
  "detailed_analysis": {
    "matched_skills": ["навык1", "навык2"],
    "missing_skills": ["навык3", "навык4"],
    "experience_gap": "краткое описание недостатка опыта или null",
    "strengths": ["сильная сторона 1", "сильная сторона 2"],
    "weaknesses": ["слабость 1", "слабость 2"],
    "red_flags": ["красный флаг или пустой массив"],
    "recommendations": ["рекомендация 1", "рекомендация 2"]
  },
  "recommendation": "STRONG_MATCH" | "GOOD_MATCH" | "WEAK_MATCH" | "NO_MATCH",
  "reasoning_notes": "краткое обоснование оценки"
}

{json_only}"#;

pub const NO_CANDIDATE_NAME: &str = "Кандидат";
pub const NO_JOB_EXPERIENCE: &str = "Не указан";
pub const NO_SUMMARY: &str = "Отсутствует";
pub const NO_SKILLS: &str = "не указаны";
pub const NO_EDUCATION: &str = "не указано";
