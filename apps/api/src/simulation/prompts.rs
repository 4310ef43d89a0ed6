// Prompt text for interview simulations.

/// Asks the model to play both sides of an interview driven by `{hr_prompt}`
/// and to grade the HR prompt afterwards.
pub const SIMULATION_PROMPT_TEMPLATE: &str = r#"Ты - симулятор интервью. Сгенерируй полную 40-минутную симуляцию интервью между AI HR и AI кандидатом.

ДАННЫЕ ВАКАНСИИ:
Название: {job_title}
Описание: {job_description}
Требования: {job_requirements}
Необходимые навыки: {job_skills}

ДАННЫЕ КАНДИДАТА (из резюме):
Имя: {candidate_name}
Навыки: {candidate_skills}
Опыт: {candidate_experience}
Образование: {candidate_education}

HR ПРОМПТ ({prompt_label}):
{hr_prompt}

ЗАДАЧА:
1. Сгенерируй реалистичный диалог из 25-30 реплик (40 минут интервью)
2. HR задает вопросы согласно своему промпту
3. Кандидат отвечает на основе своего резюме, иногда не знает что-то, может нервничать
4. Проанализируй качество HR промпта и дай рекомендации

ТРЕБОВАНИЯ К ДИАЛОГУ:
- HR начинает с приветствия
- Реалистичные паузы и переходы между темами
- Кандидат иногда задает встречные вопросы
- HR должен адаптироваться к ответам кандидата
- Естественные человеческие реакции

ВЕРНИ СТРОГО JSON:
{
  "dialogue": [
    {"speaker": "HR", "message": "текст реплики", "timestamp": "00:01", "analysis": "краткий анализ этой реплики HR"},
    {"speaker": "Candidate", "message": "текст ответа", "timestamp": "00:02"}
  ],
  "analysis": {
    "overall_score": 0,
    "coverage_score": 0,
    "question_quality": 0,
    "adaptability": 0,
    "efficiency": 0,
    "recommendations": ["рекомендация 1", "рекомендация 2"],
    "red_flags": ["проблема 1", "проблема 2"],
    "best_moments": ["лучший момент 1", "лучший момент 2"]
  }
}
Все оценки - целые числа от 0 до 100.
{json_only}

Генерируй содержательный, реалистичный диалог!"#;

pub const LABEL_CUSTOM_PROMPT: &str = "КАСТОМНЫЙ ДЛЯ ТЕСТИРОВАНИЯ";
pub const LABEL_PRODUCTION_PROMPT: &str = "РЕАЛЬНЫЙ ИЗ ПРОДАКШЕНА";

pub const NO_EXPERIENCE: &str = "не указан";
pub const NO_EDUCATION: &str = "не указано";
pub const NO_SKILLS: &str = "не указаны";
