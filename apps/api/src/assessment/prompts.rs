// Prompt text for post-interview video analysis.
// Placeholders are filled by `assessment::prompt_builder`.

/// Main evaluation prompt. The JSON schema block is literal; only `{name}` keys
/// listed in `build_evaluation_prompt` are substituted.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Вы - эксперт по анализу видео интервью, использующий методологию "{framework_name}" v{framework_version}.

КОНТЕКСТ ИНТЕРВЬЮ:
{job_context}

ИНФОРМАЦИЯ О КАНДИДАТЕ:
{candidate_info}

КРИТЕРИИ ОЦЕНКИ (анализируйте каждый отдельно):
{criteria_outline}

ЗАДАЧИ АНАЛИЗА:
1. Оцените каждый критерий по шкале 0-100 баллов
2. Найдите конкретные доказательства для каждой оценки из видео
3. Определите общий уровень уверенности анализа (0-100%)
4. Выявите красные флаги согласно конфигурации
5. Предоставьте конкретные временные метки важных моментов

ТРЕБОВАНИЯ К АНАЛИЗУ:
- Анализируйте речь, паузы, эмоции, жестикуляцию
- Сопоставляйте ответы с требованиями вакансии
- Обращайте внимание на противоречия с резюме
- Оценивайте глубину понимания технологий
- Учитывайте культурное соответствие компании
{optional_sections}
ФОРМАТ ОТВЕТА:
Ответьте СТРОГО в формате JSON:
{
  "criteria_scores": {
    "<ключ критерия>": {"score": 85, "evidence": ["Описание"], "subcriteria": {"<ключ подкритерия>": 80}}
  },
  "overall_score": 82,
  "confidence": 90,
  "recommendation": "HIRE | REJECT | REQUIRES_CLARIFICATION",
  "strengths": ["Сильная сторона 1", "Сильная сторона 2"],
  "weaknesses": ["Слабая сторона 1", "Слабая сторона 2"],
  "red_flags": ["Красный флаг 1"],
  "detailed_feedback": "Подробная обратная связь для кандидата",
  "timestamps": [
    {"time": "01:23", "event": "Отличный ответ на вопрос о React"}
  ],
  "processing_notes": "Внутренние заметки для HR"{emotional_schema}
}

Используйте ключи критериев ровно в том виде, в каком они перечислены выше: {criteria_keys}.
{json_only}

Анализируйте внимательно и предоставьте максимально объективную оценку!"#;

pub const RED_FLAGS_HEADER: &str = "ВНИМАНИЕ НА КРАСНЫЕ ФЛАГИ:";
pub const RED_FLAG_INCONSISTENCIES: &str = "- Противоречия между резюме и ответами в интервью";
pub const RED_FLAG_EVASIVENESS: &str =
    "- Уклонение от прямых ответов или избегание сложных вопросов";
pub const RED_FLAG_TEMPLATE_ANSWERS: &str = "- Шаблонные ответы без понимания сути";

/// Appended when the framework enables emotion analysis.
pub const EMOTIONAL_ANALYSIS_PROMPT: &str = r#"Дополнительно проанализируйте эмоциональные аспекты:

1. ЯЗЫК ТЕЛА:
   - Зрительный контакт с камерой
   - Поза и жестикуляция
   - Выражение лица

2. ГОЛОСОВЫЕ ХАРАКТЕРИСТИКИ:
   - Тон и интонация
   - Скорость речи
   - Паузы и заикания

3. ЭМОЦИОНАЛЬНОЕ СОСТОЯНИЕ:
   - Уверенность vs нервозность
   - Энтузиазм vs апатия
   - Стрессовые реакции

Добавьте эти наблюдения в поле "emotional_analysis" в JSON ответе."#;

pub const EMOTIONAL_SCHEMA_FIELD: &str =
    ",\n  \"emotional_analysis\": {\"body_language\": \"...\", \"voice\": \"...\", \"emotional_state\": \"...\"}";

pub const NO_EXPERIENCE_BAND: &str = "не указаны";
pub const NO_JOB_SKILLS: &str = "не указаны";
