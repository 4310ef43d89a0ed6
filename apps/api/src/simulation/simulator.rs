//! Prompt simulations: dry-run an HR agent prompt against a real job and resume.
//!
//! The model plays both the interviewer and the candidate, then grades the
//! interviewer prompt. Nothing here touches a live interview.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::assessment::response::{parse_json_object, ResponseError};
use crate::interview::prompt_builder::{construct_interview_prompt, simulation_prompt_data};
use crate::interview::queries::{load_job, load_resume, load_user};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{GenerativeModel, LlmError};
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::models::simulation::PromptSimulationRow;
use crate::simulation::prompts::*;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("simulator call failed: {0}")]
    UpstreamCallFailed(#[from] LlmError),

    #[error("simulator reply could not be parsed: {0}")]
    MalformedResponse(#[from] ResponseError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(rename = "HR")]
    Hr,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub speaker: Speaker,
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    pub analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationAnalysis {
    pub overall_score: f64,
    #[serde(default)]
    pub coverage_score: f64,
    #[serde(default)]
    pub question_quality: f64,
    #[serde(default)]
    pub adaptability: f64,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub best_moments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub dialogue: Vec<DialogueTurn>,
    pub analysis: SimulationAnalysis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSimulation {
    pub name: String,
    pub job_id: Uuid,
    pub resume_id: Uuid,
    /// Blank or absent means "use the production prompt".
    pub hr_prompt: Option<String>,
    pub creator_id: Uuid,
}

/// A resume with its owner's display name.
#[derive(Debug, Clone)]
pub struct ResumeWithApplicant {
    pub resume: ResumeRow,
    pub applicant_name: String,
}

#[async_trait]
pub trait SimulationStore: Send + Sync {
    async fn create_pending(&self, request: &CreateSimulation)
        -> Result<PromptSimulationRow, sqlx::Error>;

    async fn load_job(&self, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error>;

    async fn load_resume(&self, resume_id: Uuid) -> Result<Option<ResumeWithApplicant>, sqlx::Error>;

    async fn complete(
        &self,
        id: Uuid,
        result: &SimulationResult,
    ) -> Result<PromptSimulationRow, sqlx::Error>;

    async fn fail(&self, id: Uuid, error: &str) -> Result<(), sqlx::Error>;

    async fn get(&self, id: Uuid) -> Result<Option<PromptSimulationRow>, sqlx::Error>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<PromptSimulationRow>, sqlx::Error>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

pub struct PgSimulationStore {
    pool: PgPool,
}

impl PgSimulationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SimulationStore for PgSimulationStore {
    async fn create_pending(
        &self,
        request: &CreateSimulation,
    ) -> Result<PromptSimulationRow, sqlx::Error> {
        sqlx::query_as::<_, PromptSimulationRow>(
            r#"
            INSERT INTO prompt_simulations (id, name, job_id, resume_id, hr_prompt, status, creator_id)
            VALUES ($1, $2, $3, $4, $5, 'PENDING', $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.job_id)
        .bind(request.resume_id)
        .bind(request.hr_prompt.as_deref().unwrap_or(""))
        .bind(request.creator_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn load_job(&self, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
        load_job(&self.pool, job_id).await
    }

    async fn load_resume(&self, resume_id: Uuid) -> Result<Option<ResumeWithApplicant>, sqlx::Error> {
        let Some(resume) = load_resume(&self.pool, resume_id).await? else {
            return Ok(None);
        };
        let Some(applicant) = load_user(&self.pool, resume.applicant_id).await? else {
            return Ok(None);
        };
        Ok(Some(ResumeWithApplicant {
            resume,
            applicant_name: applicant.full_name(),
        }))
    }

    async fn complete(
        &self,
        id: Uuid,
        result: &SimulationResult,
    ) -> Result<PromptSimulationRow, sqlx::Error> {
        sqlx::query_as::<_, PromptSimulationRow>(
            r#"
            UPDATE prompt_simulations
            SET status = 'COMPLETED', dialogue = $2, analysis = $3, score = $4,
                completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&result.dialogue))
        .bind(Json(&result.analysis))
        .bind(result.analysis.overall_score.round() as i32)
        .fetch_one(&self.pool)
        .await
    }

    async fn fail(&self, id: Uuid, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE prompt_simulations
            SET status = 'FAILED', error_message = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PromptSimulationRow>, sqlx::Error> {
        sqlx::query_as::<_, PromptSimulationRow>("SELECT * FROM prompt_simulations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list(&self) -> Result<Vec<PromptSimulationRow>, sqlx::Error> {
        sqlx::query_as::<_, PromptSimulationRow>(
            "SELECT * FROM prompt_simulations ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prompt_simulations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct SimulationService {
    store: Arc<dyn SimulationStore>,
    model: Arc<dyn GenerativeModel>,
    company_name: String,
}

impl SimulationService {
    pub fn new(
        store: Arc<dyn SimulationStore>,
        model: Arc<dyn GenerativeModel>,
        company_name: String,
    ) -> Self {
        Self {
            store,
            model,
            company_name,
        }
    }

    pub fn store(&self) -> &Arc<dyn SimulationStore> {
        &self.store
    }

    /// Creates the record, runs one simulator call and stores the outcome.
    /// Every failure after the record exists leaves it FAILED with the error text.
    pub async fn run_simulation(
        &self,
        request: CreateSimulation,
    ) -> Result<PromptSimulationRow, SimulationError> {
        let record = self.store.create_pending(&request).await?;
        info!("Created prompt simulation {} ({})", record.id, record.name);

        match self.simulate(&request).await {
            Ok(result) => {
                let row = self.store.complete(record.id, &result).await?;
                info!(
                    "Simulation {} completed: {} turns, score {}",
                    row.id,
                    result.dialogue.len(),
                    result.analysis.overall_score
                );
                Ok(row)
            }
            Err(err) => {
                error!("Simulation {} failed: {err}", record.id);
                if let Err(e) = self.store.fail(record.id, &err.to_string()).await {
                    error!("Could not mark simulation {} as FAILED: {e}", record.id);
                }
                Err(err)
            }
        }
    }

    async fn simulate(&self, request: &CreateSimulation) -> Result<SimulationResult, SimulationError> {
        let job = self
            .store
            .load_job(request.job_id)
            .await?
            .ok_or_else(|| SimulationError::NotFound(format!("Job {}", request.job_id)))?;
        let resume = self
            .store
            .load_resume(request.resume_id)
            .await?
            .ok_or_else(|| SimulationError::NotFound(format!("Resume {}", request.resume_id)))?;

        let custom_prompt = request
            .hr_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let prompt = build_simulation_prompt(&job, &resume, custom_prompt, &self.company_name);
        let text = self.model.generate(&prompt, None).await?;
        Ok(parse_json_object::<SimulationResult>(&text)?)
    }
}

/// Uses `custom_prompt` as the HR prompt when given, otherwise the production
/// agent prompt for this job and resume.
pub fn build_simulation_prompt(
    job: &JobRow,
    resume: &ResumeWithApplicant,
    custom_prompt: Option<&str>,
    company_name: &str,
) -> String {
    let (hr_prompt, label) = match custom_prompt {
        Some(custom) => (custom.to_string(), LABEL_CUSTOM_PROMPT),
        None => {
            let data = simulation_prompt_data(job, &resume.resume, &resume.applicant_name, company_name);
            (construct_interview_prompt(&data), LABEL_PRODUCTION_PROMPT)
        }
    };

    let job_skills = join_or(&job.skills, NO_SKILLS);
    let candidate_skills = join_or(&resume.resume.skills, NO_SKILLS);
    let experience = resume
        .resume
        .experience
        .filter(|&years| years > 0)
        .map(|years| format!("{years} лет"))
        .unwrap_or_else(|| NO_EXPERIENCE.to_string());
    let education = resume
        .resume
        .education
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(NO_EDUCATION);

    fill_template(
        SIMULATION_PROMPT_TEMPLATE,
        &[
            ("job_title", job.title.as_str()),
            ("job_description", job.description.as_str()),
            ("job_requirements", job.requirements.as_str()),
            ("job_skills", job_skills.as_str()),
            ("candidate_name", resume.applicant_name.as_str()),
            ("candidate_skills", candidate_skills.as_str()),
            ("candidate_experience", experience.as_str()),
            ("candidate_education", education),
            ("prompt_label", label),
            ("hr_prompt", hr_prompt.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use chrono::Utc;

    use crate::assessment::orchestrator::tests::{job, ScriptedModel};

    #[derive(Default)]
    struct MemorySimulations {
        rows: Mutex<Vec<PromptSimulationRow>>,
        jobs: Mutex<Vec<JobRow>>,
        resumes: Mutex<Vec<ResumeWithApplicant>>,
    }

    #[async_trait]
    impl SimulationStore for MemorySimulations {
        async fn create_pending(
            &self,
            request: &CreateSimulation,
        ) -> Result<PromptSimulationRow, sqlx::Error> {
            let row = PromptSimulationRow {
                id: Uuid::new_v4(),
                name: request.name.clone(),
                job_id: request.job_id,
                resume_id: request.resume_id,
                hr_prompt: request.hr_prompt.clone().unwrap_or_default(),
                status: "PENDING".to_string(),
                dialogue: None,
                analysis: None,
                score: None,
                error_message: None,
                creator_id: request.creator_id,
                created_at: Utc::now(),
                completed_at: None,
                updated_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn load_job(&self, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
            Ok(self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned())
        }

        async fn load_resume(&self, id: Uuid) -> Result<Option<ResumeWithApplicant>, sqlx::Error> {
            Ok(self.resumes.lock().unwrap().iter().find(|r| r.resume.id == id).cloned())
        }

        async fn complete(
            &self,
            id: Uuid,
            result: &SimulationResult,
        ) -> Result<PromptSimulationRow, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|r| r.id == id).ok_or(sqlx::Error::RowNotFound)?;
            row.status = "COMPLETED".to_string();
            row.dialogue = serde_json::to_value(&result.dialogue).ok();
            row.analysis = serde_json::to_value(&result.analysis).ok();
            row.score = Some(result.analysis.overall_score.round() as i32);
            row.completed_at = Some(Utc::now());
            Ok(row.clone())
        }

        async fn fail(&self, id: Uuid, error: &str) -> Result<(), sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|r| r.id == id).ok_or(sqlx::Error::RowNotFound)?;
            row.status = "FAILED".to_string();
            row.error_message = Some(error.to_string());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> Result<Option<PromptSimulationRow>, sqlx::Error> {
            Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn list(&self) -> Result<Vec<PromptSimulationRow>, sqlx::Error> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() < before)
        }
    }

    const REPLY: &str = r#"```json
{
  "dialogue": [
    {"speaker": "HR", "message": "Здравствуйте!", "timestamp": "00:01", "analysis": "Вежливое начало"},
    {"speaker": "Candidate", "message": "Добрый день", "timestamp": "00:02"}
  ],
  "analysis": {
    "overall_score": 78,
    "coverage_score": 80,
    "question_quality": 75,
    "adaptability": 70,
    "efficiency": 85,
    "recommendations": ["Больше вопросов о тестировании"],
    "red_flags": [],
    "best_moments": ["Переход к архитектуре"]
  }
}
```"#;

    fn resume() -> ResumeWithApplicant {
        ResumeWithApplicant {
            resume: ResumeRow {
                id: Uuid::new_v4(),
                applicant_id: Uuid::new_v4(),
                file_name: "cv.pdf".to_string(),
                content: Some("Разработчик интерфейсов".to_string()),
                skills: vec!["React".to_string(), "Redux".to_string()],
                experience: None,
                education: Some("МГУ".to_string()),
                ai_summary: None,
                uploaded_at: Utc::now(),
            },
            applicant_name: "Пётр Иванов".to_string(),
        }
    }

    struct Setup {
        store: Arc<MemorySimulations>,
        model: Arc<ScriptedModel>,
        service: SimulationService,
        request: CreateSimulation,
    }

    fn setup(replies: Vec<Result<String, LlmError>>, hr_prompt: Option<&str>) -> Setup {
        let store = Arc::new(MemorySimulations::default());
        let job = job(Uuid::new_v4());
        let resume = resume();
        let request = CreateSimulation {
            name: "Проверка промпта".to_string(),
            job_id: job.id,
            resume_id: resume.resume.id,
            hr_prompt: hr_prompt.map(str::to_string),
            creator_id: Uuid::new_v4(),
        };
        store.jobs.lock().unwrap().push(job);
        store.resumes.lock().unwrap().push(resume);
        let model = Arc::new(ScriptedModel::new(replies));
        let service = SimulationService::new(store.clone(), model.clone(), "ВТБ".to_string());
        Setup {
            store,
            model,
            service,
            request,
        }
    }

    #[tokio::test]
    async fn test_simulation_completes() {
        let s = setup(vec![Ok(REPLY.to_string())], None);
        let row = s.service.run_simulation(s.request).await.unwrap();
        assert_eq!(row.status, "COMPLETED");
        assert_eq!(row.score, Some(78));
        let dialogue: Vec<DialogueTurn> = serde_json::from_value(row.dialogue.unwrap()).unwrap();
        assert_eq!(dialogue[0].speaker, Speaker::Hr);
        assert_eq!(dialogue[1].analysis, None);
    }

    #[tokio::test]
    async fn test_production_prompt_used_when_no_custom_prompt() {
        let s = setup(vec![Ok(REPLY.to_string())], Some("   "));
        s.service.run_simulation(s.request).await.unwrap();
        let prompts = s.model.prompts.lock().unwrap();
        let prompt = &prompts[0].0;
        assert!(prompt.contains(LABEL_PRODUCTION_PROMPT));
        assert!(prompt.contains("проводящий 40 минут видеоинтервью"));
        assert!(prompt.contains("Пётр Иванов"));
    }

    #[tokio::test]
    async fn test_custom_prompt_replaces_production_prompt() {
        let s = setup(vec![Ok(REPLY.to_string())], Some("Спроси только про Redux"));
        s.service.run_simulation(s.request).await.unwrap();
        let prompts = s.model.prompts.lock().unwrap();
        let prompt = &prompts[0].0;
        assert!(prompt.contains(LABEL_CUSTOM_PROMPT));
        assert!(prompt.contains("Спроси только про Redux"));
        assert!(!prompt.contains("видеоинтервью для предварительного отбора"));
    }

    #[tokio::test]
    async fn test_missing_resume_marks_failed() {
        let s = setup(vec![Ok(REPLY.to_string())], None);
        s.store.resumes.lock().unwrap().clear();
        let err = s.service.run_simulation(s.request).await.unwrap_err();
        assert!(matches!(err, SimulationError::NotFound(_)));
        let rows = s.store.list().await.unwrap();
        assert_eq!(rows[0].status, "FAILED");
        assert!(s.model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_marks_failed() {
        let s = setup(vec![Ok("Диалог: HR: Привет".to_string())], None);
        let err = s.service.run_simulation(s.request).await.unwrap_err();
        assert!(matches!(err, SimulationError::MalformedResponse(_)));
        let rows = s.store.list().await.unwrap();
        assert_eq!(rows[0].status, "FAILED");
        assert!(rows[0].error_message.is_some());
    }

    #[test]
    fn test_prompt_fallbacks_for_missing_resume_fields() {
        let job = job(Uuid::new_v4());
        let mut resume = resume();
        resume.resume.education = None;
        resume.resume.skills.clear();
        resume.resume.experience = Some(0);
        let prompt = build_simulation_prompt(&job, &resume, Some("x"), "ВТБ");
        assert!(prompt.contains("Опыт: не указан\n"));
        assert!(prompt.contains("Образование: не указано\n"));
        assert!(prompt.contains("Навыки: не указаны\n"));
    }
}
