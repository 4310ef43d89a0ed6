//! Assessment Orchestrator: runs one video analysis end to end.
//!
//! Pipeline (per interview):
//! 1. Load the interview snapshot and require status COMPLETED
//! 2. Resolve the framework: explicit override, then the job's framework,
//!    then the active default by name; validate it
//! 3. Create a new PENDING attempt and move it to IN_PROGRESS
//! 4. Fetch the recording, build the evaluation prompt, call the evaluator once
//! 5. Strictly parse the reply; fill a missing overall score or recommendation
//! 6. Persist as COMPLETED, superseding earlier attempts
//!
//! Steps 1–2 fail without touching storage. Any failure from step 3 on moves the
//! new attempt to FAILED and leaves earlier attempts as they were.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::assessment::framework::{FrameworkConfig, FrameworkError};
use crate::assessment::prompt_builder::{
    build_evaluation_prompt, CandidateInfo, EvaluationPromptInput, VideoMetadata,
};
use crate::assessment::response::{parse_evaluation_reply, ResponseError};
use crate::assessment::scoring::{
    calculate_overall_score, determine_recommendation, Recommendation, DEFAULT_CONFIDENCE,
};
use crate::assessment::status::AnalysisStatus;
use crate::assessment::store::{AssessmentStore, CompletedAssessment, NewAttempt};
use crate::interview::prompt_builder::job_profile;
use crate::llm_client::{GenerativeModel, LlmError, MediaPart};
use crate::models::assessment::AssessmentRow;
use crate::models::framework::FrameworkRow;
use crate::models::interview::{InterviewSnapshot, InterviewStatus};
use crate::recordings::{RecordingStore, StorageError};

/// Recordings above this size are sent anyway but logged.
pub const LARGE_VIDEO_BYTES: u64 = 20 * 1024 * 1024;
pub const DEFAULT_VIDEO_FPS: f64 = 1.0;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("framework '{name}' is invalid: {source}")]
    InvalidFramework {
        name: String,
        #[source]
        source: FrameworkError,
    },

    #[error("evaluator call failed: {0}")]
    UpstreamCallFailed(#[from] LlmError),

    #[error("evaluator reply could not be parsed: {0}")]
    MalformedResponse(#[from] ResponseError),

    #[error("recording storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("could not encode assessment results: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("illegal status transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: AnalysisStatus,
        to: AnalysisStatus,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Caller-supplied tuning for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomConfig {
    pub video_fps: Option<f64>,
    pub video_metadata: Option<VideoMetadata>,
}

#[derive(Debug, Clone)]
pub struct RunAssessment {
    pub interview_id: Uuid,
    pub assessor_id: Uuid,
    pub framework_id: Option<Uuid>,
    pub custom_config: Option<CustomConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameworkSummary {
    pub id: Uuid,
    pub name: String,
    pub version: String,
}

impl From<&FrameworkRow> for FrameworkSummary {
    fn from(row: &FrameworkRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            version: row.version.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub processing_time_secs: u64,
    pub video_size_bytes: u64,
    pub video_fps: f64,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    pub assessment: AssessmentRow,
    pub framework: FrameworkSummary,
    pub metadata: RunMetadata,
}

/// Tracks the attempt's status so every write is a legal transition.
struct Attempt {
    id: Uuid,
    status: AnalysisStatus,
}

#[derive(Clone)]
pub struct AssessmentService {
    store: Arc<dyn AssessmentStore>,
    recordings: Arc<dyn RecordingStore>,
    evaluator: Arc<dyn GenerativeModel>,
    default_framework_name: String,
}

impl AssessmentService {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        recordings: Arc<dyn RecordingStore>,
        evaluator: Arc<dyn GenerativeModel>,
        default_framework_name: String,
    ) -> Self {
        Self {
            store,
            recordings,
            evaluator,
            default_framework_name,
        }
    }

    pub fn store(&self) -> &Arc<dyn AssessmentStore> {
        &self.store
    }

    pub async fn run_assessment(
        &self,
        request: RunAssessment,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        let interview_id = request.interview_id;

        let snapshot = self
            .store
            .load_interview(interview_id)
            .await?
            .ok_or_else(|| AssessmentError::NotFound(format!("Interview {interview_id}")))?;

        if snapshot.interview.status() != Some(InterviewStatus::Completed) {
            return Err(AssessmentError::PreconditionFailed(format!(
                "Interview {interview_id} must be COMPLETED before analysis (status: {})",
                snapshot.interview.status
            )));
        }

        let framework = self.resolve_framework(&snapshot, request.framework_id).await?;
        let config = framework
            .config()
            .map_err(|source| AssessmentError::InvalidFramework {
                name: framework.name.clone(),
                source,
            })?;

        info!(
            "Analysing interview {} with framework '{}' v{}",
            interview_id, framework.name, framework.version
        );

        let row = self
            .store
            .create_attempt(NewAttempt {
                interview_id,
                framework_id: framework.id,
                assessor_id: request.assessor_id,
            })
            .await?;
        let mut attempt = Attempt {
            id: row.id,
            status: AnalysisStatus::Pending,
        };
        info!("Created assessment attempt {} (#{})", row.id, row.attempt);

        match self
            .evaluate(&mut attempt, &snapshot, &framework, &config, &request)
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!("Assessment {} failed: {err}", attempt.id);
                if let Err(e) = self
                    .store
                    .fail_attempt(attempt.id, attempt.status, &err.to_string())
                    .await
                {
                    error!("Could not mark assessment {} as FAILED: {e}", attempt.id);
                }
                Err(err)
            }
        }
    }

    async fn resolve_framework(
        &self,
        snapshot: &InterviewSnapshot,
        override_id: Option<Uuid>,
    ) -> Result<FrameworkRow, AssessmentError> {
        if let Some(id) = override_id.or(snapshot.job.assessment_framework_id) {
            return self
                .store
                .load_framework(id)
                .await?
                .ok_or_else(|| AssessmentError::NotFound(format!("Assessment framework {id}")));
        }

        self.store
            .find_active_framework(&self.default_framework_name)
            .await?
            .ok_or_else(|| {
                AssessmentError::NotFound(format!(
                    "Default assessment framework '{}'",
                    self.default_framework_name
                ))
            })
    }

    async fn advance(&self, attempt: &mut Attempt, to: AnalysisStatus) -> Result<(), AssessmentError> {
        if !attempt.status.can_transition_to(to) {
            return Err(AssessmentError::IllegalTransition {
                from: attempt.status,
                to,
            });
        }
        self.store.transition(attempt.id, attempt.status, to).await?;
        attempt.status = to;
        Ok(())
    }

    async fn evaluate(
        &self,
        attempt: &mut Attempt,
        snapshot: &InterviewSnapshot,
        framework: &FrameworkRow,
        config: &FrameworkConfig,
        request: &RunAssessment,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        self.advance(attempt, AnalysisStatus::InProgress).await?;
        let started = Instant::now();
        let interview_id = snapshot.interview.id;

        let recording = self.recordings.fetch(interview_id).await?.ok_or_else(|| {
            AssessmentError::NotFound(format!("Recording for interview {interview_id}"))
        })?;
        if recording.size > LARGE_VIDEO_BYTES {
            warn!(
                "Recording for interview {} is {:.1} MB; analysis may be slow",
                interview_id,
                recording.size as f64 / (1024.0 * 1024.0)
            );
        }

        let custom = request.custom_config.clone().unwrap_or_default();
        let fps = custom
            .video_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .or_else(|| config.video_fps())
            .unwrap_or(DEFAULT_VIDEO_FPS);

        let candidate = candidate_info(snapshot);
        let job = job_profile(&snapshot.job);
        let prompt = build_evaluation_prompt(&EvaluationPromptInput {
            framework_name: &framework.name,
            framework_version: &framework.version,
            config,
            job: &job,
            candidate: &candidate,
            video: custom.video_metadata.as_ref(),
        });
        info!(
            "Sending {} byte recording with {} char prompt to {} (fps {})",
            recording.size,
            prompt.chars().count(),
            self.evaluator.model_name(),
            fps
        );

        let media = MediaPart {
            data: &recording.bytes,
            mime_type: &recording.content_type,
            fps: Some(fps),
        };
        let text = self.evaluator.generate(&prompt, Some(media)).await?;
        info!("Evaluator replied with {} chars", text.len());

        let reply = parse_evaluation_reply(&text)?;

        let scores = reply.score_map();
        let overall_score = match reply.overall_score {
            Some(score) => score.round().clamp(0.0, 100.0) as u32,
            None => calculate_overall_score(&scores, &config.weights),
        };
        let confidence = reply.confidence.unwrap_or(DEFAULT_CONFIDENCE);
        let recommendation: Recommendation = reply
            .recommendation
            .unwrap_or_else(|| determine_recommendation(overall_score, confidence));

        let processing_time_secs = started.elapsed().as_secs();
        let analysis_results = json!({
            "raw_response": text,
            "parsed": &reply,
            "framework": FrameworkSummary::from(framework),
            "framework_config": config,
            "model": self.evaluator.model_name(),
            "video": {"size_bytes": recording.size, "fps": fps},
        });

        let results = CompletedAssessment {
            scores: serde_json::to_value(&reply.criteria_scores)?,
            overall_score: overall_score as i32,
            recommendation: recommendation.as_str().to_string(),
            confidence,
            feedback: reply.detailed_feedback.clone(),
            strengths: reply.strengths.clone(),
            weaknesses: reply.weaknesses.clone(),
            red_flags: reply.red_flags.clone(),
            processing_time_secs: i32::try_from(processing_time_secs).unwrap_or(i32::MAX),
            analysis_results,
            notes: reply.processing_notes.clone(),
        };

        if !attempt.status.can_transition_to(AnalysisStatus::Completed) {
            return Err(AssessmentError::IllegalTransition {
                from: attempt.status,
                to: AnalysisStatus::Completed,
            });
        }
        let assessment = self.store.complete_attempt(attempt.id, results).await?;
        attempt.status = AnalysisStatus::Completed;

        info!(
            "Assessment {} completed: score {}, {} (confidence {})",
            assessment.id,
            overall_score,
            recommendation.as_str(),
            confidence
        );

        Ok(AssessmentOutcome {
            assessment,
            framework: FrameworkSummary::from(framework),
            metadata: RunMetadata {
                processing_time_secs,
                video_size_bytes: recording.size,
                video_fps: fps,
                model: self.evaluator.model_name().to_string(),
            },
        })
    }
}

fn candidate_info(snapshot: &InterviewSnapshot) -> CandidateInfo {
    let resume = snapshot.latest_resume.as_ref();
    CandidateInfo {
        name: snapshot.applicant_name.clone(),
        skills: resume.map(|r| r.skills.clone()).unwrap_or_default(),
        experience_years: resume
            .and_then(|r| r.experience)
            .and_then(|y| u32::try_from(y).ok())
            .filter(|&y| y > 0),
        resume_summary: resume.and_then(|r| r.ai_summary.clone()),
    }
}
