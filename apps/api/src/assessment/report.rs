use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::assessment::JobInterviewSummary;

/// How one interview compares with the other interviews of the same job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStats {
    pub total_interviews: usize,
    /// Interviews with a current (completed, not superseded) assessment.
    pub assessed_interviews: usize,
    pub status_breakdown: BTreeMap<String, usize>,
    /// Mean overall score of assessed interviews, one decimal; 0 when none.
    pub average_score: f64,
    pub recommendations: BTreeMap<String, usize>,
    /// 1 + number of assessed peers with a strictly lower score; `None` when unassessed.
    pub candidate_rank: Option<usize>,
}

pub fn compute_job_stats(summaries: &[JobInterviewSummary], own_score: Option<i32>) -> JobStats {
    let mut status_breakdown = BTreeMap::new();
    for s in summaries {
        *status_breakdown.entry(s.interview_status.clone()).or_insert(0) += 1;
    }

    let assessed: Vec<(i32, &str)> = summaries
        .iter()
        .filter_map(|s| {
            s.overall_score
                .map(|score| (score, s.recommendation.as_deref().unwrap_or("UNKNOWN")))
        })
        .collect();

    let mut recommendations = BTreeMap::new();
    for (_, rec) in &assessed {
        *recommendations.entry(rec.to_string()).or_insert(0) += 1;
    }

    let average_score = if assessed.is_empty() {
        0.0
    } else {
        let sum: f64 = assessed.iter().map(|(score, _)| f64::from(*score)).sum();
        round_one_decimal(sum / assessed.len() as f64)
    };

    let candidate_rank = own_score.map(|own| {
        assessed.iter().filter(|(score, _)| *score < own).count() + 1
    });

    JobStats {
        total_interviews: summaries.len(),
        assessed_interviews: assessed.len(),
        status_breakdown,
        average_score,
        recommendations,
        candidate_rank,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
