use chrono::{DateTime, Utc};
use common::SubmissionStatus;
use common::compiler::TestResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::grading::engine::SubmitOutcome;

/// Request body for submitting code against a question.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitRequest {
    #[schema(example = 1)]
    pub question_id: i32,
    /// Source code to grade.
    #[schema(example = "print(sum(map(int, input().split())))")]
    pub code: String,
}

pub fn validate_submit(payload: &SubmitRequest, max_size: usize) -> Result<(), AppError> {
    if payload.code.trim().is_empty() {
        return Err(AppError::Validation("Code must not be empty".into()));
    }
    if payload.code.len() > max_size {
        return Err(AppError::Validation(format!(
            "Code size ({} bytes) exceeds maximum ({} bytes)",
            payload.code.len(),
            max_size
        )));
    }
    Ok(())
}

/// Outcome of one graded attempt.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    #[schema(example = 17)]
    pub submission_id: i32,
    pub status: SubmissionStatus,
    #[schema(example = 2)]
    pub passed_count: i32,
    #[schema(example = 3)]
    pub total: i32,
    /// Score awarded by this attempt. Zero unless the attempt newly solved
    /// the question; resubmissions after a solve always report zero.
    #[schema(example = 0.0)]
    pub new_score: f64,
    /// True when the question was already solved before this attempt.
    pub already_solved: bool,
    /// Per-test-case outcomes, in test-case order.
    pub results: Vec<TestResult>,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            submission_id: outcome.submission_id,
            status: outcome.status,
            passed_count: outcome.passed_count,
            total: outcome.total,
            new_score: outcome.new_score,
            already_solved: outcome.already_solved,
            results: outcome.results,
        }
    }
}

/// One grading attempt in a submission's history.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionLogItem {
    pub status: SubmissionStatus,
    #[schema(example = "2025-08-01T10:15:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::submission_log::Model> for SubmissionLogItem {
    fn from(m: crate::entity::submission_log::Model) -> Self {
        Self {
            status: m.status,
            created_at: m.created_at,
        }
    }
}

/// A team's current state on one question, with its attempt history.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionDetailResponse {
    #[schema(example = 17)]
    pub id: i32,
    #[schema(example = 1)]
    pub question_id: i32,
    /// Most recently submitted code.
    pub code: String,
    #[schema(example = 2)]
    pub testcases_passed: i32,
    pub all_passed: bool,
    #[schema(example = 1)]
    pub syntax_error: i32,
    #[schema(example = 4)]
    pub wrong_submission: i32,
    #[schema(example = "2025-08-01T10:00:00Z")]
    pub created_at: DateTime<Utc>,
    /// Grading history, most recent first.
    pub logs: Vec<SubmissionLogItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_code_rejected() {
        let payload = SubmitRequest {
            question_id: 1,
            code: "   \n".into(),
        };
        assert!(validate_submit(&payload, 1024).is_err());
    }

    #[test]
    fn test_oversized_code_rejected() {
        let payload = SubmitRequest {
            question_id: 1,
            code: "x".repeat(2048),
        };
        assert!(validate_submit(&payload, 1024).is_err());
    }

    #[test]
    fn test_normal_code_accepted() {
        let payload = SubmitRequest {
            question_id: 1,
            code: "print(42)".into(),
        };
        assert!(validate_submit(&payload, 1024).is_ok());
    }
}
