use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A test case in question payloads.
#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TestCaseDto {
    #[schema(example = "3 4")]
    pub input: String,
    #[schema(example = "7")]
    pub expected_output: String,
}

/// Request body for creating a question. The ordinal `number` is assigned
/// automatically per year.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateQuestionRequest {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "Sum of Two Numbers")]
    pub title: String,
    /// Problem statement in Markdown.
    pub content: String,
    /// Reference solution; must pass every test case.
    pub correct_code: String,
    /// Broken scaffold served to teams.
    pub incorrect_code: String,
    /// Ordered test cases; at least one required.
    pub test_cases: Vec<TestCaseDto>,
}

pub fn validate_create_question(payload: &CreateQuestionRequest) -> Result<(), AppError> {
    let title = payload.title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation("Title must be 1-256 characters".into()));
    }
    if payload.correct_code.trim().is_empty() {
        return Err(AppError::Validation("correct_code is required".into()));
    }
    if payload.incorrect_code.trim().is_empty() {
        return Err(AppError::Validation("incorrect_code is required".into()));
    }
    if payload.test_cases.is_empty() {
        return Err(AppError::Validation(
            "At least one test case is required".into(),
        ));
    }
    Ok(())
}

/// Request body for updating a question. PATCH semantics: only provided
/// fields change; `test_cases` replaces the whole ordered set.
#[derive(Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub correct_code: Option<String>,
    pub incorrect_code: Option<String>,
    pub test_cases: Option<Vec<TestCaseDto>>,
}

pub fn validate_update_question(payload: &UpdateQuestionRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > 256 {
            return Err(AppError::Validation("Title must be 1-256 characters".into()));
        }
    }
    if let Some(ref code) = payload.correct_code
        && code.trim().is_empty()
    {
        return Err(AppError::Validation("correct_code must not be empty".into()));
    }
    if let Some(ref code) = payload.incorrect_code
        && code.trim().is_empty()
    {
        return Err(AppError::Validation(
            "incorrect_code must not be empty".into(),
        ));
    }
    if let Some(ref cases) = payload.test_cases
        && cases.is_empty()
    {
        return Err(AppError::Validation(
            "test_cases must not be empty when provided".into(),
        ));
    }
    Ok(())
}

/// Question summary for the team-facing list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionSummary {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub number: i32,
    #[schema(example = "Sum of Two Numbers")]
    pub title: String,
}

/// Full question as served to teams: the scaffold and the test cases, never
/// the reference solution.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 1)]
    pub number: i32,
    #[schema(example = "Sum of Two Numbers")]
    pub title: String,
    pub content: String,
    pub incorrect_code: String,
    pub test_cases: Vec<TestCaseDto>,
}

/// Full question as served to admins, reference solution included.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminQuestionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 1)]
    pub number: i32,
    #[schema(example = "Sum of Two Numbers")]
    pub title: String,
    pub content: String,
    pub correct_code: String,
    pub incorrect_code: String,
    pub test_cases: Vec<TestCaseDto>,
    #[schema(example = "2025-08-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
}

/// List of all questions (admin view).
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminQuestionListResponse {
    pub questions: Vec<AdminQuestionResponse>,
}

/// Result of running a question's reference solution through the grader.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckQuestionResponse {
    #[schema(example = 5)]
    pub passed: i32,
    #[schema(example = 5)]
    pub total: i32,
    pub results: Vec<common::compiler::TestResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateQuestionRequest {
        CreateQuestionRequest {
            year: 2025,
            title: "Sum".into(),
            content: "Add the numbers.".into(),
            correct_code: "print(sum(map(int, input().split())))".into(),
            incorrect_code: "print(0)".into(),
            test_cases: vec![TestCaseDto {
                input: "3 4".into(),
                expected_output: "7".into(),
            }],
        }
    }

    #[test]
    fn test_valid_create_passes() {
        assert!(validate_create_question(&valid_create()).is_ok());
    }

    #[test]
    fn test_create_requires_test_cases() {
        let mut payload = valid_create();
        payload.test_cases.clear();
        assert!(validate_create_question(&payload).is_err());
    }

    #[test]
    fn test_update_rejects_empty_test_case_replacement() {
        let payload = UpdateQuestionRequest {
            test_cases: Some(vec![]),
            ..Default::default()
        };
        assert!(validate_update_question(&payload).is_err());
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(validate_update_question(&UpdateQuestionRequest::default()).is_ok());
    }
}
