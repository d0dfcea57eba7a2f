use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::compiler::{TestCasePayload, passed_count};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{question, team, test_case};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthAdmin, AuthTeam};
use crate::extractors::json::AppJson;
use crate::models::question::*;
use crate::state::AppState;

/// Find a question by ID or return 404.
async fn find_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

/// A question's test cases in run order.
async fn load_test_cases<C: ConnectionTrait>(
    db: &C,
    question_id: i32,
) -> Result<Vec<test_case::Model>, AppError> {
    Ok(test_case::Entity::find()
        .filter(test_case::Column::QuestionId.eq(question_id))
        .order_by_asc(test_case::Column::Position)
        .all(db)
        .await?)
}

fn test_case_dtos(cases: Vec<test_case::Model>) -> Vec<TestCaseDto> {
    cases
        .into_iter()
        .map(|tc| TestCaseDto {
            input: tc.input,
            expected_output: tc.expected_output,
        })
        .collect()
}

/// List this year's questions for the authenticated team.
#[utoipa::path(
    get,
    path = "/",
    tag = "Questions",
    operation_id = "listQuestions",
    summary = "List questions for the team's year",
    responses(
        (status = 200, description = "Question summaries", body = [QuestionSummary]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_team), fields(team_id = auth_team.team_id))]
pub async fn list_questions(
    auth_team: AuthTeam,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionSummary>>, AppError> {
    let team = team::Entity::find_by_id(auth_team.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let questions = question::Entity::find()
        .filter(question::Column::Year.eq(team.year))
        .order_by_asc(question::Column::Number)
        .all(&state.db)
        .await?;

    Ok(Json(
        questions
            .into_iter()
            .map(|q| QuestionSummary {
                id: q.id,
                number: q.number,
                title: q.title,
            })
            .collect(),
    ))
}

/// Get one question with its scaffold code and test cases.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Questions",
    operation_id = "getQuestion",
    summary = "Get a question",
    description = "Returns the statement, the scaffold code and the test cases. Questions outside the team's year are reported as not found.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question details", body = QuestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_team), fields(team_id = auth_team.team_id, question_id = %id))]
pub async fn get_question(
    auth_team: AuthTeam,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<QuestionResponse>, AppError> {
    let team = team::Entity::find_by_id(auth_team.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let question = find_question(&state.db, id).await?;
    if question.year != team.year {
        // Same as unknown so other years' questions cannot be probed.
        return Err(AppError::NotFound("Question not found".into()));
    }

    let cases = load_test_cases(&state.db, question.id).await?;

    Ok(Json(QuestionResponse {
        id: question.id,
        year: question.year,
        number: question.number,
        title: question.title,
        content: question.content,
        incorrect_code: question.incorrect_code,
        test_cases: test_case_dtos(cases),
    }))
}

async fn admin_question_response<C: ConnectionTrait>(
    db: &C,
    question: question::Model,
) -> Result<AdminQuestionResponse, AppError> {
    let cases = load_test_cases(db, question.id).await?;
    Ok(AdminQuestionResponse {
        id: question.id,
        year: question.year,
        number: question.number,
        title: question.title,
        content: question.content,
        correct_code: question.correct_code,
        incorrect_code: question.incorrect_code,
        test_cases: test_case_dtos(cases),
        created_at: question.created_at,
    })
}

/// List every question across all years (admin).
#[utoipa::path(
    get,
    path = "/",
    tag = "Admin",
    operation_id = "listAllQuestions",
    summary = "List all questions",
    responses(
        (status = 200, description = "All questions", body = AdminQuestionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_admin))]
pub async fn list_all_questions(
    _auth_admin: AuthAdmin,
    State(state): State<AppState>,
) -> Result<Json<AdminQuestionListResponse>, AppError> {
    let models = question::Entity::find()
        .order_by_asc(question::Column::Year)
        .order_by_asc(question::Column::Number)
        .all(&state.db)
        .await?;

    let mut questions = Vec::with_capacity(models.len());
    for model in models {
        questions.push(admin_question_response(&state.db, model).await?);
    }

    Ok(Json(AdminQuestionListResponse { questions }))
}

/// Create a question with its test cases.
#[utoipa::path(
    post,
    path = "/",
    tag = "Admin",
    operation_id = "createQuestion",
    summary = "Create a question",
    description = "Creates a question and its ordered test cases. The question number is assigned as the next ordinal within its year.",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = AdminQuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Concurrent creation for the same year (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_admin, payload), fields(year = payload.year, title = %payload.title))]
pub async fn create_question(
    _auth_admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_question(&payload)?;

    let txn = state.db.begin().await?;

    let count = question::Entity::find()
        .filter(question::Column::Year.eq(payload.year))
        .count(&txn)
        .await?;
    let number = count as i32 + 1;

    let now = chrono::Utc::now();
    let new_question = question::ActiveModel {
        year: Set(payload.year),
        number: Set(number),
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        correct_code: Set(payload.correct_code),
        incorrect_code: Set(payload.incorrect_code),
        created_at: Set(now),
        ..Default::default()
    };

    let model = new_question.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A question was created for this year concurrently; retry".into())
        }
        _ => AppError::from(e),
    })?;

    for (position, tc) in payload.test_cases.iter().enumerate() {
        test_case::ActiveModel {
            question_id: Set(model.id),
            position: Set(position as i32),
            input: Set(tc.input.clone()),
            expected_output: Set(tc.expected_output.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(question_id = model.id, number, "Question created");

    let response = admin_question_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a question (PATCH semantics).
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Admin",
    operation_id = "updateQuestion",
    summary = "Update a question",
    description = "Partially updates a question. Providing `test_cases` replaces the whole ordered set.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = AdminQuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_admin, payload), fields(question_id = %id))]
pub async fn update_question(
    _auth_admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<Json<AdminQuestionResponse>, AppError> {
    validate_update_question(&payload)?;

    let txn = state.db.begin().await?;

    let existing = find_question(&txn, id).await?;
    let mut active: question::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(code) = payload.correct_code {
        active.correct_code = Set(code);
    }
    if let Some(code) = payload.incorrect_code {
        active.incorrect_code = Set(code);
    }

    let model = active.update(&txn).await?;

    if let Some(cases) = payload.test_cases {
        test_case::Entity::delete_many()
            .filter(test_case::Column::QuestionId.eq(model.id))
            .exec(&txn)
            .await?;

        let now = chrono::Utc::now();
        for (position, tc) in cases.iter().enumerate() {
            test_case::ActiveModel {
                question_id: Set(model.id),
                position: Set(position as i32),
                input: Set(tc.input.clone()),
                expected_output: Set(tc.expected_output.clone()),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    let response = admin_question_response(&state.db, model).await?;
    Ok(Json(response))
}

/// Run a question's reference solution through the grader.
#[utoipa::path(
    post,
    path = "/{id}/check",
    tag = "Admin",
    operation_id = "checkQuestion",
    summary = "Sanity-check a question",
    description = "Runs the stored reference solution against the question's test cases via the code-execution service and reports per-case results. Grades nothing and mutates nothing.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Check results", body = CheckQuestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Execution service failure (COMPILER_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_admin), fields(question_id = %id))]
pub async fn check_question(
    _auth_admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CheckQuestionResponse>, AppError> {
    let question = find_question(&state.db, id).await?;
    let cases = load_test_cases(&state.db, question.id).await?;
    if cases.is_empty() {
        return Err(AppError::Validation(
            "No test cases found for this question".into(),
        ));
    }

    let payloads: Vec<TestCasePayload> = cases
        .into_iter()
        .map(|tc| TestCasePayload {
            input: tc.input,
            expected_output: tc.expected_output,
        })
        .collect();

    let correlation_id = format!("check-{}", question.id);
    let results = state
        .compiler
        .run(&question.correct_code, &payloads, &correlation_id)
        .await?;

    Ok(Json(CheckQuestionResponse {
        passed: passed_count(&results) as i32,
        total: payloads.len() as i32,
        results,
    }))
}
