use std::cmp;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{Duration, Utc};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{submission, submission_log, team};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthTeam;
use crate::extractors::json::AppJson;
use crate::grading::engine;
use crate::models::submission::*;
use crate::state::AppState;

/// Check the per-team grading-attempt rate limit.
///
/// Counts log entries, not submission rows: a team has at most one row per
/// question but may retry it any number of times. Uses an optimistic
/// (non-locking) count, so two requests racing through a very short window
/// may both pass, which is an accepted trade-off against adding lock
/// latency to every submission.
async fn check_rate_limit(
    db: &DatabaseConnection,
    team_id: i32,
    limit_per_minute: u32,
) -> Result<(), AppError> {
    if limit_per_minute == 0 {
        return Ok(()); // Rate limiting disabled
    }

    let submission_ids: Vec<i32> = submission::Entity::find()
        .filter(submission::Column::TeamId.eq(team_id))
        .select_only()
        .column(submission::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    if submission_ids.is_empty() {
        return Ok(());
    }

    let one_minute_ago = Utc::now() - Duration::minutes(1);

    let recent = submission_log::Entity::find()
        .filter(submission_log::Column::SubmissionId.is_in(submission_ids.clone()))
        .filter(submission_log::Column::CreatedAt.gt(one_minute_ago))
        .count(db)
        .await?;

    if recent >= limit_per_minute as u64 {
        let oldest = submission_log::Entity::find()
            .filter(submission_log::Column::SubmissionId.is_in(submission_ids))
            .filter(submission_log::Column::CreatedAt.gt(one_minute_ago))
            .order_by_asc(submission_log::Column::CreatedAt)
            .one(db)
            .await?;

        let retry_after = oldest
            .map(|log| {
                let expires = log.created_at + Duration::minutes(1);
                cmp::max((expires - Utc::now()).num_seconds(), 1) as u64
            })
            .unwrap_or(60);

        return Err(AppError::RateLimited { retry_after });
    }

    Ok(())
}

/// Submit code for grading.
#[utoipa::path(
    post,
    path = "/",
    tag = "Submissions",
    operation_id = "submitCode",
    summary = "Submit code for a question",
    description = "Runs the code against the question's test cases via the code-execution service, records the attempt, and on the first fully passing attempt awards a score and updates the leaderboard. Resubmissions after a solve are recorded but never change counters or score; their `new_score` is 0.",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Attempt graded", body = SubmitResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Submissions closed (ROUND_CLOSED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
        (status = 502, description = "Execution service failure (COMPILER_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_team, payload), fields(team_id = auth_team.team_id, question_id = payload.question_id))]
pub async fn submit_code(
    auth_team: AuthTeam,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    validate_submit(&payload, state.config.submission.max_size)?;

    let team = team::Entity::find_by_id(auth_team.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    crate::utils::round::require_round(&state.db, &state.config.admin.username, 1).await?;

    check_rate_limit(
        &state.db,
        team.id,
        state.config.submission.rate_limit_per_minute,
    )
    .await?;

    let outcome =
        engine::grade_submission(&state, &team, payload.question_id, payload.code).await?;

    Ok(Json(outcome.into()))
}

/// Get the team's submission for a question, with its grading history.
#[utoipa::path(
    get,
    path = "/{question_id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get own submission for a question",
    description = "Returns the team's current submission state for the question, plus every grading attempt most recent first.",
    params(("question_id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Submission with history", body = SubmissionDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No submission yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_team), fields(team_id = auth_team.team_id, question_id = %question_id))]
pub async fn get_submission(
    auth_team: AuthTeam,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
) -> Result<Json<SubmissionDetailResponse>, AppError> {
    let sub = submission::Entity::find()
        .filter(submission::Column::TeamId.eq(auth_team.team_id))
        .filter(submission::Column::QuestionId.eq(question_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No submission for this question yet".into()))?;

    let logs = submission_log::Entity::find()
        .filter(submission_log::Column::SubmissionId.eq(sub.id))
        .order_by_desc(submission_log::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(SubmissionDetailResponse {
        id: sub.id,
        question_id: sub.question_id,
        code: sub.code,
        testcases_passed: sub.testcases_passed,
        all_passed: sub.all_passed,
        syntax_error: sub.syntax_error,
        wrong_submission: sub.wrong_submission,
        created_at: sub.created_at,
        logs: logs.into_iter().map(SubmissionLogItem::from).collect(),
    }))
}
