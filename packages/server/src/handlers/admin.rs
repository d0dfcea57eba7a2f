use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{admin, team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::extractors::json::AppJson;
use crate::models::admin::*;
use crate::models::auth::MemberDto;
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// Handle admin login.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Admin",
    operation_id = "adminLogin",
    summary = "Admin login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminLoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    validate_admin_login(&payload)?;

    let username = payload.username.trim();

    let account = admin::Entity::find()
        .filter(admin::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        account.id,
        &account.username,
        jwt::ROLE_ADMIN,
        state.config.auth.admin_token_ttl_hours,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    info!(admin = %account.username, "Admin logged in");

    Ok(Json(AdminLoginResponse {
        token,
        username: account.username,
    }))
}

/// Register a further admin account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Admin",
    operation_id = "registerAdmin",
    summary = "Register a new admin",
    description = "Creates another admin account. Only an authenticated admin may do this; the first account is seeded from configuration at startup.",
    request_body = RegisterAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Username or email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_admin, payload), fields(by = %auth_admin.username, username = %payload.username))]
pub async fn register(
    auth_admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_admin(&payload)?;

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_admin = admin::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_lowercase()),
        password: Set(password_hash),
        current_round: Set(1),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let account = new_admin.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Username or email already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(AdminResponse::from(account))))
}

async fn team_response<C: ConnectionTrait>(
    db: &C,
    model: team::Model,
) -> Result<TeamResponse, AppError> {
    let members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(model.id))
        .all(db)
        .await?;

    Ok(TeamResponse {
        id: model.id,
        team_name: model.team_name,
        year: model.year,
        score: model.score,
        members: members.into_iter().map(MemberDto::from).collect(),
    })
}

/// List all teams.
#[utoipa::path(
    get,
    path = "/",
    tag = "Admin",
    operation_id = "listTeams",
    summary = "List all teams",
    responses(
        (status = 200, description = "All teams", body = TeamListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_admin))]
pub async fn list_teams(
    _auth_admin: AuthAdmin,
    State(state): State<AppState>,
) -> Result<Json<TeamListResponse>, AppError> {
    let models = team::Entity::find()
        .order_by_asc(team::Column::TeamName)
        .all(&state.db)
        .await?;

    let mut teams = Vec::with_capacity(models.len());
    for model in models {
        teams.push(team_response(&state.db, model).await?);
    }

    Ok(Json(TeamListResponse { teams }))
}

/// Register a team with its members.
#[utoipa::path(
    post,
    path = "/",
    tag = "Admin",
    operation_id = "createTeam",
    summary = "Register a team",
    description = "Creates a team and its members. Every member email must be unused; a clash with any existing team is rejected.",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Team name or member email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_admin, payload), fields(team_name = %payload.team_name))]
pub async fn create_team(
    _auth_admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_team(&payload)?;

    let txn = state.db.begin().await?;

    let now = chrono::Utc::now();
    let new_team = team::ActiveModel {
        team_name: Set(payload.team_name.trim().to_string()),
        year: Set(payload.year),
        score: Set(0.0),
        testcases_passed: Set(serde_json::json!([])),
        testcases_score: Set(serde_json::json!([])),
        otp_code: Set(None),
        otp_generated_at: Set(None),
        otp_expires_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    };

    let model = new_team.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Team name is already taken".into())
        }
        _ => AppError::from(e),
    })?;

    for member in &payload.members {
        let insert = team_member::ActiveModel {
            team_id: Set(model.id),
            email: Set(member.email.trim().to_lowercase()),
            roll_no: Set(member.roll_no.trim().to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        if let Err(e) = insert {
            return match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(format!(
                    "Email '{}' is already registered with another team",
                    member.email
                ))),
                _ => Err(AppError::from(e)),
            };
        }
    }

    txn.commit().await?;

    info!(team_id = model.id, team = %model.team_name, members = payload.members.len(), "Team created");

    let response = team_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove a team.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Admin",
    operation_id = "removeTeam",
    summary = "Remove a team",
    description = "Deletes a team along with its members, submissions and logs.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_admin), fields(by = %auth_admin.username, team_id = %id))]
pub async fn remove_team(
    auth_admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    use crate::entity::{submission, submission_log};

    let txn = state.db.begin().await?;

    let model = team::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let submission_ids: Vec<i32> = submission::Entity::find()
        .filter(submission::Column::TeamId.eq(model.id))
        .select_only()
        .column(submission::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;

    if !submission_ids.is_empty() {
        submission_log::Entity::delete_many()
            .filter(submission_log::Column::SubmissionId.is_in(submission_ids))
            .exec(&txn)
            .await?;
        submission::Entity::delete_many()
            .filter(submission::Column::TeamId.eq(model.id))
            .exec(&txn)
            .await?;
    }

    team_member::Entity::delete_many()
        .filter(team_member::Column::TeamId.eq(model.id))
        .exec(&txn)
        .await?;

    let team_name = model.team_name.clone();
    team::Entity::delete_by_id(model.id).exec(&txn).await?;

    txn.commit().await?;

    warn!(team = %team_name, "Team removed");

    Ok(StatusCode::NO_CONTENT)
}

/// Switch the active round.
#[utoipa::path(
    put,
    path = "/",
    tag = "Admin",
    operation_id = "updateRound",
    summary = "Switch the active round",
    description = "Sets the round open for submissions on the primary admin record. Code submissions are only accepted while round 1 is active.",
    request_body = UpdateRoundRequest,
    responses(
        (status = 200, description = "Round updated", body = RoundResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_admin, payload), fields(by = %auth_admin.username, round = payload.round))]
pub async fn update_round(
    auth_admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateRoundRequest>,
) -> Result<Json<RoundResponse>, AppError> {
    validate_update_round(&payload)?;

    let primary = admin::Entity::find()
        .filter(admin::Column::Username.eq(&state.config.admin.username))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Primary admin record not found".into()))?;

    let previous = primary.current_round;
    let mut active: admin::ActiveModel = primary.into();
    active.current_round = Set(payload.round);
    active.update(&state.db).await?;

    info!(previous, new = payload.round, "Active round changed");

    Ok(Json(RoundResponse {
        current_round: payload.round,
    }))
}
