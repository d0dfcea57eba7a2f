use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthTeam;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    MeResponse, MemberDto, OtpRequestedResponse, RequestOtpRequest, VerifyOtpRequest,
    VerifyOtpResponse, validate_request_otp, validate_verify_otp,
};
use crate::state::AppState;
use crate::utils::{jwt, otp};

/// Resolve a team through one of its members' emails.
async fn find_team_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<team::Model, AppError> {
    let member = team_member::Entity::find()
        .filter(team_member::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No team found with this email. Contact an administrator.".into())
        })?;

    team::Entity::find_by_id(member.team_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Team row missing for member".into()))
}

/// Request a login OTP.
#[utoipa::path(
    post,
    path = "/request-otp",
    tag = "Auth",
    operation_id = "requestOtp",
    summary = "Request a login OTP",
    description = "Generates a one-time password for the team owning the given email and mails it to every team member. The OTP expires after a few minutes; requesting again replaces it.",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "OTP issued and mailed", body = OtpRequestedResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No team with this email (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn request_otp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RequestOtpRequest>,
) -> Result<Json<OtpRequestedResponse>, AppError> {
    validate_request_otp(&payload)?;
    let email = payload.email.trim().to_lowercase();

    let team = find_team_by_email(&state.db, &email).await?;

    let code = otp::generate();
    let now = Utc::now();
    let ttl_minutes = state.config.auth.otp_ttl_minutes;

    let mut active: team::ActiveModel = team.clone().into();
    active.otp_code = Set(Some(code.clone()));
    active.otp_generated_at = Set(Some(now));
    active.otp_expires_at = Set(Some(now + Duration::minutes(ttl_minutes)));
    active.update(&state.db).await?;

    let members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team.id))
        .all(&state.db)
        .await?;

    for member in &members {
        state
            .mailer
            .send_otp(&member.email, &code, ttl_minutes)
            .await
            .map_err(|e| {
                warn!(team = %team.team_name, error = %e, "OTP mail delivery failed");
                AppError::Internal("Failed to send OTP email".into())
            })?;
    }

    info!(team = %team.team_name, recipients = members.len(), "OTP issued");

    Ok(Json(OtpRequestedResponse {
        message: "OTP sent to all team members".into(),
    }))
}

/// Verify an OTP and log the team in.
#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = "Auth",
    operation_id = "verifyOtp",
    summary = "Verify an OTP and obtain a token",
    description = "Checks the emailed OTP and returns a JWT bearer token on success. The OTP is single-use and cleared on verification.",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Login successful", body = VerifyOtpResponse),
        (status = 400, description = "Missing, expired or mismatched OTP (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No team with this email (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    validate_verify_otp(&payload)?;
    let email = payload.email.trim().to_lowercase();

    let team = find_team_by_email(&state.db, &email).await?;

    let (code, expires_at) = match (&team.otp_code, &team.otp_expires_at) {
        (Some(code), Some(expires_at)) => (code.clone(), *expires_at),
        _ => return Err(AppError::Validation("No OTP request found".into())),
    };

    if Utc::now() > expires_at {
        return Err(AppError::Validation("OTP has expired".into()));
    }
    if code != payload.otp.trim() {
        return Err(AppError::Validation("Invalid OTP".into()));
    }

    // Single-use: clear before handing out the token.
    let team_id = team.id;
    let team_name = team.team_name.clone();
    let year = team.year;
    let mut active: team::ActiveModel = team.into();
    active.otp_code = Set(None);
    active.otp_generated_at = Set(None);
    active.otp_expires_at = Set(None);
    active.update(&state.db).await?;

    let token = jwt::sign(
        team_id,
        &team_name,
        jwt::ROLE_TEAM,
        state.config.auth.token_ttl_hours,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    let members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .all(&state.db)
        .await?;

    info!(team = %team_name, "Team logged in");

    Ok(Json(VerifyOtpResponse {
        token,
        team_name,
        year,
        members: members.into_iter().map(MemberDto::from).collect(),
    }))
}

/// Return the current authenticated team's profile.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current team profile",
    responses(
        (status = 200, description = "Team profile", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_team), fields(team_id = auth_team.team_id))]
pub async fn me(
    auth_team: AuthTeam,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AppError> {
    let team = team::Entity::find_by_id(auth_team.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team.id))
        .all(&state.db)
        .await?;

    Ok(Json(MeResponse {
        id: team.id,
        team_name: team.team_name,
        year: team.year,
        score: team.score,
        testcases_passed: serde_json::from_value(team.testcases_passed).unwrap_or_default(),
        members: members.into_iter().map(MemberDto::from).collect(),
    }))
}
