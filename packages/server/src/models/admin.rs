use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

pub fn validate_admin_login(payload: &AdminLoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful admin login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminLoginResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "admin")]
    pub username: String,
}

/// Request body for registering a further admin account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterAdminRequest {
    #[schema(example = "organizer2")]
    pub username: String,
    #[schema(example = "organizer2@example.edu")]
    pub email: String,
    /// Password (8-128 characters).
    pub password: String,
}

pub fn validate_register_admin(payload: &RegisterAdminRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    let email = payload.email.trim();
    if !email.contains('@') || email.chars().count() > 254 {
        return Err(AppError::Validation("Email is not valid".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Admin account info (no password hash).
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin@example.edu")]
    pub email: String,
}

impl From<crate::entity::admin::Model> for AdminResponse {
    fn from(m: crate::entity::admin::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
        }
    }
}

/// A member in team-management payloads.
#[derive(Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateMemberDto {
    #[schema(example = "alice@example.edu")]
    pub email: String,
    #[schema(example = "21CS1034")]
    pub roll_no: String,
}

/// Request body for registering a team.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    #[schema(example = "null pointers")]
    pub team_name: String,
    #[schema(example = 2025)]
    pub year: i32,
    /// At least one member; emails must be unused by other teams.
    pub members: Vec<CreateMemberDto>,
}

pub fn validate_create_team(payload: &CreateTeamRequest) -> Result<(), AppError> {
    use std::collections::HashSet;

    let name = payload.team_name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation(
            "Team name must be 1-64 characters".into(),
        ));
    }
    if payload.members.is_empty() {
        return Err(AppError::Validation(
            "At least one team member is required".into(),
        ));
    }

    let mut seen = HashSet::with_capacity(payload.members.len());
    for member in &payload.members {
        let email = member.email.trim().to_lowercase();
        if !email.contains('@') || email.chars().count() > 254 {
            return Err(AppError::Validation(format!(
                "Member email '{}' is not valid",
                member.email
            )));
        }
        if !seen.insert(email) {
            return Err(AppError::Validation(format!(
                "Duplicate member email '{}'",
                member.email
            )));
        }
        if member.roll_no.trim().is_empty() {
            return Err(AppError::Validation("Member roll_no is required".into()));
        }
    }
    Ok(())
}

/// A team as shown to admins.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "null pointers")]
    pub team_name: String,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 57.3)]
    pub score: f64,
    pub members: Vec<crate::models::auth::MemberDto>,
}

/// List of teams (admin view).
#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamListResponse {
    pub teams: Vec<TeamResponse>,
}

/// Request body for switching the active round.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRoundRequest {
    /// Must be 1 or 2.
    #[schema(example = 1)]
    pub round: i32,
}

pub fn validate_update_round(payload: &UpdateRoundRequest) -> Result<(), AppError> {
    if !matches!(payload.round, 1 | 2) {
        return Err(AppError::Validation("Round must be either 1 or 2".into()));
    }
    Ok(())
}

/// Currently active round.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RoundResponse {
    #[schema(example = 1)]
    pub current_round: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_must_be_one_or_two() {
        assert!(validate_update_round(&UpdateRoundRequest { round: 1 }).is_ok());
        assert!(validate_update_round(&UpdateRoundRequest { round: 2 }).is_ok());
        assert!(validate_update_round(&UpdateRoundRequest { round: 0 }).is_err());
        assert!(validate_update_round(&UpdateRoundRequest { round: 3 }).is_err());
    }

    #[test]
    fn test_create_team_rejects_duplicate_emails() {
        let payload = CreateTeamRequest {
            team_name: "dupes".into(),
            year: 2025,
            members: vec![
                CreateMemberDto {
                    email: "a@example.edu".into(),
                    roll_no: "1".into(),
                },
                CreateMemberDto {
                    email: "A@example.edu".into(),
                    roll_no: "2".into(),
                },
            ],
        };
        assert!(validate_create_team(&payload).is_err());
    }

    #[test]
    fn test_create_team_requires_members() {
        let payload = CreateTeamRequest {
            team_name: "empty".into(),
            year: 2025,
            members: vec![],
        };
        assert!(validate_create_team(&payload).is_err());
    }
}
