use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for starting a login: ask for an OTP.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RequestOtpRequest {
    /// Any registered team member's email.
    #[schema(example = "alice@example.edu")]
    pub email: String,
}

pub fn validate_request_otp(payload: &RequestOtpRequest) -> Result<(), AppError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if !email.contains('@') || email.chars().count() > 254 {
        return Err(AppError::Validation("Email is not valid".into()));
    }
    Ok(())
}

/// Request body for completing a login with the emailed OTP.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct VerifyOtpRequest {
    /// The email the OTP was requested for.
    #[schema(example = "alice@example.edu")]
    pub email: String,
    /// The 6-digit code from the email.
    #[schema(example = "493027")]
    pub otp: String,
}

pub fn validate_verify_otp(payload: &VerifyOtpRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if payload.otp.trim().is_empty() {
        return Err(AppError::Validation("OTP is required".into()));
    }
    Ok(())
}

/// Acknowledgement that an OTP was issued and mailed.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OtpRequestedResponse {
    #[schema(example = "OTP sent to all team members")]
    pub message: String,
}

/// A member as shown in team profiles.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MemberDto {
    #[schema(example = "alice@example.edu")]
    pub email: String,
    #[schema(example = "21CS1034")]
    pub roll_no: String,
}

impl From<crate::entity::team_member::Model> for MemberDto {
    fn from(m: crate::entity::team_member::Model) -> Self {
        Self {
            email: m.email,
            roll_no: m.roll_no,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct VerifyOtpResponse {
    /// JWT bearer token for team endpoints.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "null pointers")]
    pub team_name: String,
    #[schema(example = 2025)]
    pub year: i32,
    pub members: Vec<MemberDto>,
}

/// Current authenticated team's profile and progress.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "null pointers")]
    pub team_name: String,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 57.3)]
    pub score: f64,
    /// Best passed counts per question, indexed by question number - 1.
    #[schema(example = json!([3, 0, 5]))]
    pub testcases_passed: Vec<i64>,
    pub members: Vec<MemberDto>,
}
