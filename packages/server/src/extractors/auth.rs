use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt::{self, Claims, ROLE_ADMIN, ROLE_TEAM};

fn bearer_claims(parts: &Parts, secret: &str) -> Result<Claims, AppError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;

    jwt::verify(token, secret).map_err(|_| AppError::TokenInvalid)
}

/// Authenticated team extracted from the `Authorization: Bearer <token>`
/// header. Add this as a handler parameter to require a team login.
pub struct AuthTeam {
    pub team_id: i32,
    pub team_name: String,
}

impl FromRequestParts<AppState> for AuthTeam {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, &state.config.auth.jwt_secret)?;
        if claims.role != ROLE_TEAM {
            return Err(AppError::PermissionDenied);
        }
        Ok(AuthTeam {
            team_id: claims.uid,
            team_name: claims.sub,
        })
    }
}

/// Authenticated admin. Add this as a handler parameter to require an admin
/// login.
pub struct AuthAdmin {
    pub admin_id: i32,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, &state.config.auth.jwt_secret)?;
        if claims.role != ROLE_ADMIN {
            return Err(AppError::PermissionDenied);
        }
        Ok(AuthAdmin {
            admin_id: claims.uid,
            username: claims.sub,
        })
    }
}
