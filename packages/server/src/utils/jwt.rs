use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ROLE_TEAM: &str = "team";
pub const ROLE_ADMIN: &str = "admin";

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Team name or admin username
    pub uid: i32,     // Team or admin ID
    pub role: String, // "team" or "admin"
    pub exp: usize,   // Expiration timestamp
}

/// Sign a new JWT token.
pub fn sign(uid: i32, sub: &str, role: &str, ttl_hours: i64, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| anyhow::anyhow!("Token expiry overflow"))?
        .timestamp();

    let claims = Claims {
        sub: sub.to_owned(),
        uid,
        role: role.to_owned(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let token = sign(7, "null pointers", ROLE_TEAM, 24, "test-secret").unwrap();
        let claims = verify(&token, "test-secret").unwrap();
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.sub, "null pointers");
        assert_eq!(claims.role, ROLE_TEAM);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(1, "admin", ROLE_ADMIN, 1, "secret-a").unwrap();
        assert!(verify(&token, "secret-b").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign(1, "admin", ROLE_ADMIN, -1, "secret").unwrap();
        assert!(verify(&token, "secret").is_err());
    }
}
