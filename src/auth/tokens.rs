use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    /// Username, so handlers need no extra lookup
    pub username: String,
}

/// Token pair returned by the issuance and refresh endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Signs and validates tokens. Built once at startup from config and shared
/// through app data; no global key state.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    fn sign(&self, user_id: Uuid, username: &str, token_type: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: token_type.to_string(),
            username: username.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Issue an access/refresh token pair for an authenticated user.
    pub fn issue_pair(&self, user_id: Uuid, username: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign(user_id, username, TOKEN_TYPE_ACCESS, self.access_ttl)?,
            refresh_token: self.sign(user_id, username, TOKEN_TYPE_REFRESH, self.refresh_ttl)?,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    fn validate(&self, token: &str, expected_type: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if data.claims.token_type != expected_type {
            return Err(AppError::Unauthorized(format!(
                "Expected {expected_type} token"
            )));
        }

        Ok(data.claims)
    }

    /// Validate an access token and return its claims.
    pub fn validate_access(&self, token: &str) -> Result<Claims> {
        self.validate(token, TOKEN_TYPE_ACCESS)
    }

    /// Exchange a refresh token for a fresh pair.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.validate(refresh_token, TOKEN_TYPE_REFRESH)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;
        self.issue_pair(user_id, &claims.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        TokenManager::new("test-secret", 3600, 86400)
    }

    #[test]
    fn access_token_round_trip() {
        let user_id = Uuid::new_v4();
        let pair = manager().issue_pair(user_id, "alice").unwrap();

        let claims = manager().validate_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let pair = manager().issue_pair(Uuid::new_v4(), "alice").unwrap();
        assert!(manager().validate_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn access_token_cannot_refresh() {
        let pair = manager().issue_pair(Uuid::new_v4(), "alice").unwrap();
        assert!(manager().refresh(&pair.access_token).is_err());
    }

    #[test]
    fn refresh_yields_new_valid_pair() {
        let user_id = Uuid::new_v4();
        let pair = manager().issue_pair(user_id, "alice").unwrap();

        let renewed = manager().refresh(&pair.refresh_token).unwrap();
        let claims = manager().validate_access(&renewed.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let pair = manager().issue_pair(Uuid::new_v4(), "alice").unwrap();
        let other = TokenManager::new("other-secret", 3600, 86400);
        assert!(other.validate_access(&pair.access_token).is_err());
    }
}
