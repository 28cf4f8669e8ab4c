use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::types::{TokenClaims, TokenPair, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
use crate::shared::AppError;

/// Configuration for JWT token operations. Access tokens are short lived,
/// refresh tokens long lived; both are opaque signed strings whose
/// validity is checked by signature and expiry alone (plus the denylist
/// for revoked refresh tokens).
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub access_minutes: i64,
    pub refresh_days: i64,
}

impl TokenConfig {
    pub fn new() -> Self {
        let access_minutes = std::env::var("ACCESS_TOKEN_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let refresh_days = std::env::var("REFRESH_TOKEN_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_minutes,
            refresh_days,
        }
    }

    /// Creates an access/refresh pair for the given user.
    #[instrument(skip(self, user_id, username))]
    pub fn create_pair(&self, user_id: &str, username: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.create_access_token(user_id, username)?,
            refresh: self.create_refresh_token(user_id, username)?,
        })
    }

    pub fn create_access_token(&self, user_id: &str, username: &str) -> Result<String, AppError> {
        self.create_token(
            user_id,
            username,
            TOKEN_TYPE_ACCESS,
            Duration::minutes(self.access_minutes),
        )
    }

    pub fn create_refresh_token(&self, user_id: &str, username: &str) -> Result<String, AppError> {
        self.create_token(
            user_id,
            username,
            TOKEN_TYPE_REFRESH,
            Duration::days(self.refresh_days),
        )
    }

    fn create_token(
        &self,
        user_id: &str,
        username: &str,
        token_type: &str,
        lifetime: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
            exp: (now + lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        debug!(token_type, exp = claims.exp, "Creating JWT token");

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates signature and expiry and returns the claims if valid.
    /// Token type is not checked here; callers assert access vs refresh.
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                username = %data.claims.username,
                token_type = %data.claims.token_type,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}
