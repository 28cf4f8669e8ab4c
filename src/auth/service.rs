use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::repository::{RevokedTokenModel, RevokedTokenRepository};
use super::token::TokenConfig;
use super::types::{CurrentUser, TokenClaims, TokenPair};
use crate::account::repository::UserRepository;
use crate::account::validation::{messages, validate_signin};
use crate::shared::AppError;

/// Service for the token lifecycle: issue at signin, refresh, revoke at
/// sign-out, and bearer authentication for protected routes.
pub struct AuthService {
    users: Arc<dyn UserRepository + Send + Sync>,
    revoked: Arc<dyn RevokedTokenRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        revoked: Arc<dyn RevokedTokenRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            users,
            revoked,
            token_config,
        }
    }

    /// Verifies credentials and issues a token pair. The freshly issued
    /// access token is mirrored onto the user row for inspection.
    ///
    /// "User not found" and "wrong password" deliberately collapse into
    /// one undifferentiated outcome so usernames cannot be enumerated.
    #[instrument(skip(self, password))]
    pub async fn signin(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<TokenPair, AppError> {
        validate_signin(username, password).into_result()?;
        let username = username.unwrap_or_default();
        let password = password.unwrap_or_default();

        let user = match self.users.get_by_username(username).await? {
            Some(user) if user.verify_password(password) => user,
            _ => {
                warn!(username = %username, "Signin rejected");
                return Err(AppError::Unauthorized(
                    messages::INVALID_CREDENTIALS.to_string(),
                ));
            }
        };

        let pair = self.token_config.create_pair(&user.id, &user.username)?;
        self.users.set_token(&user.id, &pair.access).await?;

        info!(username = %user.username, "Token pair issued");
        Ok(pair)
    }

    /// Exchanges a valid, non-revoked refresh token for a new access
    /// token.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AppError> {
        let claims = self.validate_refresh(refresh_token).await?;

        let user = self
            .users
            .get(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized(messages::INVALID_TOKEN.to_string()))?;

        let access = self
            .token_config
            .create_access_token(&user.id, &user.username)?;
        self.users.set_token(&user.id, &access).await?;

        info!(username = %user.username, "Access token refreshed");
        Ok(access)
    }

    /// Revokes a refresh token by adding its jti to the denylist. The
    /// entry carries the token's own expiry so cleanup can drop it once
    /// it would have died anyway.
    #[instrument(skip(self, refresh_token))]
    pub async fn sign_out(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        let claims = self.validate_refresh(refresh_token).await?;

        let expires_at = timestamp_to_datetime(claims.exp);
        self.revoked
            .revoke(&RevokedTokenModel::new(claims.jti.clone(), expires_at))
            .await?;

        info!(jti = %claims.jti, "Refresh token revoked");
        Ok(())
    }

    /// Validates a bearer access token and resolves the caller. The user
    /// row must still exist; tokens of deleted accounts are dead.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let claims = self.token_config.validate_token(token)?;
        if !claims.is_access() {
            warn!(token_type = %claims.token_type, "Non-access token presented as bearer");
            return Err(AppError::Unauthorized(messages::INVALID_TOKEN.to_string()));
        }

        match self.users.get(&claims.sub).await? {
            Some(user) => Ok(CurrentUser {
                id: user.id,
                username: user.username,
            }),
            None => {
                warn!(user_id = %claims.sub, "Token subject no longer exists");
                Err(AppError::Unauthorized(messages::INVALID_TOKEN.to_string()))
            }
        }
    }

    /// Cleans up denylist entries whose tokens have expired on their own.
    #[instrument(skip(self))]
    pub async fn cleanup_expired_revocations(&self) -> Result<u64, AppError> {
        let removed = self.revoked.cleanup_expired().await?;
        info!(removed_entries = removed, "Denylist cleanup completed");
        Ok(removed)
    }

    async fn validate_refresh(&self, token: Option<&str>) -> Result<TokenClaims, AppError> {
        let token =
            token.ok_or_else(|| AppError::Unauthorized(messages::INVALID_TOKEN.to_string()))?;

        let claims = self.token_config.validate_token(token)?;
        if !claims.is_refresh() {
            warn!(token_type = %claims.token_type, "Expected a refresh token");
            return Err(AppError::Unauthorized(messages::INVALID_TOKEN.to_string()));
        }
        if self.revoked.is_revoked(&claims.jti).await? {
            warn!(jti = %claims.jti, "Refresh token is on the denylist");
            return Err(AppError::Unauthorized(
                "Token is blacklisted".to_string(),
            ));
        }
        Ok(claims)
    }
}

fn timestamp_to_datetime(ts: usize) -> DateTime<Utc> {
    Utc.timestamp_opt(ts as i64, 0).single().unwrap_or_else(Utc::now)
}
