use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::shared::AppError;

/// One revoked refresh token. Kept until its natural expiry passes, after
/// which the denylist entry is dead weight and can be cleaned up.
#[derive(Debug, Clone)]
pub struct RevokedTokenModel {
    pub jti: String,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RevokedTokenModel {
    pub fn new(jti: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti,
            revoked_at: Utc::now(),
            expires_at,
        }
    }
}

/// Trait for the refresh-token denylist
#[async_trait]
pub trait RevokedTokenRepository {
    async fn revoke(&self, token: &RevokedTokenModel) -> Result<(), AppError>;
    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError>;
    async fn cleanup_expired(&self) -> Result<u64, AppError>;
}

/// In-memory denylist for development and testing
pub struct InMemoryRevokedTokenRepository {
    tokens: Mutex<HashMap<String, RevokedTokenModel>>,
}

impl Default for InMemoryRevokedTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRevokedTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn revoked_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl RevokedTokenRepository for InMemoryRevokedTokenRepository {
    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &RevokedTokenModel) -> Result<(), AppError> {
        debug!(jti = %token.jti, "Adding refresh token to denylist in memory");

        let mut tokens = self.tokens.lock().unwrap();
        // Revoking twice is harmless; the entry is simply refreshed.
        tokens.insert(token.jti.clone(), token.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.contains_key(jti))
    }

    #[instrument(skip(self))]
    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let now = Utc::now();
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.expires_at > now);

        let removed_count = initial_count - tokens.len();
        debug!(
            expired_entries_removed = removed_count,
            "Expired denylist entries cleaned up from memory"
        );
        Ok(removed_count as u64)
    }
}

/// PostgreSQL implementation of the denylist
pub struct PostgresRevokedTokenRepository {
    pool: PgPool,
}

impl PostgresRevokedTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevokedTokenRepository for PostgresRevokedTokenRepository {
    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &RevokedTokenModel) -> Result<(), AppError> {
        debug!(jti = %token.jti, "Adding refresh token to denylist in database");

        sqlx::query(
            "INSERT INTO revoked_tokens (jti, revoked_at, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(&token.jti)
        .bind(token.revoked_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to add token to denylist");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let row =
            sqlx::query("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1) AS present")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.get("present"))
    }

    #[instrument(skip(self))]
    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
