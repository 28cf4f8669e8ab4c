use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
    async fn update(&self, user: &UserModel) -> Result<(), AppError>;
    /// Mirrors the last-issued access token onto the user row.
    async fn set_token(&self, user_id: &str, token: &str) -> Result<(), AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, username = %user.username, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    #[instrument(skip(self))]
    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().any(|u| u.username == username))
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().any(|u| u.email == email))
    }

    #[instrument(skip(self, user))]
    async fn update(&self, user: &UserModel) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User not found for update in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn set_token(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(user_id) {
            Some(user) => {
                user.token = Some(token.to_string());
                Ok(())
            }
            None => {
                warn!(user_id = %user_id, "User not found for token mirror in memory");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user_row(row: &sqlx::postgres::PgRow) -> UserModel {
    UserModel {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        username: row.get("username"),
        email: row.get("email"),
        contact: row.get("contact"),
        password: row.get("password"),
        token: row.get("token"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, username = %user.username, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, username, email, contact, password, token, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.contact)
        .bind(&user.password)
        .bind(&user.token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(map_user_row))
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(map_user_row))
    }

    #[instrument(skip(self))]
    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS present")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.get("present"))
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS present")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.get("present"))
    }

    #[instrument(skip(self, user))]
    async fn update(&self, user: &UserModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET first_name = $2, last_name = $3, username = $4, email = $5, \
             contact = $6, password = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.contact)
        .bind(&user.password)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.id, "Failed to update user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn set_token(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET token = $2 WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn create_test_user(username: &str, email: &str) -> UserModel {
        UserModel::new(
            "Jane".to_string(),
            "Doe".to_string(),
            username.to_string(),
            email.to_string(),
            "9876543210".to_string(),
            "Sup3r@secret",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("jane@doe1", "jane@example.com");

        repo.create(&user).await.unwrap();
        assert_eq!(repo.user_count(), 1);

        let fetched = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "jane@doe1");

        let by_name = repo.get_by_username("jane@doe1").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("jane@doe1", "jane@example.com");
        repo.create(&user).await.unwrap();

        assert!(repo.username_exists("jane@doe1").await.unwrap());
        assert!(!repo.username_exists("other@user1").await.unwrap());
        assert!(repo.email_exists("jane@example.com").await.unwrap());
        assert!(!repo.email_exists("other@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("jane@doe1", "jane@example.com");
        repo.create(&user).await.unwrap();

        user.first_name = "Janet".to_string();
        repo.update(&user).await.unwrap();
        assert_eq!(
            repo.get(&user.id).await.unwrap().unwrap().first_name,
            "Janet"
        );
    }

    #[tokio::test]
    async fn test_update_nonexistent_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("jane@doe1", "jane@example.com");
        let result = repo.update(&user).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_token_mirror() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("jane@doe1", "jane@example.com");
        repo.create(&user).await.unwrap();

        repo.set_token(&user.id, "header.payload.sig").await.unwrap();
        let fetched = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.token.as_deref(), Some("header.payload.sig"));

        let result = repo.set_token("missing", "t").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }
}
