use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::AppError;

/// Database model for the users table. `token` mirrors the last-issued
/// access token for inspection; validity always comes from the token
/// itself, never from this column.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String, // UUID v4 as string
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub contact: String,
    pub password: String, // bcrypt hash
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user model with generated ID, hashing the password.
    pub fn new(
        first_name: String,
        last_name: String,
        username: String,
        email: String,
        contact: String,
        password: &str,
    ) -> Result<Self, AppError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            username,
            email,
            contact,
            password: hash_password(password)?,
            token: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the stored hash with one for the given plaintext.
    pub fn set_password(&mut self, password: &str) -> Result<(), AppError> {
        self.password = hash_password(password)?;
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password).unwrap_or(false)
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|_| AppError::Internal)
}

/// Public view of a user, safe to serialize into responses.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub contact: String,
}

impl From<&UserModel> for UserProfile {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            contact: user.contact.clone(),
        }
    }
}
