use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::{UserModel, UserProfile};
use super::repository::UserRepository;
use super::types::{ProfileUpdateRequest, SignupRequest};
use super::validation::{self, messages};
use crate::shared::{AppError, ValidationErrors};
use crate::storage::MediaStore;

/// Account lifecycle: signup, profile reads and updates, and the
/// standalone availability checks. Owns the coupling between the users
/// table and the per-user media directory.
pub struct AccountService {
    users: Arc<dyn UserRepository + Send + Sync>,
    store: Arc<dyn MediaStore + Send + Sync>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        store: Arc<dyn MediaStore + Send + Sync>,
    ) -> Self {
        Self { users, store }
    }

    /// Validates and registers a new user, provisioning their media
    /// directory before the row is written. If the insert fails the
    /// directory is removed again so a retry starts clean.
    #[instrument(skip(self, req))]
    pub async fn signup(&self, req: &SignupRequest) -> Result<UserProfile, AppError> {
        let mut errors = validation::validate_signup(req);

        // Only probe uniqueness for fields that already pass shape checks
        if let Some(username) = req.username.as_deref() {
            if !errors.contains("username") && self.users.username_exists(username).await? {
                errors.add("username", messages::USERNAME_EXISTS);
            }
        }
        let email = req.email.as_deref().map(str::trim);
        if let Some(email) = email {
            if !errors.contains("email") && self.users.email_exists(email).await? {
                errors.add("email", messages::EMAIL_EXISTS);
            }
        }
        errors.into_result()?;

        // Validation guarantees presence past this point
        let user = UserModel::new(
            req.first_name.clone().ok_or(AppError::Internal)?,
            req.last_name.clone().ok_or(AppError::Internal)?,
            req.username.clone().ok_or(AppError::Internal)?,
            email.map(String::from).ok_or(AppError::Internal)?,
            req.contact.clone().ok_or(AppError::Internal)?,
            req.password.as_deref().ok_or(AppError::Internal)?,
        )?;

        self.store.provision_user_root(&user.username).await?;

        if let Err(e) = self.users.create(&user).await {
            warn!(username = %user.username, error = %e, "User insert failed, removing provisioned directory");
            if let Err(cleanup) = self.store.remove_user_root(&user.username).await {
                warn!(username = %user.username, error = %cleanup, "Cleanup of provisioned directory failed");
            }
            return Err(e);
        }

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(UserProfile::from(&user))
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(UserProfile::from(&user))
    }

    /// Applies a profile update. `partial` selects PATCH semantics where
    /// absent fields are left untouched; a full update requires every
    /// field. A username change also moves the user's media directory.
    #[instrument(skip(self, req))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        req: &ProfileUpdateRequest,
        partial: bool,
    ) -> Result<UserProfile, AppError> {
        let mut user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut errors = validation::validate_profile_update(req, partial);

        if let Some(username) = req.username.as_deref() {
            if !errors.contains("username")
                && username != user.username
                && self.users.username_exists(username).await?
            {
                errors.add("username", messages::USERNAME_EXISTS);
            }
        }
        if let Some(email) = req.email.as_deref() {
            if !errors.contains("email")
                && email != user.email
                && self.users.email_exists(email).await?
            {
                errors.add("email", messages::EMAIL_EXISTS);
            }
        }
        errors.into_result()?;

        let old_username = user.username.clone();

        if let Some(first_name) = &req.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &req.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(username) = &req.username {
            user.username = username.clone();
        }
        if let Some(email) = &req.email {
            user.email = email.trim().to_string();
        }
        if let Some(contact) = &req.contact {
            user.contact = contact.clone();
        }
        if let Some(password) = req.password.as_deref() {
            user.set_password(password)?;
        }
        user.updated_at = chrono::Utc::now();

        let username_changed = user.username != old_username;
        if username_changed {
            debug!(old = %old_username, new = %user.username, "Renaming user media directory");
            self.store
                .rename_user_root(&old_username, &user.username)
                .await?;
        }

        if let Err(e) = self.users.update(&user).await {
            if username_changed {
                warn!(user_id = %user_id, error = %e, "Profile update failed, renaming directory back");
                if let Err(undo) = self
                    .store
                    .rename_user_root(&user.username, &old_username)
                    .await
                {
                    warn!(user_id = %user_id, error = %undo, "Directory rename rollback failed");
                }
            }
            return Err(e);
        }

        info!(user_id = %user_id, "Profile updated");
        Ok(UserProfile::from(&user))
    }

    /// Availability check for POST /emailvalidator: shape errors and
    /// already-taken both come back as field-keyed validation errors.
    #[instrument(skip(self))]
    pub async fn check_email(&self, email: Option<&str>) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        validation::check_email(&mut errors, email, true);
        if errors.is_empty() {
            if let Some(email) = email {
                if self.users.email_exists(email).await? {
                    errors.add("email", messages::EMAIL_EXISTS);
                }
            }
        }
        errors.into_result()
    }

    /// Availability check for POST /username-validator.
    #[instrument(skip(self))]
    pub async fn check_username(&self, username: Option<&str>) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        validation::check_username(&mut errors, username, true);
        if errors.is_empty() {
            if let Some(username) = username {
                if self.users.username_exists(username).await? {
                    errors.add("username", messages::USERNAME_EXISTS);
                }
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::repository::InMemoryUserRepository;
    use crate::storage::LocalMediaStore;
    use tempfile::TempDir;

    fn service() -> (AccountService, TempDir) {
        let dir = TempDir::new().unwrap();
        let service = AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(LocalMediaStore::new(dir.path().to_path_buf())),
        );
        (service, dir)
    }

    fn signup_request(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            contact: Some("9876543210".to_string()),
            password: Some("Sup3r@secret".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user_and_directory() {
        let (service, dir) = service();
        let profile = service
            .signup(&signup_request("jane@doe1", "jane@example.com"))
            .await
            .unwrap();

        assert_eq!(profile.username, "jane@doe1");
        assert!(dir.path().join("jane@doe1").is_dir());
    }

    #[tokio::test]
    async fn test_signup_stores_trimmed_email() {
        let (service, _dir) = service();
        let profile = service
            .signup(&signup_request("jane@doe1", "  jane@example.com  "))
            .await
            .unwrap();
        assert_eq!(profile.email, "jane@example.com");

        // The trimmed form is what the duplicate check sees.
        let err = service
            .signup(&signup_request("john@doe1", "jane@example.com"))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.0["email"], vec![messages::EMAIL_EXISTS]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_username_and_email() {
        let (service, _dir) = service();
        service
            .signup(&signup_request("jane@doe1", "jane@example.com"))
            .await
            .unwrap();

        let err = service
            .signup(&signup_request("jane@doe1", "other@example.com"))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.0["username"], vec![messages::USERNAME_EXISTS]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let err = service
            .signup(&signup_request("john@doe1", "jane@example.com"))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.0["email"], vec![messages::EMAIL_EXISTS]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_renames_media_directory() {
        let (service, dir) = service();
        let profile = service
            .signup(&signup_request("jane@doe1", "jane@example.com"))
            .await
            .unwrap();

        let req = ProfileUpdateRequest {
            username: Some("janet@doe1".to_string()),
            ..Default::default()
        };
        let updated = service.update_profile(&profile.id, &req, true).await.unwrap();

        assert_eq!(updated.username, "janet@doe1");
        assert!(!dir.path().join("jane@doe1").exists());
        assert!(dir.path().join("janet@doe1").is_dir());
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let (service, _dir) = service();
        let profile = service
            .signup(&signup_request("jane@doe1", "jane@example.com"))
            .await
            .unwrap();

        let req = ProfileUpdateRequest {
            contact: Some("1112223334".to_string()),
            ..Default::default()
        };
        let updated = service.update_profile(&profile.id, &req, true).await.unwrap();
        assert_eq!(updated.contact, "1112223334");
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_full_update_requires_all_fields() {
        let (service, _dir) = service();
        let profile = service
            .signup(&signup_request("jane@doe1", "jane@example.com"))
            .await
            .unwrap();

        let req = ProfileUpdateRequest {
            contact: Some("1112223334".to_string()),
            ..Default::default()
        };
        let err = service
            .update_profile(&profile.id, &req, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_availability_checks() {
        let (service, _dir) = service();
        service
            .signup(&signup_request("jane@doe1", "jane@example.com"))
            .await
            .unwrap();

        assert!(service.check_email(Some("free@example.com")).await.is_ok());
        assert!(service.check_email(Some("jane@example.com")).await.is_err());
        assert!(service.check_email(Some("not-an-email")).await.is_err());
        assert!(service.check_username(Some("john@doe1")).await.is_ok());
        assert!(service.check_username(Some("jane@doe1")).await.is_err());
        assert!(service.check_username(None).await.is_err());
    }
}
