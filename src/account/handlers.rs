use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use super::service::AccountService;
use super::types::{
    EmailCheckRequest, ProfileUpdateRequest, SigninRequest, SigninResponse, SignupRequest,
    UsernameCheckRequest,
};
use super::validation::messages;
use crate::auth::service::AuthService;
use crate::auth::types::{AccessTokenResponse, CurrentUser, RefreshTokenRequest};
use crate::shared::{AppError, AppState, Envelope};

fn account_service(state: &AppState) -> AccountService {
    AccountService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.media_store),
    )
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.revoked_token_repository),
        state.token_config.clone(),
    )
}

/// POST /signup
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = account_service(&state).signup(&payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /signin
#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = auth_service(&state)
        .signin(payload.username.as_deref(), payload.password.as_deref())
        .await?;
    Ok(Json(SigninResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// POST /token/refresh
#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access = auth_service(&state)
        .refresh(payload.refresh.as_deref())
        .await?;
    Ok(Json(AccessTokenResponse { access }))
}

/// POST /sign_out (protected)
#[instrument(skip(state, payload))]
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_service(&state)
        .sign_out(payload.refresh.as_deref())
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /userprofile (protected)
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = account_service(&state).profile(&user.id).await?;
    Ok(Json(profile))
}

/// PUT /userprofile (protected) - full update, every field required
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = account_service(&state)
        .update_profile(&user.id, &payload, false)
        .await?;
    Ok(Json(Envelope::new(messages::UPDATE_SUCCESS, profile)))
}

/// PATCH /userprofile (protected) - partial update
#[instrument(skip(state, payload))]
pub async fn patch_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = account_service(&state)
        .update_profile(&user.id, &payload, true)
        .await?;
    Ok(Json(Envelope::new(messages::UPDATE_SUCCESS, profile)))
}

/// POST /emailvalidator - availability check usable during signup
#[instrument(skip(state, payload))]
pub async fn email_validator(
    State(state): State<AppState>,
    Json(payload): Json<EmailCheckRequest>,
) -> Result<impl IntoResponse, AppError> {
    account_service(&state)
        .check_email(payload.email.as_deref())
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /username-validator - availability check usable during signup
#[instrument(skip(state, payload))]
pub async fn username_validator(
    State(state): State<AppState>,
    Json(payload): Json<UsernameCheckRequest>,
) -> Result<impl IntoResponse, AppError> {
    account_service(&state)
        .check_username(payload.username.as_deref())
        .await?;
    Ok(Json(json!({ "success": true })))
}
