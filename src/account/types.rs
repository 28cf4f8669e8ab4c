use serde::{Deserialize, Serialize};

/// Request payload for POST /signup. Fields are optional so missing and
/// blank inputs can be reported per-field instead of failing
/// deserialization wholesale.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub password: Option<String>,
}

/// Request payload for POST /signin
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response for POST /signin: the issued token pair
#[derive(Debug, Serialize, Deserialize)]
pub struct SigninResponse {
    pub access: String,
    pub refresh: String,
}

/// Request payload for PUT/PATCH /userprofile. PUT requires every field;
/// PATCH validates only the fields that are present.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub password: Option<String>,
}

/// Request payload for POST /emailvalidator
#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    pub email: Option<String>,
}

/// Request payload for POST /username-validator
#[derive(Debug, Deserialize)]
pub struct UsernameCheckRequest {
    pub username: Option<String>,
}
