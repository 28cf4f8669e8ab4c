//! Field-level validation rules for account payloads. Bounds and message
//! texts are part of the API contract.

use crate::shared::ValidationErrors;

use super::types::{ProfileUpdateRequest, SignupRequest};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 30;
pub const USERNAME_MIN: usize = 8;
pub const USERNAME_MAX: usize = 16;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 16;
pub const CONTACT_LEN: usize = 10;

/// Special characters a username may (and must, at least once) contain.
/// The username doubles as the directory name for the user's media area,
/// so path separators are not part of the set.
const USERNAME_SPECIAL: &str = "!@#$%^&*()_+|~=`{}[]:\";'<>?,.";
/// Special characters accepted in passwords.
const PASSWORD_SPECIAL: &str = "!@#$%^&*()_+=-";

pub mod messages {
    pub const FIRST_NAME_REQUIRED: &str = "first name required";
    pub const FIRST_NAME_BLANK: &str = "first name can not be blank";
    pub const FIRST_NAME_INVALID: &str = "first name must contain only alphabets";
    pub const FIRST_NAME_LENGTH: &str = "first name must be between 3 and 30 characters";

    pub const LAST_NAME_REQUIRED: &str = "last name required";
    pub const LAST_NAME_BLANK: &str = "last name can not be blank";
    pub const LAST_NAME_INVALID: &str = "last name must contains only alphabets";
    pub const LAST_NAME_LENGTH: &str = "last name must be between 3 and 30 characters";

    pub const USERNAME_REQUIRED: &str = "username required";
    pub const USERNAME_BLANK: &str = "username can not be blank";
    pub const USERNAME_INVALID: &str = "username must contain alphabet and special character";
    pub const USERNAME_EXISTS: &str = "username already exist";

    pub const EMAIL_REQUIRED: &str = "Email required";
    pub const EMAIL_BLANK: &str = "Email can not be blank";
    pub const EMAIL_INVALID: &str = "Enter a valid email address.";
    pub const EMAIL_EXISTS: &str = "email already exist";

    pub const CONTACT_REQUIRED: &str = "contact required";
    pub const CONTACT_BLANK: &str = "contact can not be blank";
    pub const CONTACT_INVALID: &str = "invalid contact";

    pub const PASSWORD_REQUIRED: &str = "password required";
    pub const PASSWORD_BLANK: &str = "password can not be blank";
    pub const PASSWORD_INVALID: &str =
        "Password must contain uppercase, lowercase, digit and special character";

    pub const INVALID_CREDENTIALS: &str = "Invalid Credentials";
    pub const INVALID_TOKEN: &str = "Invalid Token";
    pub const UPDATE_SUCCESS: &str = "Updated Successfully";
}

/// All signup fields are mandatory.
pub fn validate_signup(req: &SignupRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_first_name(&mut errors, req.first_name.as_deref(), true);
    check_last_name(&mut errors, req.last_name.as_deref(), true);
    check_username(&mut errors, req.username.as_deref(), true);
    check_email(&mut errors, req.email.as_deref(), true);
    check_contact(&mut errors, req.contact.as_deref(), true);
    check_password(&mut errors, req.password.as_deref(), true);
    errors
}

/// Signin reuses the signup shape rules for both credential fields.
pub fn validate_signin(username: Option<&str>, password: Option<&str>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_username(&mut errors, username, true);
    check_password(&mut errors, password, true);
    errors
}

/// Profile update: `partial` (PATCH) skips absent fields, a full update
/// (PUT) treats every absent field as missing.
pub fn validate_profile_update(req: &ProfileUpdateRequest, partial: bool) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let required = !partial;
    if required || req.first_name.is_some() {
        check_first_name(&mut errors, req.first_name.as_deref(), required);
    }
    if required || req.last_name.is_some() {
        check_last_name(&mut errors, req.last_name.as_deref(), required);
    }
    if required || req.username.is_some() {
        check_username(&mut errors, req.username.as_deref(), required);
    }
    if required || req.email.is_some() {
        check_email(&mut errors, req.email.as_deref(), required);
    }
    if required || req.contact.is_some() {
        check_contact(&mut errors, req.contact.as_deref(), required);
    }
    if required || req.password.is_some() {
        check_password(&mut errors, req.password.as_deref(), required);
    }
    errors
}

fn check_first_name(errors: &mut ValidationErrors, value: Option<&str>, required: bool) {
    check_alpha_name(
        errors,
        "first_name",
        value,
        required,
        messages::FIRST_NAME_REQUIRED,
        messages::FIRST_NAME_BLANK,
        messages::FIRST_NAME_LENGTH,
        messages::FIRST_NAME_INVALID,
    );
}

fn check_last_name(errors: &mut ValidationErrors, value: Option<&str>, required: bool) {
    check_alpha_name(
        errors,
        "last_name",
        value,
        required,
        messages::LAST_NAME_REQUIRED,
        messages::LAST_NAME_BLANK,
        messages::LAST_NAME_LENGTH,
        messages::LAST_NAME_INVALID,
    );
}

#[allow(clippy::too_many_arguments)]
fn check_alpha_name(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    required: bool,
    required_msg: &str,
    blank_msg: &str,
    length_msg: &str,
    invalid_msg: &str,
) {
    let value = match value {
        Some(v) => v.trim(),
        None => {
            if required {
                errors.add(field, required_msg);
            }
            return;
        }
    };
    if value.is_empty() {
        errors.add(field, blank_msg);
        return;
    }
    if value.len() < NAME_MIN || value.len() > NAME_MAX {
        errors.add(field, length_msg);
    }
    if !value.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.add(field, invalid_msg);
    }
}

pub fn check_username(errors: &mut ValidationErrors, value: Option<&str>, required: bool) {
    let value = match value {
        Some(v) => v,
        None => {
            if required {
                errors.add("username", messages::USERNAME_REQUIRED);
            }
            return;
        }
    };
    if value.is_empty() {
        errors.add("username", messages::USERNAME_BLANK);
        return;
    }
    if !username_is_valid(value) {
        errors.add("username", messages::USERNAME_INVALID);
    }
}

/// 8-16 chars drawn from alphanumerics plus the special set, with at least
/// one special character and at least one alphabetic character.
fn username_is_valid(value: &str) -> bool {
    let len = value.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || USERNAME_SPECIAL.contains(c);
    value.chars().all(allowed)
        && value.chars().any(|c| USERNAME_SPECIAL.contains(c))
        && value.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn check_email(errors: &mut ValidationErrors, value: Option<&str>, required: bool) {
    let value = match value {
        Some(v) => v.trim(),
        None => {
            if required {
                errors.add("email", messages::EMAIL_REQUIRED);
            }
            return;
        }
    };
    if value.is_empty() {
        errors.add("email", messages::EMAIL_BLANK);
        return;
    }
    if !email_is_valid(value) {
        errors.add("email", messages::EMAIL_INVALID);
    }
}

fn email_is_valid(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    // Domain needs an interior dot and no whitespace anywhere.
    !value.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub fn check_contact(errors: &mut ValidationErrors, value: Option<&str>, required: bool) {
    let value = match value {
        Some(v) => v,
        None => {
            if required {
                errors.add("contact", messages::CONTACT_REQUIRED);
            }
            return;
        }
    };
    if value.is_empty() {
        errors.add("contact", messages::CONTACT_BLANK);
        return;
    }
    if value.len() != CONTACT_LEN || !value.chars().all(|c| c.is_ascii_digit()) {
        errors.add("contact", messages::CONTACT_INVALID);
    }
}

pub fn check_password(errors: &mut ValidationErrors, value: Option<&str>, required: bool) {
    let value = match value {
        Some(v) => v,
        None => {
            if required {
                errors.add("password", messages::PASSWORD_REQUIRED);
            }
            return;
        }
    };
    if value.is_empty() {
        errors.add("password", messages::PASSWORD_BLANK);
        return;
    }
    if !password_is_valid(value) {
        errors.add("password", messages::PASSWORD_INVALID);
    }
}

/// 8-16 chars with at least one uppercase, lowercase, digit and special
/// character, drawn only from those classes.
fn password_is_valid(value: &str) -> bool {
    let len = value.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIAL.contains(c);
    value.chars().all(allowed)
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIAL.contains(c))
}
