//! User DTOs - accounts, registration, login and password management

use crate::entities::{AccountRole, User};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// International format, e.g. +919876543210
    pub static ref MOBILE_NUMBER: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

// struct returned to the client, never carries the password
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Full name, or the email when no name is set
    pub display_name: String,
    pub role: AccountRole,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            display_name: value.display_name(),
            id: value.user_id,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            role: value.role,
        }
    }
}

/// DTO used by the repository to insert a new account (password already hashed)
#[derive(Debug, Clone)]
pub struct CreateUserDTO {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AccountRole,
}

/// Account fields editable from the settings page
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateUserDTO {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Registration form
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterDTO {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 150))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150))]
    pub last_name: String,

    #[validate(regex(path = *MOBILE_NUMBER, message = "Invalid mobile number"))]
    pub mobile_number: Option<String>,

    #[validate(length(max = 255))]
    pub preferred_location: Option<String>,

    pub role: AccountRole,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

/// Returned after a successful login
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponseDTO {
    pub user: UserDTO,
    /// Where the client should land: the seller dashboard or the property list
    pub landing: String,
}

/// First step of the password reset: prove who you are
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct PasswordResetVerifyDTO {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PasswordResetTokenDTO {
    pub reset_token: String,
}

/// New password, typed twice
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct SetPasswordDTO {
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub new_password1: String,
    #[validate(must_match(other = "new_password1", message = "The two password fields didn't match"))]
    pub new_password2: String,
}

/// Second step of the password reset
#[derive(Serialize, Deserialize, Debug)]
pub struct PasswordResetConfirmDTO {
    pub token: String,
    #[serde(flatten)]
    pub password: SetPasswordDTO,
}
