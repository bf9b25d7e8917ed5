//! Auth services - registration, login, logout and password reset

use crate::core::auth::{decode_reset_token, encode_reset_token};
use crate::core::{AppError, AppState, FlashLevel, Page, RequestContext, encode_jwt};
use crate::dtos::{
    CreateUserDTO, LoginDTO, LoginResponseDTO, PasswordResetConfirmDTO, PasswordResetTokenDTO,
    PasswordResetVerifyDTO, RegisterDTO, UserDTO,
};
use crate::entities::{AccountRole, User};
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const SESSION_COOKIE_MAX_AGE: i64 = 24 * 60 * 60;

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::internal_server_error("Failed to build response headers"))
}

/// Blank optional fields are stored as NULL
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDTO>,
) -> Result<(StatusCode, Json<Page<UserDTO>>), AppError> {
    debug!("Registering a new account");
    // 1. Validate the form (email, password length, mobile number format)
    // 2. Email is the login name: refuse duplicates with CONFLICT
    // 3. Hash the password
    // 4. Create account and profile together, seeding the preferred location
    body.validate()?;

    if state.user.find_by_email(&body.email).await?.is_some() {
        warn!("Email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = User::hash_password(&body.password)?;
    let new_user = CreateUserDTO {
        email: body.email.trim().to_string(),
        password: password_hash,
        first_name: body.first_name.trim().to_string(),
        last_name: body.last_name.trim().to_string(),
        role: body.role,
    };

    let created_user = state
        .user
        .create_with_profile(
            &new_user,
            non_blank(body.mobile_number.as_deref()),
            non_blank(body.preferred_location.as_deref()),
        )
        .await?;
    info!("Account {} registered", created_user.user_id);

    let mut ctx = RequestContext::anonymous();
    ctx.flash(FlashLevel::Success, "Registration successful. You can now log in.");
    Ok((
        StatusCode::CREATED,
        Json(ctx.into_page(UserDTO::from(created_user))),
    ))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Fail fast on an empty password, before touching the database
    // 2. Look the account up by email, then check the password hash
    // 3. Issue the JWT as a cookie and as a bearer header
    // 4. Tell the client where to land based on the role
    if body.password.is_empty() {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let user = match state.user.find_by_email(&body.email).await? {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Invalid credentials");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
    };

    let token = encode_jwt(&user, &state.jwt_secret)?;
    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token, SESSION_COOKIE_MAX_AGE
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, header_value(&cookie_value)?);
    headers.insert(
        header::AUTHORIZATION,
        header_value(&format!("Bearer {}", token))?,
    );

    let landing = match user.role {
        AccountRole::Seller => "seller-dashboard",
        AccountRole::Buyer => "property-list",
    };
    info!("User {} logged in", user.user_id);

    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponseDTO {
            user: UserDTO::from(user),
            landing: landing.to_string(),
        }),
    ))
}

#[instrument]
pub async fn logout_user() -> Result<impl IntoResponse, AppError> {
    // stateless tokens: expiring the cookie is all there is to do
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        header_value("token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0")?,
    );

    let mut ctx = RequestContext::anonymous();
    ctx.flash(FlashLevel::Info, "You have been logged out.");
    Ok((StatusCode::OK, headers, Json(ctx.into_page(()))))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn password_reset_verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasswordResetVerifyDTO>,
) -> Result<Json<PasswordResetTokenDTO>, AppError> {
    debug!("Verifying identity for password reset");
    body.validate()?;

    let user = state
        .user
        .find_by_identity(&body.first_name, &body.last_name, &body.email)
        .await?
        .ok_or_else(|| {
            warn!("No account matches the reset request");
            AppError::bad_request("No account found with the provided details")
        })?;

    let reset_token = encode_reset_token(user.user_id, &state.jwt_secret)?;
    info!("Reset token issued for user {}", user.user_id);
    Ok(Json(PasswordResetTokenDTO { reset_token }))
}

#[instrument(skip(state, body))]
pub async fn password_reset_confirm(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasswordResetConfirmDTO>,
) -> Result<Json<Page<()>>, AppError> {
    debug!("Confirming password reset");
    // 1. Both password fields must match and be long enough
    // 2. The token must be a live reset token, session tokens are refused
    // 3. Store the new hash
    body.password.validate()?;
    let user_id = decode_reset_token(&body.token, &state.jwt_secret)?;

    let password_hash = User::hash_password(&body.password.new_password1)?;
    state
        .user
        .update_password(&user_id, &password_hash)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::unauthorized("Invalid or expired reset token"),
            other => AppError::from(other),
        })?;
    info!("Password reset for user {}", user_id);

    let mut ctx = RequestContext::anonymous();
    ctx.flash(FlashLevel::Success, "Your password has been reset. You can now log in.");
    Ok(Json(ctx.into_page(())))
}
