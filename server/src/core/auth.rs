use crate::core::{AppError, AppState, RequestContext};
use crate::entities::{AccountRole, User};
use crate::repositories::Read;
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::HeaderMap, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const SESSION_HOURS: i64 = 24;
const RESET_MINUTES: i64 = 15;
const RESET_PURPOSE: &str = "password_reset";

// content of the session jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i64,
    pub email: String,
    pub role: AccountRole,
}

/// Claims of the short-lived token handed out by the password reset verification step
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub exp: usize,
    pub iat: usize,
    pub id: i64,
    pub purpose: String,
}

fn issue<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        AppError::internal_server_error("Error in encoding jwt token")
    })
}

#[instrument(skip(user, secret), fields(user_id = %user.user_id))]
pub fn encode_jwt(user: &User, secret: &str) -> Result<String, AppError> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let claims = Claims {
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(SESSION_HOURS)).timestamp() as usize,
        id: user.user_id,
        email: user.email.clone(),
        role: user.role,
    };
    let token = issue(&claims, secret)?;
    info!("JWT token encoded successfully");
    Ok(token)
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, AppError> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        AppError::unauthorized("Unable to decode token")
    })
}

#[instrument(skip(secret))]
pub fn encode_reset_token(user_id: i64, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = ResetClaims {
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(RESET_MINUTES)).timestamp() as usize,
        id: user_id,
        purpose: RESET_PURPOSE.to_string(),
    };
    issue(&claims, secret)
}

/// Returns the user id the reset token was issued for.
/// Session tokens are rejected: they lack the reset purpose.
#[instrument(skip(token, secret))]
pub fn decode_reset_token(token: &str, secret: &str) -> Result<i64, AppError> {
    let data = decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Invalid password reset token: {:?}", e);
        AppError::unauthorized("Invalid or expired reset token")
    })?;

    if data.claims.purpose != RESET_PURPOSE {
        warn!("Token presented for reset has purpose {}", data.claims.purpose);
        return Err(AppError::unauthorized("Invalid or expired reset token"));
    }
    Ok(data.claims.id)
}

/// Bearer token from the Authorization header, falling back to the `token` cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(http::header::AUTHORIZATION) {
        let value = value.to_str().ok()?;
        let mut parts = value.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => {
                Some(token.to_string())
            }
            _ => None,
        };
    }

    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix("token="))
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolves the token into a live user
async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let token_data = decode_jwt(token, &state.jwt_secret)?;

    match state.user.read(&token_data.claims.id).await? {
        Some(user) => {
            info!("User authenticated: {}", user.email);
            Ok(user)
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.id);
            Err(AppError::unauthorized("You are not an authorized user"))
        }
    }
}

/// Requires an authenticated user. Installs both the `User` and the `RequestContext`
/// extensions.
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = extract_token(req.headers()).ok_or_else(|| {
        warn!("Missing or malformed authorization header");
        AppError::unauthorized("Please add the JWT token to the header")
    })?;

    let current_user = resolve_user(&state, &token).await?;

    req.extensions_mut()
        .insert(RequestContext::authenticated(current_user.clone()));
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Identity is optional: anonymous visitors, and tokens that are expired, invalid or point to a
/// removed account, get an empty context.
#[instrument(skip(state, req, next))]
pub async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let ctx = match extract_token(req.headers()) {
        Some(token) => match resolve_user(&state, &token).await {
            Ok(user) => RequestContext::authenticated(user),
            Err(err) if err.status() == http::StatusCode::UNAUTHORIZED => {
                warn!("Unusable token on a public route, continuing anonymously: {err}");
                RequestContext::anonymous()
            }
            Err(err) => return Err(err),
        },
        None => {
            debug!("Anonymous request");
            RequestContext::anonymous()
        }
    };
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Must run after `authentication_middleware`
#[instrument(skip(req, next))]
pub async fn seller_guard_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let current_user = req.extensions().get::<User>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("User not authenticated")
    })?;

    require_account_role(current_user, &[AccountRole::Seller])?;
    Ok(next.run(req).await)
}

/// Checks that the account has one of the required roles
///
/// # Arguments
/// * `user` - The authenticated account
/// * `allowed_roles` - Roles allowed to proceed
///
/// # Returns
/// * `Ok(())` if the role is allowed
/// * `Err(AppError)` (403) otherwise
#[instrument(skip(user), fields(user_id = %user.user_id))]
pub fn require_account_role(user: &User, allowed_roles: &[AccountRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&user.role) {
        warn!(
            "User {} has role {:?}, required one of: {:?}",
            user.user_id, user.role, allowed_roles
        );
        return Err(AppError::forbidden("Insufficient role").with_details(format!(
            "This action requires one of the following roles: {:?}",
            allowed_roles
        )));
    }

    debug!("Role check passed for user {} with role {:?}", user.user_id, user.role);
    Ok(())
}
