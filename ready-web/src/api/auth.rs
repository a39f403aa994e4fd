//! Registration, login and session handlers
//!
//! Successful register/login responses carry the bearer token twice: in the
//! JSON body for API clients and as an HttpOnly `access_token` cookie for the
//! browser UI. Login failure is a single undifferentiated 401 regardless of
//! which credential was wrong.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use ready_common::db::{analytics, users, User};
use ready_common::{auth, Error};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::middleware::{AuthUser, TOKEN_COOKIE};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub name: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    let email = req.email.trim();
    validate_email(email)?;
    if req.password.is_empty() {
        return Err(Error::InvalidInput("Password must not be empty".to_string()).into());
    }

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&req.password, &salt);
    let user = users::create_user(
        &state.db,
        email,
        &hash,
        &salt,
        req.name.as_deref(),
        req.organization.as_deref(),
    )
    .await?;

    analytics::record_event(
        &state.db,
        analytics::EVENT_USER_REGISTERED,
        Some(&user.guid),
        None,
        None,
    )
    .await?;

    let token = auth::issue_token(&user.guid, &state.token_secret, Utc::now())?;
    Ok(auth_success("Registration successful", token, &user))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    let email = req.email.trim();

    let creds = match users::find_credentials(&state.db, email).await? {
        Some(creds)
            if auth::verify_password(&req.password, &creds.password_salt, &creds.password_hash) =>
        {
            creds
        }
        _ => return Err(Error::Unauthorized.into()),
    };

    users::touch_last_login(&state.db, &creds.guid).await?;
    analytics::record_event(
        &state.db,
        analytics::EVENT_USER_LOGIN,
        Some(&creds.guid),
        None,
        None,
    )
    .await?;

    let user = users::find_by_guid(&state.db, &creds.guid)
        .await?
        .ok_or_else(|| Error::Internal("User vanished during login".to_string()))?;

    let token = auth::issue_token(&user.guid, &state.token_secret, Utc::now())?;
    Ok(auth_success("Login successful", token, &user))
}

/// POST /api/auth/logout
pub async fn logout() -> Response {
    let clear = format!("{}=; HttpOnly; Max-Age=0; Path=/; SameSite=Lax", TOKEN_COOKIE);
    (
        [(header::SET_COOKIE, clear)],
        Json(StatusMessage {
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/auth/me
pub async fn current_user(Extension(auth_user): Extension<AuthUser>) -> Json<ProfileResponse> {
    let user = auth_user.user;
    Json(ProfileResponse {
        email: user.email,
        name: user.name,
        organization: user.organization,
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn auth_success(message: &str, token: String, user: &User) -> Response {
    let cookie = format!(
        "{}={}; HttpOnly; Max-Age={}; Path=/; SameSite=Lax",
        TOKEN_COOKIE,
        token,
        60 * 60 * 24 * auth::TOKEN_VALIDITY_DAYS
    );
    (
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            message: message.to_string(),
            token,
            user: UserInfo {
                email: user.email.clone(),
                name: user.name.clone(),
            },
        }),
    )
        .into_response()
}

/// Minimal shape check, rejected before anything touches the database
fn validate_email(email: &str) -> Result<(), Error> {
    let valid = email.len() <= 254
        && !email.contains(char::is_whitespace)
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput("Invalid email address".to_string()))
    }
}
