//! Identity resolution middleware
//!
//! Resolves the caller's identity from the `Authorization: Bearer <token>`
//! header, falling back to the `access_token` cookie. An absent, malformed or
//! expired token makes the request anonymous; protected routes reject
//! anonymous callers with 401.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use ready_common::db::users;
use ready_common::db::User;
use ready_common::{auth, Error};

use crate::api::error::ApiError;
use crate::AppState;

/// Cookie name mirroring the bearer token
pub const TOKEN_COOKIE: &str = "access_token";

/// Authenticated user attached to request extensions for handlers
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// Middleware guarding protected routes
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match resolve_identity(&state, req.headers()).await? {
        Some(user) => {
            req.extensions_mut().insert(AuthUser { user });
            Ok(next.run(req).await)
        }
        None => Err(Error::Unauthorized.into()),
    }
}

/// Two-source token lookup: Bearer header first, then cookie.
/// Returns `None` (anonymous) for any token that fails verification or names
/// a user that no longer exists.
async fn resolve_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<User>, ApiError> {
    let token = match bearer_token(headers).or_else(|| cookie_token(headers)) {
        Some(token) => token,
        None => return Ok(None),
    };

    let user_guid = match auth::verify_token(&token, &state.token_secret) {
        Some(guid) => guid,
        None => return Ok(None),
    };

    Ok(users::find_by_guid(&state.db, &user_guid).await?)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(TOKEN_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
