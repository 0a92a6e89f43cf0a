//! Authentication middleware.
//!
//! A simple Bearer token extraction mechanism. The token names the library
//! owner; it is not checked against any credential store.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};

use crate::AppState;

/// Owner used for unauthenticated requests when no auth secret is configured.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Authenticated user extracted from request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Owner whose library the request acts on
    pub owner_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        owner_from_header(auth_header, state.config.auth_secret.is_some())
    }
}

fn owner_from_header(
    header: Option<&str>,
    auth_required: bool,
) -> Result<AuthUser, (StatusCode, &'static str)> {
    match header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(AuthUser {
                owner_id: token.trim().to_string(),
            }),
            Some(_) => Err((StatusCode::UNAUTHORIZED, "Empty bearer token")),
            None => Err((
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format",
            )),
        },
        None if auth_required => Err((StatusCode::UNAUTHORIZED, "Missing authorization header")),
        // No auth configured, allow anonymous access
        None => Ok(AuthUser {
            owner_id: ANONYMOUS_OWNER.to_string(),
        }),
    }
}
