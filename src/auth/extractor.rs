// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors implementing the authentication and authorization gates.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(caller): Auth) -> impl IntoResponse {
//!     // caller is AuthenticatedContext
//! }
//! ```
//!
//! Role-gated handlers take `AdminOnly` or `SurveyorOnly` instead. Both run
//! the authentication gate first, so a request without a cookie is rejected
//! with 401 before the directory is consulted.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use tracing::{debug, warn};

use super::{cookie, AuthError, AuthenticatedContext, Role};
use crate::state::AppState;
use crate::storage::{DocumentStore, UserDirectory};

/// Extractor for authenticated callers.
///
/// Reads the session cookie, verifies the token, and caches the resulting
/// context in the request extensions so later extractors reuse it.
///
/// - no cookie → [`AuthError::Unauthorized`]
/// - bad signature, malformed or expired token → [`AuthError::Forbidden`]
pub struct Auth(pub AuthenticatedContext);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<AuthenticatedContext>().cloned() {
            return Ok(Auth(context));
        }

        let token = cookie::extract(&parts.headers).ok_or(AuthError::Unauthorized)?;

        let claims = state
            .tokens
            .verify_claims(&token, Utc::now().timestamp())
            .map_err(|e| {
                debug!(error = %e, "Rejected session token");
                AuthError::Forbidden
            })?;

        let context = AuthenticatedContext::from_claims(claims);
        parts.extensions.insert(context.clone());

        Ok(Auth(context))
    }
}

/// Check that the caller's directory record holds exactly `required`.
///
/// A missing record is treated the same as a different role.
pub fn authorize(
    store: &DocumentStore,
    context: &AuthenticatedContext,
    required: Role,
) -> Result<(), AuthError> {
    let role = UserDirectory::new(store)
        .role_of(&context.email)
        .map_err(|e| AuthError::Internal(format!("role lookup failed: {e}")))?;

    match role {
        Some(role) if role == required => Ok(()),
        Some(role) => {
            warn!(email = %context.email, %role, %required, "Role check failed");
            Err(AuthError::Forbidden)
        }
        None => {
            warn!(email = %context.email, %required, "Role check failed: no directory record");
            Err(AuthError::Forbidden)
        }
    }
}

/// Reject requests for another user's resource.
pub fn ensure_self(context: &AuthenticatedContext, email: &str) -> Result<(), AuthError> {
    if context.is_self(email) {
        Ok(())
    } else {
        debug!(caller = %context.email, requested = %email, "Self-match rule failed");
        Err(AuthError::Forbidden)
    }
}

/// Extractor that requires the `Admin` role.
pub struct AdminOnly(pub AuthenticatedContext);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(context) = Auth::from_request_parts(parts, state).await?;
        authorize(&state.store, &context, Role::Admin)?;
        Ok(AdminOnly(context))
    }
}

/// Extractor that requires the `Surveyor` role.
pub struct SurveyorOnly(pub AuthenticatedContext);

impl FromRequestParts<AppState> for SurveyorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(context) = Auth::from_request_parts(parts, state).await?;
        authorize(&state.store, &context, Role::Surveyor)?;
        Ok(SurveyorOnly(context))
    }
}
