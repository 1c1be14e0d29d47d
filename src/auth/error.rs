// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized access";
pub const FORBIDDEN_MESSAGE: &str = "forbidden access...";
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Gate failure. Halts the request before it reaches the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No session cookie presented
    Unauthorized,
    /// Token invalid or expired, role insufficient, or another user's resource
    Forbidden,
    /// Gate misconfigured or directory unavailable
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: &'static str,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => UNAUTHORIZED_MESSAGE,
            AuthError::Forbidden => FORBIDDEN_MESSAGE,
            AuthError::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Internal(msg) => write!(f, "internal authentication error: {msg}"),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref detail) = self {
            tracing::error!(error = %detail, "Authorization gate failed");
        }
        let body = Json(AuthErrorBody {
            message: self.message(),
        });
        (self.status_code(), body).into_response()
    }
}
