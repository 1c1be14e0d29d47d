// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: token issuance and logout.

use axum::{extract::State, http::HeaderMap, Json};
use tracing::info;

use super::extract::JsonBody;
use crate::{auth::IdentityClaim, error::ApiError, models::SessionResponse, state::AppState};

/// Sign the posted identity and set it as the session cookie.
///
/// No authentication: the front end has already signed the user in with its
/// identity provider and posts the resulting profile here.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = IdentityClaim,
    tag = "Session",
    responses(
        (status = 200, description = "Cookie set", body = SessionResponse),
        (status = 400, description = "Email missing")
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(claim): JsonBody<IdentityClaim>,
) -> Result<(HeaderMap, Json<SessionResponse>), ApiError> {
    if claim.email.trim().is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }

    let email = claim.email.clone();
    let token = state.tokens.issue(claim)?;

    let mut headers = HeaderMap::new();
    state.cookies.attach(&mut headers, &token);

    info!(email = %email, "Issued session token");
    Ok((headers, Json(SessionResponse { success: true })))
}

/// Expire the session cookie. The token itself stays valid until it expires.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Session",
    responses((status = 200, description = "Cookie cleared", body = SessionResponse))
)]
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<SessionResponse>) {
    let mut headers = HeaderMap::new();
    state.cookies.clear(&mut headers);
    (headers, Json(SessionResponse { success: true }))
}
