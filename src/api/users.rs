// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints: registration, role queries and administration.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    auth::{ensure_self, AdminOnly, Auth, Role},
    error::ApiError,
    models::{
        document_bodies, AdminStatusResponse, DocumentBody, RegisterUserResponse,
        SurveyorStatusResponse, UpdateRoleRequest, UserExistsResponse,
    },
    state::AppState,
    storage::{DeleteResult, Registration, UpdateResult, UserDirectory, UserKey},
};

use super::extract::JsonBody;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "Every user document", body = [DocumentBody]),
        (status = 401, description = "No session cookie"),
        (status = 403, description = "Invalid or expired session")
    )
)]
pub async fn list_users(
    Auth(_caller): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentBody>>, ApiError> {
    let users = UserDirectory::new(&state.store).list()?;
    Ok(Json(document_bodies(users)))
}

/// Register a user unless the email is already known.
#[utoipa::path(
    post,
    path = "/users",
    request_body = DocumentBody,
    tag = "Users",
    responses(
        (
            status = 200,
            description = "Insert result, or the already-exists notice",
            body = RegisterUserResponse
        ),
        (status = 400, description = "Email missing")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(user): JsonBody<DocumentBody>,
) -> Result<Json<RegisterUserResponse>, ApiError> {
    match UserDirectory::new(&state.store).register(user.into())? {
        Registration::Created(result) => {
            info!(user_id = %result.inserted_id, "Registered user");
            Ok(Json(RegisterUserResponse::Created(result)))
        }
        Registration::AlreadyExists => Ok(Json(RegisterUserResponse::AlreadyExists(
            UserExistsResponse::new(),
        ))),
    }
}

/// Whether the caller is an admin. Callers may only ask about themselves.
#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    tag = "Users",
    responses(
        (status = 200, body = AdminStatusResponse),
        (status = 403, description = "Email is not the caller's")
    )
)]
pub async fn admin_status(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatusResponse>, ApiError> {
    ensure_self(&caller, &email)?;
    let role = UserDirectory::new(&state.store).role_of(&email)?;
    Ok(Json(AdminStatusResponse {
        admin: role == Some(Role::Admin),
    }))
}

/// Whether the caller is a surveyor. Callers may only ask about themselves.
#[utoipa::path(
    get,
    path = "/users/surveyor/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    tag = "Users",
    responses(
        (status = 200, body = SurveyorStatusResponse),
        (status = 403, description = "Email is not the caller's")
    )
)]
pub async fn surveyor_status(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<SurveyorStatusResponse>, ApiError> {
    ensure_self(&caller, &email)?;
    let role = UserDirectory::new(&state.store).role_of(&email)?;
    Ok(Json(SurveyorStatusResponse {
        surveyor: role == Some(Role::Surveyor),
    }))
}

/// Set a user's role (upsert).
///
/// The path segment is the caller's own email or a record id.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Record id, or the caller's own email")),
    request_body = UpdateRoleRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Update result", body = UpdateResult),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn update_role(
    AdminOnly(caller): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateRoleRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let requested = request.role.unwrap_or_default();
    let role = Role::from_str(&requested)
        .ok_or_else(|| ApiError::bad_request(format!("unknown role: {requested}")))?;

    let key = UserKey::resolve(&id, &caller.email);
    let result = UserDirectory::new(&state.store).set_role(&key, role)?;

    info!(admin = %caller.email, target = ?key, %role, "Updated user role");
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Record id")),
    tag = "Users",
    responses(
        (status = 200, description = "Delete result", body = DeleteResult),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn delete_user(
    AdminOnly(caller): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = UserDirectory::new(&state.store).delete(&id)?;
    info!(admin = %caller.email, user_id = %id, deleted = result.deleted_count, "Deleted user");
    Ok(Json(result))
}
