// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    auth::SurveyorOnly,
    error::ApiError,
    models::{document_bodies, DocumentBody},
    state::AppState,
    storage::{DeleteResult, InsertOneResult, SurveyRepository, UpdateResult},
};

use super::extract::JsonBody;

#[utoipa::path(
    get,
    path = "/surveys",
    tag = "Surveys",
    responses((status = 200, body = [DocumentBody]))
)]
pub async fn list_surveys(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentBody>>, ApiError> {
    let surveys = SurveyRepository::new(&state.store).list()?;
    Ok(Json(document_bodies(surveys)))
}

#[utoipa::path(
    get,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    tag = "Surveys",
    responses(
        (status = 200, body = DocumentBody),
        (status = 404, description = "No such survey")
    )
)]
pub async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentBody>, ApiError> {
    SurveyRepository::new(&state.store)
        .get(&id)?
        .map(|doc| Json(doc.into()))
        .ok_or_else(|| ApiError::not_found("survey not found"))
}

#[utoipa::path(
    post,
    path = "/surveys",
    request_body = DocumentBody,
    tag = "Surveys",
    responses(
        (status = 200, body = InsertOneResult),
        (status = 403, description = "Caller is not a surveyor")
    )
)]
pub async fn create_survey(
    SurveyorOnly(caller): SurveyorOnly,
    State(state): State<AppState>,
    JsonBody(survey): JsonBody<DocumentBody>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = SurveyRepository::new(&state.store).create(&caller.email, survey.into())?;
    info!(survey_id = %result.inserted_id, surveyor = %caller.email, "Created survey");
    Ok(Json(result))
}

#[utoipa::path(
    patch,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    request_body = DocumentBody,
    tag = "Surveys",
    responses(
        (status = 200, body = UpdateResult),
        (status = 403, description = "Caller is not a surveyor")
    )
)]
pub async fn update_survey(
    SurveyorOnly(caller): SurveyorOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(fields): JsonBody<DocumentBody>,
) -> Result<Json<UpdateResult>, ApiError> {
    let result = SurveyRepository::new(&state.store).update(&id, fields.into())?;
    info!(
        survey_id = %id,
        surveyor = %caller.email,
        matched = result.matched_count,
        "Updated survey"
    );
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    tag = "Surveys",
    responses(
        (status = 200, body = DeleteResult),
        (status = 403, description = "Caller is not a surveyor")
    )
)]
pub async fn delete_survey(
    SurveyorOnly(caller): SurveyorOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = SurveyRepository::new(&state.store).delete(&id)?;
    info!(
        survey_id = %id,
        surveyor = %caller.email,
        deleted = result.deleted_count,
        "Deleted survey"
    );
    Ok(Json(result))
}
