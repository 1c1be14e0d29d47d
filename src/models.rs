// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. User profiles, surveys and
//! payment records are free-form documents; only the fields the server
//! itself reads get typed structs here.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{Document, InsertOneResult};

// =============================================================================
// Documents
// =============================================================================

/// Free-form JSON object as sent by the client or returned from storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(value_type = Object)]
pub struct DocumentBody(pub Document);

impl From<Document> for DocumentBody {
    fn from(doc: Document) -> Self {
        DocumentBody(doc)
    }
}

impl From<DocumentBody> for Document {
    fn from(body: DocumentBody) -> Self {
        body.0
    }
}

/// Convert stored documents into response bodies.
pub fn document_bodies(docs: Vec<Document>) -> Vec<DocumentBody> {
    docs.into_iter().map(DocumentBody).collect()
}

// =============================================================================
// Session
// =============================================================================

/// Response for `POST /jwt` and `POST /logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
}

// =============================================================================
// Users
// =============================================================================

/// Returned instead of an insert result when the email is already registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserExistsResponse {
    pub message: String,
    /// Always `null`
    pub inserted_id: Option<String>,
}

impl UserExistsResponse {
    pub fn new() -> Self {
        Self {
            message: "User already exists".to_string(),
            inserted_id: None,
        }
    }
}

impl Default for UserExistsResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response for `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RegisterUserResponse {
    Created(InsertOneResult),
    AlreadyExists(UserExistsResponse),
}

/// Response for `GET /users/admin/{email}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminStatusResponse {
    pub admin: bool,
}

/// Response for `GET /users/surveyor/{email}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SurveyorStatusResponse {
    pub surveyor: bool,
}

/// Request for `PATCH /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// `Admin`, `Surveyor`, or empty / `Unassigned` to revoke
    #[serde(default)]
    pub role: Option<String>,
}

// =============================================================================
// Payments
// =============================================================================

/// Request for `POST /create-payment-intent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    /// Price in major currency units (e.g. `9.99`)
    pub price: f64,
}

/// Response for `POST /create-payment-intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}
