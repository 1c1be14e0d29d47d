// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment endpoints.
//!
//! The server creates card payment intents with the provider and records
//! payments the front end reports as completed. Settlement is not tracked.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    auth::{ensure_self, AdminOnly, Auth},
    error::ApiError,
    models::{
        document_bodies, CreatePaymentIntentRequest, CreatePaymentIntentResponse, DocumentBody,
    },
    providers::{amount_in_minor, PaymentError},
    state::AppState,
    storage::{InsertOneResult, PaymentRepository},
};

use super::extract::JsonBody;

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    tag = "Payments",
    responses(
        (status = 200, body = CreatePaymentIntentResponse),
        (status = 400, description = "Price is not a positive amount"),
        (status = 502, description = "Payment provider failed"),
        (status = 503, description = "Payments are not configured")
    )
)]
pub async fn create_payment_intent(
    Auth(caller): Auth,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, ApiError> {
    let client = state.payments.as_ref().ok_or(PaymentError::NotConfigured)?;
    let amount = amount_in_minor(request.price)?;

    let intent = client.create_payment_intent(amount).await?;
    info!(email = %caller.email, payment_intent = %intent.id, "Payment intent ready");

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Record a completed payment for the caller.
#[utoipa::path(
    post,
    path = "/payments",
    request_body = DocumentBody,
    tag = "Payments",
    responses((status = 200, body = InsertOneResult))
)]
pub async fn record_payment(
    Auth(caller): Auth,
    State(state): State<AppState>,
    JsonBody(payment): JsonBody<DocumentBody>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = PaymentRepository::new(&state.store).record(&caller.email, payment.into())?;
    info!(email = %caller.email, payment_id = %result.inserted_id, "Recorded payment");
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    responses(
        (status = 200, body = [DocumentBody]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_payments(
    AdminOnly(_caller): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentBody>>, ApiError> {
    let payments = PaymentRepository::new(&state.store).list()?;
    Ok(Json(document_bodies(payments)))
}

#[utoipa::path(
    get,
    path = "/payments/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    tag = "Payments",
    responses(
        (status = 200, body = [DocumentBody]),
        (status = 403, description = "Email is not the caller's")
    )
)]
pub async fn payments_for_user(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<DocumentBody>>, ApiError> {
    ensure_self(&caller, &email)?;
    let payments = PaymentRepository::new(&state.store).list_by_email(&email)?;
    Ok(Json(document_bodies(payments)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedContext;
    use axum::http::StatusCode;
    use serde_json::json;

    fn create_test_state() -> AppState {
        AppState::in_memory(b"payments-test-secret").unwrap()
    }

    fn caller(email: &str) -> AuthenticatedContext {
        AuthenticatedContext {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn payment_intent_requires_configured_provider() {
        let state = create_test_state();
        let err = create_payment_intent(
            Auth(caller("a@x.com")),
            State(state),
            JsonBody(CreatePaymentIntentRequest { price: 9.99 }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn recorded_payments_are_visible_to_their_owner_only() {
        let state = create_test_state();
        let body: DocumentBody =
            serde_json::from_value(json!({"transactionId": "pi_1", "price": 9.99})).unwrap();

        let Json(result) =
            record_payment(Auth(caller("a@x.com")), State(state.clone()), JsonBody(body))
                .await
                .unwrap();
        assert!(result.acknowledged);

        let Json(mine) = payments_for_user(
            Auth(caller("a@x.com")),
            State(state.clone()),
            Path("a@x.com".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].0["email"], "a@x.com");

        let err = payments_for_user(
            Auth(caller("b@x.com")),
            State(state.clone()),
            Path("a@x.com".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(all) = list_payments(AdminOnly(caller("admin@x.com")), State(state))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }
}
