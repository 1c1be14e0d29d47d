// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{IdentityClaim, Role},
    models::{
        AdminStatusResponse, CreatePaymentIntentRequest, CreatePaymentIntentResponse,
        DocumentBody, RegisterUserResponse, SessionResponse, SurveyorStatusResponse,
        UpdateRoleRequest, UserExistsResponse,
    },
    state::AppState,
    storage::{DeleteResult, InsertOneResult, UpdateResult},
};

pub mod extract;
pub mod health;
pub mod payments;
pub mod session;
pub mod surveys;
pub mod users;

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    let routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/jwt", post(session::issue_token))
        .route("/logout", post(session::logout))
        .route("/users", get(users::list_users).post(users::register_user))
        .route("/users/admin/{email}", get(users::admin_status))
        .route("/users/surveyor/{email}", get(users::surveyor_status))
        .route(
            "/users/{id}",
            patch(users::update_role).delete(users::delete_user),
        )
        .route(
            "/surveys",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route(
            "/surveys/{id}",
            get(surveys::get_survey)
                .patch(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route(
            "/payments",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/payments/{email}", get(payments::payments_for_user))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Credentialed CORS for an explicit list of front-end origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        session::issue_token,
        session::logout,
        users::list_users,
        users::register_user,
        users::admin_status,
        users::surveyor_status,
        users::update_role,
        users::delete_user,
        surveys::list_surveys,
        surveys::get_survey,
        surveys::create_survey,
        surveys::update_survey,
        surveys::delete_survey,
        payments::create_payment_intent,
        payments::record_payment,
        payments::list_payments,
        payments::payments_for_user
    ),
    components(
        schemas(
            IdentityClaim,
            Role,
            SessionResponse,
            DocumentBody,
            RegisterUserResponse,
            UserExistsResponse,
            AdminStatusResponse,
            SurveyorStatusResponse,
            UpdateRoleRequest,
            CreatePaymentIntentRequest,
            CreatePaymentIntentResponse,
            InsertOneResult,
            UpdateResult,
            DeleteResult,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Session", description = "Session cookie issuance and logout"),
        (name = "Users", description = "Registration, role queries and administration"),
        (name = "Surveys", description = "Survey management"),
        (name = "Payments", description = "Payment intents and payment records")
    )
)]
struct ApiDoc;
