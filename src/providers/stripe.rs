// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stripe integration for payment-intent creation.
//!
//! Only intent creation lives here. Confirmation happens between the browser
//! and Stripe; settlement is not tracked by this service.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::PaymentConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
pub const DEFAULT_CURRENCY: &str = "usd";
const PAYMENT_INTENTS_PATH: &str = "/v1/payment_intents";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider is not configured")]
    NotConfigured,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("payment provider request failed: {0}")]
    Request(String),

    #[error("payment provider rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("payment provider response was invalid: {0}")]
    InvalidResponse(String),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            PaymentError::Request(_)
            | PaymentError::Provider { .. }
            | PaymentError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Intent created by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Convert a price in major units (e.g. `9.99`) to minor units (`999`).
pub fn amount_in_minor(price: f64) -> Result<u64, PaymentError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PaymentError::InvalidAmount(format!(
            "price must be a positive number, got {price}"
        )));
    }
    let minor = (price * 100.0).round();
    if minor < 1.0 || minor > u32::MAX as f64 {
        return Err(PaymentError::InvalidAmount(format!(
            "price {price} is out of range"
        )));
    }
    Ok(minor as u64)
}

#[derive(Clone)]
pub struct StripeClient {
    api_base_url: String,
    secret_key: String,
    currency: String,
    http: Client,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base_url", &self.api_base_url)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| PaymentError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
            http,
        })
    }

    /// Create a card payment intent for `amount_in_minor` units.
    pub async fn create_payment_intent(
        &self,
        amount_in_minor: u64,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}{}", self.api_base_url, PAYMENT_INTENTS_PATH);
        let amount = amount_in_minor.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", self.currency.as_str()),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| "unknown provider error".to_string());
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let intent = response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        info!(
            payment_intent = %intent.id,
            amount = amount_in_minor,
            currency = %self.currency,
            "Created payment intent"
        );

        Ok(intent)
    }
}
