// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info, warn};

use survey_server::{
    api::router,
    auth::{CookiePolicy, TokenCodec},
    config::{AppConfig, LogFormat},
    logging::init_tracing,
    providers::StripeClient,
    state::AppState,
    storage::{DocumentStore, COLLECTIONS},
};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the real environment still applies.
    let _ = dotenvy::dotenv();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);
    info!(?config, "Loaded configuration");

    let store = match DocumentStore::open(&config.database_path, &COLLECTIONS) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, path = %config.database_path.display(), "Failed to open database");
            return ExitCode::FAILURE;
        }
    };
    info!(path = %config.database_path.display(), "Opened document store");

    let tokens = TokenCodec::new(config.token_secret.as_bytes()).with_ttl(config.token_ttl);
    let mut state = AppState::new(store, tokens)
        .with_cookie_policy(CookiePolicy::new(config.production))
        .with_cors_origins(config.cors_origins.clone());

    match config.payments.as_ref().map(StripeClient::new) {
        Some(Ok(client)) => state = state.with_payments(client),
        Some(Err(e)) => {
            error!(error = %e, "Failed to initialise payment provider");
            return ExitCode::FAILURE;
        }
        None => warn!("STRIPE_SECRET_KEY not set; payment intents are disabled"),
    }

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, host = %config.host, "Failed to parse bind address");
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, "survey server is running on port {}", config.port);

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
