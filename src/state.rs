// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CookiePolicy, TokenCodec};
use crate::providers::stripe::StripeClient;
use crate::storage::{DocumentStore, StorageResult, COLLECTIONS};

/// Application context shared by every handler and gate.
///
/// Built once at startup; there is no process-global state.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub tokens: Arc<TokenCodec>,
    pub cookies: CookiePolicy,
    /// Payment provider, `None` when no secret key is configured
    pub payments: Option<Arc<StripeClient>>,
    /// Front-end origins allowed to make credentialed requests
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(store: DocumentStore, tokens: TokenCodec) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            cookies: CookiePolicy::development(),
            payments: None,
            cors_origins: Vec::new(),
        }
    }

    /// Fresh in-memory state signing with `secret`.
    pub fn in_memory(secret: &[u8]) -> StorageResult<Self> {
        Ok(Self::new(
            DocumentStore::in_memory(&COLLECTIONS)?,
            TokenCodec::new(secret),
        ))
    }

    pub fn with_cookie_policy(mut self, cookies: CookiePolicy) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn with_payments(mut self, client: StripeClient) -> Self {
        self.payments = Some(Arc::new(client));
        self
    }
}
