// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity claims and the authenticated request context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Registered claim names the token codec owns. Callers cannot override them.
pub(crate) const RESERVED_CLAIMS: [&str; 2] = ["exp", "iat"];

/// Identity signed into a session token.
///
/// The login endpoint accepts whatever the client sends alongside `email`
/// (display name, photo URL, ...) and signs it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IdentityClaim {
    /// Email address identifying the user in the directory
    pub email: String,

    /// Additional caller-supplied fields
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl IdentityClaim {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra claim field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Drop caller-supplied fields that collide with registered claims.
    pub(crate) fn without_reserved(mut self) -> Self {
        for name in RESERVED_CLAIMS {
            self.extra.remove(name);
        }
        self
    }
}

/// Full token payload: identity plus the registered time claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    #[serde(flatten)]
    pub identity: IdentityClaim,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Per-request view of the caller, attached by the authentication gate.
///
/// Read-only and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthenticatedContext {
    /// Verified email from the token
    pub email: String,
}

impl AuthenticatedContext {
    pub(crate) fn from_claims(claims: TokenClaims) -> Self {
        Self {
            email: claims.identity.email,
        }
    }

    /// Whether the caller is the owner of `email`.
    pub fn is_self(&self, email: &str) -> bool {
        self.email == email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_claim_keeps_extra_fields() {
        let claim: IdentityClaim =
            serde_json::from_str(r#"{"email":"a@x.com","name":"Ada"}"#).unwrap();
        assert_eq!(claim.email, "a@x.com");
        assert_eq!(claim.extra["name"], "Ada");

        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@x.com", "name": "Ada"}));
    }

    #[test]
    fn reserved_claims_are_stripped() {
        let claim = IdentityClaim::new("a@x.com")
            .with("exp", 1)
            .with("iat", 2)
            .with("name", "Ada")
            .without_reserved();
        assert_eq!(claim.extra.len(), 1);
        assert!(claim.extra.contains_key("name"));
    }

    #[test]
    fn token_claims_separate_time_fields_from_identity() {
        let claims: TokenClaims = serde_json::from_str(
            r#"{"email":"a@x.com","name":"Ada","iat":100,"exp":200}"#,
        )
        .unwrap();
        assert_eq!(claims.iat, 100);
        assert_eq!(claims.exp, 200);
        assert!(!claims.identity.extra.contains_key("exp"));

        let context = AuthenticatedContext::from_claims(claims);
        assert_eq!(context.email, "a@x.com");
        assert!(context.is_self("a@x.com"));
        assert!(!context.is_self("b@x.com"));
    }
}
