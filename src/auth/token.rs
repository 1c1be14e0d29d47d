// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token codec.
//!
//! Tokens are HS256 JWTs signed with the server-held secret
//! (`ACCESS_TOKEN_SECRET`). There is no server-side session table, so a
//! token stays valid until it expires; logout only discards the client copy.
//!
//! Both operations take the current time explicitly (`issue_at`,
//! `verify_at`) so expiry is a pure function of input, secret and clock.
//! A token is expired once `now >= exp`; no leeway is applied.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::{IdentityClaim, TokenClaims};

/// Default token lifetime (2 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Token codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Expiration has elapsed
    #[error("token has expired")]
    Expired,

    /// Signature does not verify against the server secret
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Not a decodable JWT
    #[error("token is malformed")]
    Malformed,

    /// Signing failed
    #[error("failed to sign token: {0}")]
    Encoding(String),
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec with the default 2-hour lifetime.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the lifetime used by [`TokenCodec::issue`].
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `claim` with the configured lifetime, starting now.
    pub fn issue(&self, claim: IdentityClaim) -> Result<String, TokenError> {
        self.issue_at(claim, self.ttl, Utc::now().timestamp())
    }

    /// Sign `claim` with an expiration of `now + ttl`.
    pub fn issue_at(
        &self,
        claim: IdentityClaim,
        ttl: Duration,
        now: i64,
    ) -> Result<String, TokenError> {
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| TokenError::Encoding(format!("lifetime of {ttl:?} is out of range")))?;

        let claims = TokenClaims {
            identity: claim.without_reserved(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, TokenError> {
        self.verify_claims(token, Utc::now().timestamp())
            .map(|claims| claims.identity)
    }

    /// Verify signature and expiration as of `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<IdentityClaim, TokenError> {
        self.verify_claims(token, now).map(|claims| claims.identity)
    }

    pub(crate) fn verify_claims(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &[u8] = b"test-secret-with-enough-entropy";
    const NOW: i64 = 1_700_000_000;
    const TTL: Duration = Duration::from_secs(7200);

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    fn claim() -> IdentityClaim {
        IdentityClaim::new("a@x.com").with("name", "Ada")
    }

    #[test]
    fn verify_returns_issued_claim_before_expiry() {
        let token = codec().issue_at(claim(), TTL, NOW).unwrap();

        assert_eq!(codec().verify_at(&token, NOW).unwrap(), claim());
        assert_eq!(codec().verify_at(&token, NOW + 7199).unwrap(), claim());
    }

    #[test]
    fn verify_fails_at_and_after_expiry() {
        let token = codec().issue_at(claim(), TTL, NOW).unwrap();

        assert_eq!(codec().verify_at(&token, NOW + 7200), Err(TokenError::Expired));
        assert_eq!(codec().verify_at(&token, NOW + 86_400), Err(TokenError::Expired));
    }

    #[test]
    fn issue_uses_wall_clock() {
        let token = codec().issue(claim()).unwrap();
        assert_eq!(codec().verify(&token).unwrap().email, "a@x.com");

        let stale = codec()
            .issue_at(claim(), TTL, Utc::now().timestamp() - 3 * 3600)
            .unwrap();
        assert_eq!(codec().verify(&stale), Err(TokenError::Expired));
    }

    #[test]
    fn mutated_signature_is_rejected() {
        let token = codec().issue_at(claim(), TTL, NOW).unwrap();
        let (head, signature) = token.rsplit_once('.').unwrap();

        let mut sig = signature.to_string();
        let replacement = if sig.starts_with('A') { "B" } else { "A" };
        sig.replace_range(0..1, replacement);
        let tampered = format!("{head}.{sig}");

        assert_eq!(
            codec().verify_at(&tampered, NOW),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn forged_payload_is_rejected() {
        let token = codec().issue_at(claim(), TTL, NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"email":"root@x.com","iat":{NOW},"exp":{}}}"#,
            NOW + 7200
        ));
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            codec().verify_at(&forged, NOW),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = TokenCodec::new(b"some-other-secret");
        let token = other.issue_at(claim(), TTL, NOW).unwrap();

        assert_eq!(
            codec().verify_at(&token, NOW),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(codec().verify_at("not-a-jwt", NOW), Err(TokenError::Malformed));
        assert_eq!(codec().verify_at("", NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn caller_cannot_extend_expiry() {
        let sneaky = IdentityClaim::new("a@x.com").with("exp", NOW + 10_000_000);
        let token = codec().issue_at(sneaky, TTL, NOW).unwrap();

        assert_eq!(codec().verify_at(&token, NOW + 7200), Err(TokenError::Expired));
    }

    #[test]
    fn out_of_range_lifetime_fails_to_issue() {
        let codec = codec().with_ttl(Duration::from_secs(u64::MAX));
        assert!(matches!(codec.issue(claim()), Err(TokenError::Encoding(_))));

        let near_limit = Duration::from_secs(i64::MAX as u64);
        assert!(matches!(
            codec.issue_at(claim(), near_limit, NOW),
            Err(TokenError::Encoding(_))
        ));
    }

    #[test]
    fn with_ttl_overrides_lifetime() {
        let codec = codec().with_ttl(Duration::from_secs(60));
        assert_eq!(codec.ttl(), Duration::from_secs(60));
        assert_eq!(TokenCodec::new(SECRET).ttl(), DEFAULT_TOKEN_TTL);
    }
}
