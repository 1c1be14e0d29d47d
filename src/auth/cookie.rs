// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie transport for the token.
//!
//! The cookie is always `HttpOnly`. In production it is also `Secure` with
//! `SameSite=None` so a front end on another origin can send it; local
//! development over plain HTTP gets `SameSite=Strict` without `Secure`.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// `SameSite` attribute values used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Cookie attributes derived from the deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub production: bool,
}

impl CookiePolicy {
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    pub fn development() -> Self {
        Self::new(false)
    }

    pub fn secure(&self) -> bool {
        self.production
    }

    pub fn same_site(&self) -> SameSite {
        if self.production {
            SameSite::None
        } else {
            SameSite::Strict
        }
    }

    /// `Set-Cookie` value storing `token`.
    pub fn set_cookie(&self, token: &str) -> String {
        self.render(token, None)
    }

    /// `Set-Cookie` value that expires the cookie immediately.
    pub fn clear_cookie(&self) -> String {
        self.render("", Some(0))
    }

    /// Append the session cookie to outgoing headers.
    pub fn attach(&self, headers: &mut HeaderMap, token: &str) {
        append_set_cookie(headers, &self.set_cookie(token));
    }

    /// Append a cookie that overwrites and expires the session cookie.
    pub fn clear(&self, headers: &mut HeaderMap) {
        append_set_cookie(headers, &self.clear_cookie());
    }

    fn render(&self, value: &str, max_age: Option<u64>) -> String {
        let mut cookie = format!("{TOKEN_COOKIE_NAME}={value}; Path=/");
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        cookie.push_str("; HttpOnly");
        if self.secure() {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.same_site().as_str());
        cookie
    }
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) {
    // JWTs are base64url with dots, always a valid header value
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.append(SET_COOKIE, value);
    }
}

/// Read the session token from the request's `Cookie` headers.
///
/// Returns `None` when the cookie is absent or empty.
pub fn extract(headers: &HeaderMap) -> Option<String> {
    get_cookie(headers, TOKEN_COOKIE_NAME)
}

/// Find a named cookie across all `Cookie` headers.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
