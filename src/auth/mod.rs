// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cookie-carried session tokens plus directory-backed role checks.
//!
//! ## Auth Flow
//!
//! 1. Front end signs the user in with its identity provider
//! 2. Front end posts `{ email, ... }` to `POST /jwt`
//! 3. Server signs an HS256 token (2h expiry) and sets it as the
//!    `token` cookie (`HttpOnly`; `Secure` + `SameSite=None` in production)
//! 4. On each request:
//!    - `Auth` reads the cookie and verifies signature and expiry
//!    - `AdminOnly` / `SurveyorOnly` look up the caller's role in the
//!      `users` collection
//!
//! ## Failure Responses
//!
//! - No cookie → 401 `{"message":"unauthorized access"}`
//! - Invalid/expired token, wrong role, unknown user, another user's
//!   resource → 403 `{"message":"forbidden access..."}`

pub mod claims;
pub mod cookie;
pub mod error;
pub mod extractor;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedContext, IdentityClaim};
pub use cookie::CookiePolicy;
pub use error::AuthError;
pub use extractor::{authorize, ensure_self, AdminOnly, Auth, SurveyorOnly};
pub use roles::Role;
pub use token::{TokenCodec, TokenError};
