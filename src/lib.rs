// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Survey Server - Polling and Survey Backend
//!
//! This crate provides the HTTP backend for a survey/polling web app:
//! cookie-based session tokens, directory-backed role checks, survey storage
//! and payment-intent creation.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens, cookies and the authentication/authorization gates
//! - `config` - Environment configuration
//! - `providers` - Payment provider client
//! - `storage` - Embedded document store (redb) and repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
