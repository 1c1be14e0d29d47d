// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! This module provides persistent storage on an embedded redb database,
//! exposed as named collections of JSON documents.
//!
//! ## Collections
//!
//! ```text
//! users     # directory: _id, email (unique), role, profile fields
//! surveys   # opaque survey content plus createdBy / createdAt
//! payments  # completed payments: email, provider reference, createdAt
//! ```
//!
//! ## Consistency
//!
//! - Each insert / update / delete is one redb write transaction
//! - There are no multi-document transactions
//! - Concurrent requests share nothing but the database handle

pub mod documents;
pub mod repository;

pub use documents::{
    new_id, Collection, DeleteResult, Document, DocumentStore, Filter, InsertOneResult,
    StorageError, StorageResult, UpdateResult, ID_FIELD,
};
pub use repository::{
    PaymentRepository, Registration, SurveyRepository, UserDirectory, UserKey, UserRecord,
    PAYMENTS, SURVEYS, USERS,
};

/// Every collection the service uses; created when the store is opened.
pub const COLLECTIONS: [&str; 3] = [USERS, SURVEYS, PAYMENTS];
