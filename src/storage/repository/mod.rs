// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository wraps one collection and owns the rules for the
//! bookkeeping fields of its documents.

pub mod payments;
pub mod surveys;
pub mod users;

pub use payments::{PaymentRepository, PAYMENTS};
pub use surveys::{SurveyRepository, SURVEYS};
pub use users::{Registration, UserDirectory, UserKey, UserRecord, USERS};
