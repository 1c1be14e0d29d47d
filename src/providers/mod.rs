// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External service integrations.

pub mod stripe;

pub use stripe::{amount_in_minor, PaymentError, PaymentIntent, StripeClient};
