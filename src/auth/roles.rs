// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role stored on a user record in the directory.
///
/// ## Roles
///
/// - `Admin` - Manages users (role assignment, deletion) and payments
/// - `Surveyor` - Creates and maintains surveys
/// - `Unassigned` - Registered user without an elevated role
///
/// Roles are compared by equality. An `Admin` does not implicitly hold
/// `Surveyor` privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// User administration
    Admin,
    /// Survey authoring
    Surveyor,
    /// Anything else (including an absent role field)
    #[default]
    #[serde(other)]
    Unassigned,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "surveyor" => Some(Role::Surveyor),
            "" | "unassigned" => Some(Role::Unassigned),
            _ => None,
        }
    }

    /// Name as stored in the directory, `None` for `Unassigned`.
    pub fn stored_name(&self) -> Option<&'static str> {
        match self {
            Role::Admin => Some("Admin"),
            Role::Surveyor => Some("Surveyor"),
            Role::Unassigned => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        *self == Role::Unassigned
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Surveyor => write!(f, "Surveyor"),
            Role::Unassigned => write!(f, "Unassigned"),
        }
    }
}
