// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory over the `users` collection.
//!
//! Records are keyed by an opaque `_id` and loosely unique by `email`.
//! The directory is the source of truth for roles; tokens only carry the
//! email.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::auth::Role;

use super::super::{
    DeleteResult, Document, DocumentStore, Filter, InsertOneResult, StorageError, StorageResult,
    UpdateResult, ID_FIELD,
};

/// Collection name.
pub const USERS: &str = "users";

/// Typed view of a user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque record identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Email address (unique)
    pub email: String,
    /// Assigned role; absent or unrecognised values read as `Unassigned`
    #[serde(
        default,
        deserialize_with = "lenient_role",
        skip_serializing_if = "Role::is_unassigned"
    )]
    pub role: Role,
    /// Profile fields supplied at registration
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(Role::from_str)
        .unwrap_or(Role::Unassigned))
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(InsertOneResult),
    /// A record with this email already exists; nothing was written
    AlreadyExists,
}

/// Lookup key for role updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Email(String),
    Id(String),
}

impl UserKey {
    /// Resolve a path parameter that is either the caller's own email or a
    /// record identifier.
    pub fn resolve(path_param: &str, caller_email: &str) -> Self {
        if path_param == caller_email {
            UserKey::Email(caller_email.to_string())
        } else {
            UserKey::Id(path_param.to_string())
        }
    }

    fn filter(&self) -> Filter {
        match self {
            UserKey::Email(email) => Filter::eq("email", email.as_str()),
            UserKey::Id(id) => Filter::by_id(id.as_str()),
        }
    }
}

/// Repository for user records.
pub struct UserDirectory<'a> {
    store: &'a DocumentStore,
}

impl<'a> UserDirectory<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Every user document as stored.
    pub fn list(&self) -> StorageResult<Vec<Document>> {
        self.store.collection(USERS).find(&Filter::all())
    }

    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        match self.store.collection(USERS).find_one(&Filter::eq("email", email))? {
            Some(doc) => Ok(Some(serde_json::from_value(Value::Object(doc))?)),
            None => Ok(None),
        }
    }

    /// Role of the user with `email`, `None` if there is no such record.
    pub fn role_of(&self, email: &str) -> StorageResult<Option<Role>> {
        Ok(self.find_by_email(email)?.map(|user| user.role))
    }

    /// Insert a user unless one with the same email exists.
    ///
    /// Client-supplied `_id` and `role` fields are dropped: roles are only
    /// granted through [`UserDirectory::set_role`].
    pub fn register(&self, mut user: Document) -> StorageResult<Registration> {
        let email = match user.get("email") {
            Some(Value::String(email)) if !email.trim().is_empty() => email.clone(),
            _ => {
                return Err(StorageError::InvalidDocument(
                    "email is required".to_string(),
                ))
            }
        };

        let users = self.store.collection(USERS);
        if users.find_one(&Filter::eq("email", email.as_str()))?.is_some() {
            return Ok(Registration::AlreadyExists);
        }

        user.remove(ID_FIELD);
        user.remove("role");
        Ok(Registration::Created(users.insert_one(user)?))
    }

    /// Set `role` on the record identified by `key`, inserting it if missing.
    pub fn set_role(&self, key: &UserKey, role: Role) -> StorageResult<UpdateResult> {
        let mut fields = Document::new();
        fields.insert(
            "role".to_string(),
            role.stored_name()
                .map(|name| Value::String(name.to_string()))
                .unwrap_or(Value::Null),
        );
        self.store
            .collection(USERS)
            .update_one(&key.filter(), fields, true)
    }

    pub fn delete(&self, id: &str) -> StorageResult<DeleteResult> {
        self.store.collection(USERS).delete_one(&Filter::by_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> DocumentStore {
        DocumentStore::in_memory(&[USERS]).unwrap()
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn register_is_idempotent_on_email() {
        let store = store();
        let directory = UserDirectory::new(&store);

        let first = directory
            .register(doc(json!({"email": "a@x.com", "name": "Ada"})))
            .unwrap();
        assert!(matches!(first, Registration::Created(_)));

        let second = directory
            .register(doc(json!({"email": "a@x.com", "name": "Imposter"})))
            .unwrap();
        assert_eq!(second, Registration::AlreadyExists);

        let users = directory.list().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["name"], "Ada");
    }

    #[test]
    fn register_requires_email_and_drops_role() {
        let store = store();
        let directory = UserDirectory::new(&store);

        assert!(matches!(
            directory.register(doc(json!({"name": "Nobody"}))),
            Err(StorageError::InvalidDocument(_))
        ));

        directory
            .register(doc(json!({"email": "a@x.com", "role": "Admin", "_id": "mine"})))
            .unwrap();
        let user = directory.find_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(user.role, Role::Unassigned);
        assert_ne!(user.id, "mine");
    }

    #[test]
    fn role_of_distinguishes_missing_record() {
        let store = store();
        let directory = UserDirectory::new(&store);
        directory.register(doc(json!({"email": "a@x.com"}))).unwrap();

        assert_eq!(directory.role_of("a@x.com").unwrap(), Some(Role::Unassigned));
        assert_eq!(directory.role_of("ghost@x.com").unwrap(), None);
    }

    #[test]
    fn set_role_by_id_leaves_other_fields() {
        let store = store();
        let directory = UserDirectory::new(&store);
        let Registration::Created(created) = directory
            .register(doc(json!({"email": "a@x.com", "name": "Ada"})))
            .unwrap()
        else {
            panic!("expected a new record");
        };

        let result = directory
            .set_role(&UserKey::Id(created.inserted_id.clone()), Role::Surveyor)
            .unwrap();
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.modified_count, 1);

        let user = directory.find_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(user.role, Role::Surveyor);
        assert_eq!(user.id, created.inserted_id);
        assert_eq!(user.extra["name"], "Ada");
    }

    #[test]
    fn set_role_by_email_upserts() {
        let store = store();
        let directory = UserDirectory::new(&store);

        let result = directory
            .set_role(&UserKey::Email("new@x.com".into()), Role::Admin)
            .unwrap();
        assert_eq!(result.upserted_count, 1);
        assert_eq!(directory.role_of("new@x.com").unwrap(), Some(Role::Admin));

        directory
            .set_role(&UserKey::Email("new@x.com".into()), Role::Unassigned)
            .unwrap();
        assert_eq!(directory.role_of("new@x.com").unwrap(), Some(Role::Unassigned));
        assert_eq!(directory.list().unwrap().len(), 1);
    }

    #[test]
    fn resolve_prefers_callers_own_email() {
        assert_eq!(
            UserKey::resolve("a@x.com", "a@x.com"),
            UserKey::Email("a@x.com".into())
        );
        assert_eq!(
            UserKey::resolve("0b7c", "a@x.com"),
            UserKey::Id("0b7c".into())
        );
    }

    #[test]
    fn delete_by_id() {
        let store = store();
        let directory = UserDirectory::new(&store);
        let Registration::Created(created) = directory
            .register(doc(json!({"email": "a@x.com"})))
            .unwrap()
        else {
            panic!("expected a new record");
        };

        assert_eq!(directory.delete(&created.inserted_id).unwrap().deleted_count, 1);
        assert_eq!(directory.delete(&created.inserted_id).unwrap().deleted_count, 0);
        assert_eq!(directory.find_by_email("a@x.com").unwrap(), None);
    }

    #[test]
    fn unknown_stored_role_reads_as_unassigned() {
        let record: UserRecord = serde_json::from_value(json!({
            "_id": "1",
            "email": "a@x.com",
            "role": "Pro User"
        }))
        .unwrap();
        assert_eq!(record.role, Role::Unassigned);

        let record: UserRecord =
            serde_json::from_value(json!({"_id": "1", "email": "a@x.com", "role": null}))
                .unwrap();
        assert_eq!(record.role, Role::Unassigned);
    }
}
