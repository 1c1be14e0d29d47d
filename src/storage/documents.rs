// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! One table per collection: `_id` → serialized JSON object.
//!
//! Every operation below runs in a single redb transaction, so each insert,
//! update and delete is atomic for the document it touches. There are no
//! multi-document transactions.

use std::path::Path;
use std::sync::Arc;

use redb::{
    backends::InMemoryBackend, Database, ReadableDatabase, ReadableTable, TableDefinition,
    TableError,
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored document: a JSON object with a string `_id`.
pub type Document = Map<String, Value>;

/// Primary key field of every document.
pub const ID_FIELD: &str = "_id";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Filters and Operation Results
// =============================================================================

/// Conjunction of field equalities. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    /// Match every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the document with the given `_id`.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, Value::String(id.into()))
    }

    /// Match documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Add another equality.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// `_id` constraint, when present, for direct key lookups.
    fn id(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == ID_FIELD)
            .and_then(|(_, value)| value.as_str())
    }
}

/// Result of [`Collection::insert_one`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

/// Result of [`Collection::update_one`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

/// Result of [`Collection::delete_one`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Generate a new document identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// DocumentStore
// =============================================================================

/// Handle to the embedded database. Cheap to clone.
#[derive(Clone)]
pub struct DocumentStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path, collections: &[&'static str]) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;
        Self::with_collections(db, collections)
    }

    /// Volatile database for tests and local experiments.
    pub fn in_memory(collections: &[&'static str]) -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_collections(db, collections)
    }

    fn with_collections(db: Database, collections: &[&'static str]) -> StorageResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        for &name in collections {
            let _ = write_txn.open_table(table(name))?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn collection(&self, name: &'static str) -> Collection<'_> {
        Collection {
            db: &self.db,
            name,
        }
    }

    /// Round-trip a read transaction.
    pub fn ping(&self) -> StorageResult<()> {
        let _ = self.db.begin_read()?;
        Ok(())
    }
}

fn table(name: &'static str) -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

// =============================================================================
// Collection
// =============================================================================

/// Named document collection.
pub struct Collection<'a> {
    db: &'a Database,
    name: &'static str,
}

impl<'a> Collection<'a> {
    /// First document matching `filter`.
    pub fn find_one(&self, filter: &Filter) -> StorageResult<Option<Document>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(table(self.name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if let Some(id) = filter.id() {
            let stored = table.get(id)?;
            let found = match stored {
                Some(value) => {
                    let doc: Document = serde_json::from_slice(value.value())?;
                    filter.matches(&doc).then_some(doc)
                }
                None => None,
            };
            return Ok(found);
        }

        for entry in table.iter()? {
            let (_, value) = entry?;
            let doc: Document = serde_json::from_slice(value.value())?;
            if filter.matches(&doc) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    /// All documents matching `filter`, in key order.
    pub fn find(&self, filter: &Filter) -> StorageResult<Vec<Document>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(table(self.name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let doc: Document = serde_json::from_slice(value.value())?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Insert a document, assigning a fresh `_id` when it has none.
    pub fn insert_one(&self, mut doc: Document) -> StorageResult<InsertOneResult> {
        let id = match doc.get(ID_FIELD) {
            None => new_id(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(_) => {
                return Err(StorageError::InvalidDocument(
                    "_id must be a non-empty string".to_string(),
                ))
            }
        };
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        let json = serde_json::to_vec(&doc)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table(self.name))?;
            if table.get(id.as_str())?.is_some() {
                return Err(StorageError::DuplicateKey(format!("{} {id}", self.name)));
            }
            table.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Set `fields` on the first document matching `filter`.
    ///
    /// Fields not named in `fields` are left untouched. With `upsert`, a miss
    /// inserts a document built from the filter's equalities plus `fields`.
    pub fn update_one(
        &self,
        filter: &Filter,
        fields: Document,
        upsert: bool,
    ) -> StorageResult<UpdateResult> {
        if fields.contains_key(ID_FIELD) {
            return Err(StorageError::InvalidDocument(
                "_id is immutable".to_string(),
            ));
        }

        let write_txn = self.db.begin_write()?;
        let result = {
            let mut table = write_txn.open_table(table(self.name))?;

            let mut target: Option<(String, Document)> = None;
            if let Some(id) = filter.id() {
                if let Some(value) = table.get(id)? {
                    let doc: Document = serde_json::from_slice(value.value())?;
                    if filter.matches(&doc) {
                        target = Some((id.to_string(), doc));
                    }
                }
            } else {
                for entry in table.iter()? {
                    let (key, value) = entry?;
                    let doc: Document = serde_json::from_slice(value.value())?;
                    if filter.matches(&doc) {
                        target = Some((key.value().to_string(), doc));
                        break;
                    }
                }
            }

            match target {
                Some((id, mut doc)) => {
                    let mut modified = false;
                    for (field, value) in fields {
                        if doc.get(&field) != Some(&value) {
                            doc.insert(field, value);
                            modified = true;
                        }
                    }
                    if modified {
                        let json = serde_json::to_vec(&doc)?;
                        table.insert(id.as_str(), json.as_slice())?;
                    }
                    UpdateResult {
                        acknowledged: true,
                        matched_count: 1,
                        modified_count: u64::from(modified),
                        upserted_count: 0,
                        upserted_id: None,
                    }
                }
                None if upsert => {
                    let mut doc = Document::new();
                    for (field, value) in &filter.fields {
                        doc.insert(field.clone(), value.clone());
                    }
                    doc.extend(fields);
                    let id = filter.id().map(str::to_string).unwrap_or_else(new_id);
                    doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));

                    let json = serde_json::to_vec(&doc)?;
                    table.insert(id.as_str(), json.as_slice())?;
                    UpdateResult {
                        acknowledged: true,
                        matched_count: 0,
                        modified_count: 0,
                        upserted_count: 1,
                        upserted_id: Some(id),
                    }
                }
                None => UpdateResult {
                    acknowledged: true,
                    matched_count: 0,
                    modified_count: 0,
                    upserted_count: 0,
                    upserted_id: None,
                },
            }
        };
        write_txn.commit()?;
        Ok(result)
    }

    /// Remove the first document matching `filter`.
    pub fn delete_one(&self, filter: &Filter) -> StorageResult<DeleteResult> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(table(self.name))?;

            let mut target: Option<String> = None;
            if let Some(id) = filter.id() {
                if let Some(value) = table.get(id)? {
                    let doc: Document = serde_json::from_slice(value.value())?;
                    if filter.matches(&doc) {
                        target = Some(id.to_string());
                    }
                }
            } else {
                for entry in table.iter()? {
                    let (key, value) = entry?;
                    let doc: Document = serde_json::from_slice(value.value())?;
                    if filter.matches(&doc) {
                        target = Some(key.value().to_string());
                        break;
                    }
                }
            }

            match target {
                Some(id) => {
                    let removed = table.remove(id.as_str())?;
                    removed.is_some()
                }
                None => false,
            }
        };
        write_txn.commit()?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: u64::from(deleted),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const PEOPLE: &str = "people";

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn store() -> DocumentStore {
        DocumentStore::in_memory(&[PEOPLE]).unwrap()
    }

    #[test]
    fn insert_assigns_id_and_find_one_returns_it() {
        let store = store();
        let people = store.collection(PEOPLE);

        let result = people
            .insert_one(doc(json!({"email": "a@x.com", "name": "Ada"})))
            .unwrap();
        assert!(result.acknowledged);
        assert!(!result.inserted_id.is_empty());

        let found = people
            .find_one(&Filter::eq("email", "a@x.com"))
            .unwrap()
            .unwrap();
        assert_eq!(found[ID_FIELD], json!(result.inserted_id));
        assert_eq!(found["name"], "Ada");

        let by_id = people
            .find_one(&Filter::by_id(result.inserted_id.clone()))
            .unwrap();
        assert_eq!(by_id, Some(found));
    }

    #[test]
    fn insert_rejects_duplicate_and_non_string_ids() {
        let store = store();
        let people = store.collection(PEOPLE);

        people.insert_one(doc(json!({"_id": "p1"}))).unwrap();
        assert!(matches!(
            people.insert_one(doc(json!({"_id": "p1"}))),
            Err(StorageError::DuplicateKey(_))
        ));
        assert!(matches!(
            people.insert_one(doc(json!({"_id": 7}))),
            Err(StorageError::InvalidDocument(_))
        ));
    }

    #[test]
    fn find_filters_by_every_field() {
        let store = store();
        let people = store.collection(PEOPLE);
        people
            .insert_one(doc(json!({"_id": "1", "team": "red", "lead": true})))
            .unwrap();
        people
            .insert_one(doc(json!({"_id": "2", "team": "red", "lead": false})))
            .unwrap();
        people
            .insert_one(doc(json!({"_id": "3", "team": "blue"})))
            .unwrap();

        assert_eq!(people.find(&Filter::all()).unwrap().len(), 3);
        assert_eq!(people.find(&Filter::eq("team", "red")).unwrap().len(), 2);

        let leads = people
            .find(&Filter::eq("team", "red").and("lead", true))
            .unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0][ID_FIELD], "1");
    }

    #[test]
    fn update_sets_only_named_fields() {
        let store = store();
        let people = store.collection(PEOPLE);
        people
            .insert_one(doc(json!({"_id": "1", "email": "a@x.com", "name": "Ada"})))
            .unwrap();

        let result = people
            .update_one(&Filter::by_id("1"), doc(json!({"role": "Admin"})), false)
            .unwrap();
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.modified_count, 1);
        assert_eq!(result.upserted_id, None);

        let stored = people.find_one(&Filter::by_id("1")).unwrap().unwrap();
        assert_eq!(stored["role"], "Admin");
        assert_eq!(stored["name"], "Ada");
        assert_eq!(stored["email"], "a@x.com");

        // Same value again: matched but not modified
        let again = people
            .update_one(&Filter::by_id("1"), doc(json!({"role": "Admin"})), false)
            .unwrap();
        assert_eq!(again.matched_count, 1);
        assert_eq!(again.modified_count, 0);
    }

    #[test]
    fn update_miss_without_upsert_changes_nothing() {
        let store = store();
        let people = store.collection(PEOPLE);

        let result = people
            .update_one(&Filter::eq("email", "nobody@x.com"), doc(json!({"role": "Admin"})), false)
            .unwrap();
        assert_eq!(result.matched_count, 0);
        assert_eq!(result.upserted_count, 0);
        assert!(people.find(&Filter::all()).unwrap().is_empty());
    }

    #[test]
    fn upsert_builds_document_from_filter_and_fields() {
        let store = store();
        let people = store.collection(PEOPLE);

        let by_email = people
            .update_one(&Filter::eq("email", "new@x.com"), doc(json!({"role": "Surveyor"})), true)
            .unwrap();
        assert_eq!(by_email.upserted_count, 1);
        let id = by_email.upserted_id.unwrap();
        let stored = people.find_one(&Filter::by_id(id.clone())).unwrap().unwrap();
        assert_eq!(stored["email"], "new@x.com");
        assert_eq!(stored["role"], "Surveyor");

        let by_id = people
            .update_one(&Filter::by_id("fixed"), doc(json!({"role": "Admin"})), true)
            .unwrap();
        assert_eq!(by_id.upserted_id.as_deref(), Some("fixed"));
        let stored = people.find_one(&Filter::by_id("fixed")).unwrap().unwrap();
        assert_eq!(stored, doc(json!({"_id": "fixed", "role": "Admin"})));
    }

    #[test]
    fn update_refuses_to_change_id() {
        let store = store();
        let people = store.collection(PEOPLE);
        assert!(matches!(
            people.update_one(&Filter::all(), doc(json!({"_id": "x"})), true),
            Err(StorageError::InvalidDocument(_))
        ));
    }

    #[test]
    fn delete_one_removes_single_match() {
        let store = store();
        let people = store.collection(PEOPLE);
        people.insert_one(doc(json!({"_id": "1", "team": "red"}))).unwrap();
        people.insert_one(doc(json!({"_id": "2", "team": "red"}))).unwrap();

        let result = people.delete_one(&Filter::eq("team", "red")).unwrap();
        assert_eq!(result.deleted_count, 1);
        assert_eq!(people.find(&Filter::all()).unwrap().len(), 1);

        let by_id = people.delete_one(&Filter::by_id("missing")).unwrap();
        assert_eq!(by_id.deleted_count, 0);
    }

    #[test]
    fn unknown_collection_reads_as_empty() {
        let store = store();
        let ghosts = store.collection("ghosts");
        assert!(ghosts.find(&Filter::all()).unwrap().is_empty());
        assert_eq!(ghosts.find_one(&Filter::all()).unwrap(), None);
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("survey.redb");

        {
            let store = DocumentStore::open(&path, &[PEOPLE]).unwrap();
            store
                .collection(PEOPLE)
                .insert_one(doc(json!({"_id": "1", "email": "a@x.com"})))
                .unwrap();
        }

        let store = DocumentStore::open(&path, &[PEOPLE]).unwrap();
        store.ping().unwrap();
        let stored = store.collection(PEOPLE).find_one(&Filter::by_id("1")).unwrap();
        assert_eq!(stored.unwrap()["email"], "a@x.com");
    }

    #[test]
    fn serialized_results_use_driver_field_names() {
        let json = serde_json::to_value(DeleteResult {
            acknowledged: true,
            deleted_count: 1,
        })
        .unwrap();
        assert_eq!(json, json!({"acknowledged": true, "deletedCount": 1}));

        let json = serde_json::to_value(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some("abc".into()),
        })
        .unwrap();
        assert_eq!(json["upsertedId"], "abc");
        assert_eq!(json["matchedCount"], 0);
    }
}
