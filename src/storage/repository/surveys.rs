// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Survey repository over the `surveys` collection.
//!
//! Survey content is opaque to the server. The repository only owns the
//! bookkeeping fields `_id`, `createdBy` and `createdAt`.

use chrono::Utc;
use serde_json::Value;

use super::super::{
    DeleteResult, Document, DocumentStore, Filter, InsertOneResult, StorageResult, UpdateResult,
    ID_FIELD,
};

/// Collection name.
pub const SURVEYS: &str = "surveys";

const CREATED_BY: &str = "createdBy";
const CREATED_AT: &str = "createdAt";

/// Repository for survey documents.
pub struct SurveyRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> SurveyRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> StorageResult<Vec<Document>> {
        self.store.collection(SURVEYS).find(&Filter::all())
    }

    pub fn get(&self, id: &str) -> StorageResult<Option<Document>> {
        self.store.collection(SURVEYS).find_one(&Filter::by_id(id))
    }

    /// Store a new survey authored by `creator_email`.
    pub fn create(
        &self,
        creator_email: &str,
        mut survey: Document,
    ) -> StorageResult<InsertOneResult> {
        strip_bookkeeping(&mut survey);
        survey.insert(CREATED_BY.to_string(), Value::String(creator_email.to_string()));
        survey.insert(
            CREATED_AT.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.store.collection(SURVEYS).insert_one(survey)
    }

    /// Overwrite the supplied fields of an existing survey.
    pub fn update(&self, id: &str, mut fields: Document) -> StorageResult<UpdateResult> {
        strip_bookkeeping(&mut fields);
        self.store
            .collection(SURVEYS)
            .update_one(&Filter::by_id(id), fields, false)
    }

    pub fn delete(&self, id: &str) -> StorageResult<DeleteResult> {
        self.store.collection(SURVEYS).delete_one(&Filter::by_id(id))
    }
}

fn strip_bookkeeping(doc: &mut Document) {
    doc.remove(ID_FIELD);
    doc.remove(CREATED_BY);
    doc.remove(CREATED_AT);
}
