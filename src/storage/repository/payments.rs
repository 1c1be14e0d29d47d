// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Completed payment records over the `payments` collection.

use chrono::Utc;
use serde_json::Value;

use super::super::{Document, DocumentStore, Filter, InsertOneResult, StorageResult, ID_FIELD};

/// Collection name.
pub const PAYMENTS: &str = "payments";

/// Repository for payment records.
pub struct PaymentRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Record a payment made by `payer_email`. The payer is taken from the
    /// session, never from the body.
    pub fn record(
        &self,
        payer_email: &str,
        mut payment: Document,
    ) -> StorageResult<InsertOneResult> {
        payment.remove(ID_FIELD);
        payment.insert("email".to_string(), Value::String(payer_email.to_string()));
        payment.insert("createdAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        self.store.collection(PAYMENTS).insert_one(payment)
    }

    pub fn list(&self) -> StorageResult<Vec<Document>> {
        self.store.collection(PAYMENTS).find(&Filter::all())
    }

    pub fn list_by_email(&self, email: &str) -> StorageResult<Vec<Document>> {
        self.store
            .collection(PAYMENTS)
            .find(&Filter::eq("email", email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_uses_session_email() {
        let store = DocumentStore::in_memory(&[PAYMENTS]).unwrap();
        let payments = PaymentRepository::new(&store);

        let Value::Object(body) =
            json!({"email": "someone@else.com", "transactionId": "pi_1", "price": 9.99})
        else {
            unreachable!()
        };
        payments.record("a@x.com", body).unwrap();

        let mine = payments.list_by_email("a@x.com").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["transactionId"], "pi_1");
        assert!(payments.list_by_email("someone@else.com").unwrap().is_empty());
        assert_eq!(payments.list().unwrap().len(), 1);
    }
}
