//! In-memory invoice store for development and tests

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{InvoiceStore, StoreError, StoreResult};
use crate::document::{Invoice, InvoiceId};

/// In-memory store. Uses RwLock for thread-safe access; cloning shares the
/// underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn insert(&self, mut invoice: Invoice) -> StoreResult<Invoice> {
        let mut invoices = self.invoices.write().map_err(|_| StoreError::Poisoned)?;

        invoice.id = InvoiceId::generate().to_string();
        invoices.insert(invoice.id.clone(), invoice.clone());

        Ok(invoice)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Invoice>> {
        let invoices = self.invoices.read().map_err(|_| StoreError::Poisoned)?;

        Ok(invoices.get(id).cloned())
    }

    async fn replace(&self, invoice: Invoice) -> StoreResult<Option<Invoice>> {
        let mut invoices = self.invoices.write().map_err(|_| StoreError::Poisoned)?;

        match invoices.get_mut(&invoice.id) {
            Some(slot) => {
                *slot = invoice.clone();
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut invoices = self.invoices.write().map_err(|_| StoreError::Poisoned)?;

        Ok(invoices.remove(id).is_some())
    }

    async fn list_by_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Invoice>> {
        let invoices = self.invoices.read().map_err(|_| StoreError::Poisoned)?;

        let mut owned: Vec<Invoice> = invoices
            .values()
            .filter(|invoice| invoice.created_by == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        owned.truncate(limit);

        Ok(owned)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.invoices
            .read()
            .map(|_| ())
            .map_err(|_| StoreError::Poisoned)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn insert_assigns_ids() {
        let store = MemoryStore::new();
        let a = store.insert(Invoice::new("u1", Utc::now())).await.unwrap();
        let b = store.insert(Invoice::new("u1", Utc::now())).await.unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(store.get(&a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn replace_missing_returns_none() {
        let store = MemoryStore::new();
        let mut ghost = Invoice::new("u1", Utc::now());
        ghost.id = "ghost".into();

        assert!(store.replace(ghost).await.unwrap().is_none());
        assert!(store.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_orders_and_caps() {
        let store = MemoryStore::new();
        let start = Utc::now();
        for i in 0..5 {
            store
                .insert(Invoice::new("u1", start + Duration::seconds(i)))
                .await
                .unwrap();
        }
        store.insert(Invoice::new("u2", start)).await.unwrap();

        let listed = store.list_by_owner("u1", 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|i| i.created_by == "u1"));
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].updated_at >= pair[1].updated_at));
        assert_eq!(listed[0].updated_at, start + Duration::seconds(4));
    }

    #[test]
    fn delete_removes_document() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let invoice = store.insert(Invoice::new("u1", Utc::now())).await.unwrap();

            assert!(store.delete(&invoice.id).await.unwrap());
            assert!(!store.delete(&invoice.id).await.unwrap());
            assert!(store.get(&invoice.id).await.unwrap().is_none());
        });
    }
}
