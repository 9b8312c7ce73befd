//! Debounced autosave.
//!
//! Draft edits arrive in bursts while someone types. Each burst is folded
//! into one pending patch per invoice, and the patch is saved once the
//! invoice has been quiet for the debounce window. Failed saves are logged
//! and dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::auth::User;
use crate::document::{sanitize_patch, Invoice, InvoiceId};
use crate::service::{InvoiceService, ServiceResult};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

struct Pending {
    generation: u64,
    user: User,
    fields: Map<String, Value>,
}

#[derive(Clone)]
pub struct Autosaver {
    service: InvoiceService,
    delay: Duration,
    pending: Arc<Mutex<HashMap<InvoiceId, Pending>>>,
    generation: Arc<AtomicU64>,
}

impl Autosaver {
    pub fn new(service: InvoiceService, delay: Duration) -> Self {
        Self {
            service,
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `patch` for `id` and restart its quiet-period timer.
    ///
    /// The patch is checked against the stored invoice before it joins the
    /// pending burst, so a rejected field never takes earlier edits down
    /// with it.
    pub async fn schedule(&self, user: User, id: InvoiceId, patch: Value) -> ServiceResult<()> {
        let fields = sanitize_patch(patch)?;
        let stored = self.service.require_owner(&user, &id, "save it").await?;
        stored.merged(&fields)?;

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        {
            let mut pending = self.pending.lock().await;
            let entry = pending.entry(id.clone()).or_insert_with(|| Pending {
                generation,
                user: user.clone(),
                fields: Map::new(),
            });
            entry.generation = generation;
            entry.user = user;
            entry.fields.extend(fields);
        }

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.delay).await;
            this.fire(id, generation).await;
        });
        Ok(())
    }

    /// Save whatever is pending for `id` right away.
    pub async fn flush(&self, id: &InvoiceId) -> Option<ServiceResult<Invoice>> {
        let pending = self.pending.lock().await.remove(id)?;
        Some(self.save(id, pending).await)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn fire(&self, id: InvoiceId, generation: u64) {
        let due = {
            let mut pending = self.pending.lock().await;
            // A newer edit restarted the timer, or a flush got here first.
            let current = pending.get(&id).map(|entry| entry.generation);
            if current == Some(generation) {
                pending.remove(&id)
            } else {
                None
            }
        };
        if let Some(entry) = due {
            // Errors are already logged inside save.
            let _ = self.save(&id, entry).await;
        }
    }

    async fn save(&self, id: &InvoiceId, entry: Pending) -> ServiceResult<Invoice> {
        let result = self
            .service
            .save(&entry.user, id, Value::Object(entry.fields))
            .await;
        match &result {
            Ok(_) => tracing::debug!(invoice_id = %id, "autosaved draft"),
            Err(e) => tracing::warn!(invoice_id = %id, "autosave failed: {e}"),
        }
        result
    }
}
