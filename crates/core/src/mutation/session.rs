use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{Mutation, MutationResult};
use crate::document::id::new_id;
use crate::document::{sanitize_patch, Feature, Invoice, Outcome, ValidationError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invoice is read-only for this viewer")]
    ReadOnly,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Working copy of an invoice being edited.
///
/// Mutations only touch the in-memory copy; nothing reaches the store until
/// the caller saves [`EditSession::into_invoice`]. Every mutation is gated
/// on ownership.
#[derive(Debug, Clone)]
pub struct EditSession {
    working: Invoice,
    is_owner: bool,
}

impl EditSession {
    pub fn open(invoice: Invoice, viewer: Option<&str>) -> Self {
        let is_owner = viewer.is_some_and(|uid| invoice.is_owned_by(uid));
        Self {
            working: invoice,
            is_owner,
        }
    }

    pub fn can_edit(&self) -> bool {
        self.is_owner
    }

    pub fn working(&self) -> &Invoice {
        &self.working
    }

    pub fn into_invoice(self) -> Invoice {
        self.working
    }

    pub fn apply(
        &mut self,
        mutation: Mutation,
        now: DateTime<Utc>,
    ) -> Result<Outcome, SessionError> {
        if !self.is_owner {
            return Err(SessionError::ReadOnly);
        }

        let invoice = &mut self.working;
        let outcome = match mutation {
            Mutation::Set(patch) => {
                let fields = sanitize_patch(patch)?;
                let merged = invoice.merged(&fields)?;
                let previous = std::mem::replace(invoice, merged);
                changed(previous != *invoice)
            }
            Mutation::AddFeature(add) => {
                invoice.features.push(Feature {
                    id: new_id(),
                    description: capitalize_first(&add.description),
                    price: add.price,
                });
                Outcome::Applied
            }
            Mutation::UpdateFeature(update) => {
                match invoice.features.iter_mut().find(|f| f.id == update.id) {
                    Some(feature) => {
                        if let Some(description) = update.description {
                            feature.description = capitalize_first(&description);
                        }
                        if let Some(price) = update.price {
                            feature.price = price;
                        }
                        Outcome::Applied
                    }
                    None => Outcome::Unchanged,
                }
            }
            Mutation::RemoveFeature(remove) => {
                let before = invoice.features.len();
                invoice.features.retain(|f| f.id != remove.id);
                changed(invoice.features.len() != before)
            }
            Mutation::UseRevision => invoice.revisions.use_revision(),
            Mutation::AddRevisionSlot => invoice.revisions.add_slot(),
            Mutation::RemoveRevisionSlot => invoice.revisions.remove_slot(),
            Mutation::SnapshotRevisions => invoice.revisions.snapshot(now),
            Mutation::SetCurrency(currency) => {
                let previous = std::mem::replace(&mut invoice.currency, currency);
                changed(previous != currency)
            }
        };
        Ok(outcome)
    }

    /// Apply a batch in order. Any error aborts the batch; the caller drops
    /// the session so nothing partial is saved.
    pub fn apply_all(
        &mut self,
        mutations: Vec<Mutation>,
        now: DateTime<Utc>,
    ) -> Result<Vec<MutationResult>, SessionError> {
        let mut results = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            let operation = mutation.operation().to_string();
            let outcome = self.apply(mutation, now)?;
            results.push(MutationResult {
                operation,
                applied: outcome.applied(),
            });
        }
        Ok(results)
    }
}

fn changed(did_change: bool) -> Outcome {
    if did_change {
        Outcome::Applied
    } else {
        Outcome::Unchanged
    }
}

/// Upper-case the first character of a feature description.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Currency;
    use crate::mutation::types::{
        AddFeatureMutation, RemoveFeatureMutation, UpdateFeatureMutation,
    };
    use serde_json::json;

    fn owned_session() -> EditSession {
        let mut invoice = Invoice::new("owner", Utc::now());
        invoice.id = "inv".into();
        EditSession::open(invoice, Some("owner"))
    }

    #[test]
    fn non_owner_cannot_mutate() {
        let invoice = Invoice::new("owner", Utc::now());
        let mut session = EditSession::open(invoice.clone(), Some("someone-else"));
        assert!(!session.can_edit());

        for mutation in [
            Mutation::UseRevision,
            Mutation::AddRevisionSlot,
            Mutation::SnapshotRevisions,
            Mutation::Set(json!({ "projectTitle": "Hijacked" })),
            Mutation::AddFeature(AddFeatureMutation::default()),
        ] {
            assert!(matches!(
                session.apply(mutation, Utc::now()),
                Err(SessionError::ReadOnly)
            ));
        }
        assert_eq!(session.into_invoice(), invoice);
    }

    #[test]
    fn anonymous_viewer_is_read_only() {
        let session = EditSession::open(Invoice::new("owner", Utc::now()), None);
        assert!(!session.can_edit());
    }

    #[test]
    fn revision_example_through_session() {
        let mut session = owned_session();
        let results = session
            .apply_all(vec![Mutation::UseRevision, Mutation::AddRevisionSlot], Utc::now())
            .unwrap();
        assert!(results.iter().all(|r| r.applied));

        let revisions = &session.working().revisions;
        assert_eq!((revisions.total(), revisions.used()), (4, 1));
        assert_eq!(revisions.remaining(), 3);
    }

    #[test]
    fn exhausted_use_reports_unchanged() {
        let mut session = owned_session();
        let batch = vec![Mutation::UseRevision; 4];
        let results = session.apply_all(batch, Utc::now()).unwrap();
        let applied: Vec<_> = results.iter().map(|r| r.applied).collect();
        assert_eq!(applied, [true, true, true, false]);
        assert_eq!(session.working().revisions.used(), 3);
    }

    #[test]
    fn feature_lifecycle() {
        let mut session = owned_session();
        session
            .apply(
                Mutation::AddFeature(AddFeatureMutation {
                    description: "landing page".into(),
                    price: 0.0,
                }),
                Utc::now(),
            )
            .unwrap();
        let id = session.working().features[0].id.clone();
        assert_eq!(session.working().features[0].description, "Landing page");

        let outcome = session
            .apply(
                Mutation::UpdateFeature(UpdateFeatureMutation {
                    id: id.clone(),
                    description: Some("éditorial blog".into()),
                    price: None,
                }),
                Utc::now(),
            )
            .unwrap();
        assert!(outcome.applied());
        assert_eq!(session.working().features[0].description, "Éditorial blog");

        let missing = session
            .apply(
                Mutation::RemoveFeature(RemoveFeatureMutation { id: "nope".into() }),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(missing, Outcome::Unchanged);

        session
            .apply(Mutation::RemoveFeature(RemoveFeatureMutation { id }), Utc::now())
            .unwrap();
        assert!(session.working().features.is_empty());
    }

    #[test]
    fn set_cannot_touch_ownership() {
        let mut session = owned_session();
        session
            .apply(
                Mutation::Set(json!({ "createdBy": "thief", "clientName": "Acme" })),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(session.working().created_by, "owner");
        assert_eq!(session.working().client_name, "Acme");
    }

    #[test]
    fn failed_batch_surfaces_error() {
        let mut session = owned_session();
        let result = session.apply_all(
            vec![
                Mutation::SetCurrency(Currency::Pkr),
                Mutation::Set(json!("not an object")),
            ],
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(SessionError::Validation(ValidationError::NotAnObject))
        ));
    }
}
