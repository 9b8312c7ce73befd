/// Mutation type definitions for the invoice edit protocol.
///
/// A request carries an ordered batch; each entry is externally tagged in
/// camelCase, e.g. `"useRevision"`, `{"set": {"clientName": "Acme"}}` or
/// `{"updateFeature": {"id": "f1", "description": "Blog"}}`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Currency, Invoice};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    /// Shallow patch of top-level fields.
    Set(Value),
    AddFeature(AddFeatureMutation),
    UpdateFeature(UpdateFeatureMutation),
    RemoveFeature(RemoveFeatureMutation),
    UseRevision,
    AddRevisionSlot,
    RemoveRevisionSlot,
    SnapshotRevisions,
    SetCurrency(Currency),
}

impl Mutation {
    pub fn operation(&self) -> &'static str {
        match self {
            Mutation::Set(_) => "set",
            Mutation::AddFeature(_) => "addFeature",
            Mutation::UpdateFeature(_) => "updateFeature",
            Mutation::RemoveFeature(_) => "removeFeature",
            Mutation::UseRevision => "useRevision",
            Mutation::AddRevisionSlot => "addRevisionSlot",
            Mutation::RemoveRevisionSlot => "removeRevisionSlot",
            Mutation::SnapshotRevisions => "snapshotRevisions",
            Mutation::SetCurrency(_) => "setCurrency",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFeatureMutation {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeatureMutation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveFeatureMutation {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutateRequest {
    pub mutations: Vec<Mutation>,
}

/// Result of a mutation transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub transaction_id: String,
    pub results: Vec<MutationResult>,
    pub document: Invoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResult {
    pub operation: String,
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_mixed_batch() {
        let request: MutateRequest = serde_json::from_value(json!({
            "mutations": [
                "useRevision",
                { "addFeature": { "description": "Contact form" } },
                { "updateFeature": { "id": "f1", "price": 40.0 } },
                { "set": { "clientName": "Acme" } },
                { "setCurrency": "PKR" },
                "snapshotRevisions",
            ]
        }))
        .unwrap();

        let ops: Vec<_> = request.mutations.iter().map(Mutation::operation).collect();
        assert_eq!(
            ops,
            [
                "useRevision",
                "addFeature",
                "updateFeature",
                "set",
                "setCurrency",
                "snapshotRevisions"
            ]
        );
        assert!(matches!(
            &request.mutations[2],
            Mutation::UpdateFeature(m) if m.description.is_none() && m.price == Some(40.0)
        ));
    }

    #[test]
    fn rejects_unknown_operation() {
        let result = serde_json::from_value::<MutateRequest>(json!({
            "mutations": ["resetEverything"]
        }));
        assert!(result.is_err());
    }
}
