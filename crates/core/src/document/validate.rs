/// Patch hygiene for the save path.
///
/// Saves are never hard-validated beyond type checks: a patch only has to be
/// a JSON object. Server-managed fields are dropped rather than rejected so a
/// client can send back the whole document it fetched.
use serde_json::{Map, Value};
use thiserror::Error;

/// Fields only the server may write.
pub const SERVER_MANAGED_FIELDS: [&str; 5] =
    ["id", "createdBy", "createdAt", "updatedAt", "startDate"];

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("patch must be a JSON object")]
    NotAnObject,
    #[error("malformed invoice document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Validate a client patch and strip server-managed fields.
pub fn sanitize_patch(patch: Value) -> Result<Map<String, Value>, ValidationError> {
    let Value::Object(mut fields) = patch else {
        return Err(ValidationError::NotAnObject);
    };
    for key in SERVER_MANAGED_FIELDS {
        if fields.remove(key).is_some() {
            tracing::debug!(field = key, "ignoring server-managed field in patch");
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            sanitize_patch(json!(["projectTitle"])),
            Err(ValidationError::NotAnObject)
        ));
        assert!(matches!(
            sanitize_patch(json!(null)),
            Err(ValidationError::NotAnObject)
        ));
    }

    #[test]
    fn strips_server_managed_fields() {
        let fields = sanitize_patch(json!({
            "id": "other",
            "createdBy": "intruder",
            "updatedAt": "2020-01-01T00:00:00Z",
            "clientName": "Acme",
        }))
        .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["clientName"], "Acme");
    }
}
