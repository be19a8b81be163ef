//! Client-submitted mutations.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single named, client-sequenced mutation.
///
/// Mutations are produced by a client and replayed by the server against the
/// authoritative store. They are immutable once submitted.
///
/// # Fields
///
/// - `id`: per-client sequence number, starting at 1, gapless and monotonic
/// - `name`: the registered mutator to invoke
/// - `args`: opaque JSON arguments handed to the mutator unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Per-client sequence number (>= 1).
    pub id: u64,
    /// Mutator name.
    pub name: String,
    /// Opaque mutator arguments.
    #[serde(default)]
    pub args: Value,
}

impl Mutation {
    /// Creates a new mutation.
    pub fn new(id: u64, name: impl Into<String>, args: Value) -> Self {
        Self {
            id,
            name: name.into(),
            args,
        }
    }

    /// Validates protocol constraints on this mutation.
    ///
    /// `index` is the mutation's position in the enclosing batch, used for
    /// error reporting only.
    pub fn validate(&self, index: usize) -> ProtocolResult<()> {
        if self.id == 0 {
            return Err(ProtocolError::invalid(format!(
                "mutation {index}: id must be >= 1"
            )));
        }
        if self.name.is_empty() {
            return Err(ProtocolError::invalid(format!(
                "mutation {index}: name must not be empty"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mutation_roundtrip() {
        let mutation = Mutation::new(3, "createTodo", json!({ "text": "buy milk" }));

        let bytes = serde_json::to_vec(&mutation).unwrap();
        let decoded: Mutation = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, mutation);
    }

    #[test]
    fn args_default_to_null() {
        let decoded: Mutation = serde_json::from_str(r#"{"id":1,"name":"noop"}"#).unwrap();
        assert_eq!(decoded.args, Value::Null);
    }

    #[test]
    fn zero_id_rejected() {
        let mutation = Mutation::new(0, "createTodo", Value::Null);
        assert!(mutation.validate(0).is_err());
    }

    #[test]
    fn empty_name_rejected() {
        let mutation = Mutation::new(1, "", Value::Null);
        let err = mutation.validate(2).unwrap_err();
        assert!(err.to_string().contains("mutation 2"));
    }
}
