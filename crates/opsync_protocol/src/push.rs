//! Push (write path) messages.

use crate::error::{ProtocolError, ProtocolResult};
use crate::mutation::Mutation;
use serde::{Deserialize, Serialize};

/// A batch of mutations pushed by one client.
///
/// `mutations` is processed in array order; array order is defined to equal
/// sequence order and the server does not sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    /// The submitting client.
    #[serde(rename = "clientID")]
    pub client_id: String,
    /// Mutations in sequence order.
    pub mutations: Vec<Mutation>,
}

impl PushRequest {
    /// Creates a new push request.
    pub fn new(client_id: impl Into<String>, mutations: Vec<Mutation>) -> Self {
        Self {
            client_id: client_id.into(),
            mutations,
        }
    }

    /// Decodes a push request from JSON bytes and validates its shape.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        let request: Self = serde_json::from_slice(bytes)?;
        request.validate()?;
        Ok(request)
    }

    /// Encodes to JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Validates protocol constraints on the request shape.
    ///
    /// Malformed batches are rejected here, before any transaction opens.
    pub fn validate(&self) -> ProtocolResult<()> {
        if self.client_id.is_empty() {
            return Err(ProtocolError::invalid("clientID must not be empty"));
        }
        for (index, mutation) in self.mutations.iter().enumerate() {
            mutation.validate(index)?;
        }
        Ok(())
    }
}

/// Acknowledgement of a processed push.
///
/// The push path intentionally carries no per-mutation results: the server's
/// re-execution is authoritative and clients observe the true resulting state
/// through the pull path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {}

impl PushResponse {
    /// Encodes to JSON bytes (an empty object).
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn make_request() -> PushRequest {
        PushRequest::new(
            "c1",
            vec![
                Mutation::new(1, "createTodo", json!({ "id": "t1" })),
                Mutation::new(2, "deleteTodo", json!("t1")),
            ],
        )
    }

    #[test]
    fn push_request_roundtrip() {
        let request = make_request();
        let bytes = request.encode().unwrap();
        let decoded = PushRequest::decode(&bytes).unwrap();

        assert_eq!(decoded, request);
    }

    #[test]
    fn wire_field_names() {
        let bytes = make_request().encode().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["clientID"], "c1");
        assert_eq!(value["mutations"][0]["id"], 1);
        assert_eq!(value["mutations"][1]["name"], "deleteTodo");
    }

    #[test]
    fn decode_accepts_wire_shape() {
        let body = br#"{
            "clientID": "c9",
            "mutations": [{ "id": 1, "name": "createTodo", "args": {} }]
        }"#;

        let request = PushRequest::decode(body).unwrap();
        assert_eq!(request.client_id, "c9");
        assert_eq!(request.mutations.len(), 1);
    }

    #[test]
    fn decode_rejects_missing_client_id() {
        let body = br#"{ "mutations": [] }"#;
        assert!(matches!(
            PushRequest::decode(body),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_client_id() {
        let request = PushRequest::new("", vec![]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_mutation() {
        let request = PushRequest::new("c1", vec![Mutation::new(0, "x", Value::Null)]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_batch_is_valid() {
        let request = PushRequest::new("c1", vec![]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn push_response_is_empty_object() {
        let bytes = PushResponse::default().encode().unwrap();
        assert_eq!(bytes, b"{}");
    }
}
