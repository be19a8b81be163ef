//! Pull (read path) messages.
//!
//! Pull answers "everything that changed since cookie V" from the
//! version-tagged records the push path maintains. The cookie a client holds
//! is the space version it last saw.

use crate::error::ProtocolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pull request from one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// The requesting client.
    #[serde(rename = "clientID")]
    pub client_id: String,
    /// The space version the client last saw (0 for a fresh client).
    pub cookie: u64,
}

impl PullRequest {
    /// Creates a new pull request.
    pub fn new(client_id: impl Into<String>, cookie: u64) -> Self {
        Self {
            client_id: client_id.into(),
            cookie,
        }
    }

    /// Decodes a pull request from JSON bytes.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes to JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// One patch operation in a pull response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Create or replace the value under `key`.
    Put {
        /// Entry key.
        key: String,
        /// New value.
        value: Value,
    },
    /// Remove the value under `key`.
    Del {
        /// Entry key.
        key: String,
    },
}

/// Response to a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// The space version as of this response; the client's next cookie.
    pub cookie: u64,
    /// The highest mutation id the server has applied for this client.
    #[serde(rename = "lastMutationID")]
    pub last_mutation_id: u64,
    /// Changes since the request cookie, in key order.
    pub patch: Vec<PatchOp>,
}

impl PullResponse {
    /// Creates a new pull response.
    pub fn new(cookie: u64, last_mutation_id: u64, patch: Vec<PatchOp>) -> Self {
        Self {
            cookie,
            last_mutation_id,
            patch,
        }
    }

    /// Encodes to JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pull_request_roundtrip() {
        let request = PullRequest::new("c1", 7);
        let bytes = request.encode().unwrap();
        let decoded = PullRequest::decode(&bytes).unwrap();

        assert_eq!(decoded, request);
    }

    #[test]
    fn patch_op_wire_shape() {
        let put = PatchOp::Put {
            key: "todo/t1".into(),
            value: json!({ "text": "x" }),
        };
        let del = PatchOp::Del {
            key: "todo/t2".into(),
        };

        let put_json = serde_json::to_value(&put).unwrap();
        let del_json = serde_json::to_value(&del).unwrap();

        assert_eq!(put_json["op"], "put");
        assert_eq!(put_json["key"], "todo/t1");
        assert_eq!(del_json, json!({ "op": "del", "key": "todo/t2" }));
    }

    #[test]
    fn pull_response_roundtrip() {
        let response = PullResponse::new(
            9,
            4,
            vec![
                PatchOp::Put {
                    key: "a".into(),
                    value: json!(1),
                },
                PatchOp::Del { key: "b".into() },
            ],
        );

        let bytes = response.encode().unwrap();
        let decoded: PullResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, response);
    }

    #[test]
    fn pull_response_field_names() {
        let bytes = PullResponse::new(3, 2, vec![]).encode().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["cookie"], 3);
        assert_eq!(value["lastMutationID"], 2);
        assert!(value["patch"].as_array().unwrap().is_empty());
    }
}
