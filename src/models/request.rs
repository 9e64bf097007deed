// src/models/request.rs
//! Requests brokered between web pages and the wallet UI.
//!
//! A signing request is a tagged union over the two request kinds. It is
//! only ever constructed by [`crate::broker::validator::parse`], so every
//! value of these types has already passed validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which key a data request should be signed with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum KeyType {
    DidKey,
    ManagementKey,
    Fct,
    Ec,
    BlockSigningKey,
}

impl KeyType {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "didKey" => Some(KeyType::DidKey),
            "managementKey" => Some(KeyType::ManagementKey),
            "fct" => Some(KeyType::Fct),
            "ec" => Some(KeyType::Ec),
            "blockSigningKey" => Some(KeyType::BlockSigningKey),
            _ => None,
        }
    }

    /// Key types whose keys live inside a DID.
    pub fn is_did_scoped(&self) -> bool {
        matches!(self, KeyType::DidKey | KeyType::ManagementKey)
    }

    /// Key types backed by a Factom address.
    pub fn is_address(&self) -> bool {
        matches!(self, KeyType::Fct | KeyType::Ec)
    }
}

/// PegNet transaction kinds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PegnetTxType {
    Burn,
    Conversion,
    Transfer,
}

impl PegnetTxType {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "burn" => Some(PegnetTxType::Burn),
            "conversion" => Some(PegnetTxType::Conversion),
            "transfer" => Some(PegnetTxType::Transfer),
            _ => None,
        }
    }
}

/// Arbitrary data to sign with a wallet key.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub data: Value,
    pub key_type: KeyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
}

/// A PegNet transaction to build and sign with an FCT address.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PegnetRequest {
    pub tx_type: PegnetTxType,
    pub input_address: String,
    pub input_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_address: Option<String>,
}

/// Kind-specific part of a signing request.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "requestType", content = "requestInfo", rename_all = "camelCase")]
pub enum RequestInfo {
    Data(DataRequest),
    Pegnet(PegnetRequest),
}

/// A validated signing request waiting in the queue.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    /// Opaque identifier chosen by the page
    pub request_id: Value,

    #[serde(flatten)]
    pub info: RequestInfo,

    /// Origin of the page that sent the request, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    pub received_at: DateTime<Utc>,
}

impl SigningRequest {
    /// Key type the request must be signed with. PegNet transactions are
    /// always signed by their FCT input address.
    pub fn key_type(&self) -> KeyType {
        match &self.info {
            RequestInfo::Data(data) => data.key_type,
            RequestInfo::Pegnet(_) => KeyType::Fct,
        }
    }
}

/// A pending domain-approval prompt as shown to the UI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    /// Capability being requested, e.g. "FCT addresses"
    pub request_type: String,
    /// Origin asking for it
    pub from: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signing_request_wire_shape() {
        let request = SigningRequest {
            request_id: json!(7),
            info: RequestInfo::Data(DataRequest {
                data: json!("hello"),
                key_type: KeyType::Fct,
                key_identifier: Some("FA2jK2HcLnRdS94dEcU27rF3meoJfpUcZPSinpb7AwQvPRY6RL1Q".into()),
                did: None,
            }),
            origin: None,
            received_at: Utc::now(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["requestId"], json!(7));
        assert_eq!(value["requestType"], json!("data"));
        assert_eq!(value["requestInfo"]["keyType"], json!("fct"));
        assert!(value["requestInfo"].get("did").is_none());
        assert_eq!(request.key_type(), KeyType::Fct);
    }

    #[test]
    fn test_key_type_wire_names() {
        assert_eq!(KeyType::from_wire("blockSigningKey"), Some(KeyType::BlockSigningKey));
        assert_eq!(KeyType::from_wire("FCT"), None);
        assert_eq!(serde_json::to_value(KeyType::DidKey).unwrap(), json!("didKey"));
    }
}
