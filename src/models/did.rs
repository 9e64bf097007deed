// src/models/did.rs
//! Decentralized Identifier (DID) wire formats.
//!
//! Defines the JSON shapes written into Factom entries: the DID document
//! produced when a DID is created and the delta document produced when one
//! is updated. Field order and presence are format-significant.

use serde::{Deserialize, Serialize};

/// JSON-LD context written into every DID document.
pub const DID_CONTEXT: &str = "https://w3id.org/did/v1";

/// A DID Document as published in the DID's create entry.
///
/// # Fields
/// - `context`: JSON-LD context
/// - `id`: The DID string identifier
/// - `public_key`: Verification keys
/// - `authentication`: Authentication methods, references first
/// - `service`: Service endpoints
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DIDDocument {
    #[serde(rename = "@context")]
    pub context: String,

    /// The complete DID string identifier
    /// Example: "did:factom:5d0dd58757119d3f5d2d0f1ec1b1b4e2d3e6e7e8..."
    pub id: String,

    pub public_key: Vec<VerificationKey>,

    pub authentication: Vec<AuthenticationEntry>,

    pub service: Vec<ServiceEntry>,
}

/// A key object in a DID document.
///
/// Exactly one of `public_key_base58` and `public_key_pem` is set; PEM is
/// only used for RSA keys.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationKey {
    pub id: String,

    #[serde(rename = "type")]
    pub key_type: String,

    pub controller: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_pem: Option<String>,
}

/// An authentication method: either a reference to a key already listed in
/// `publicKey`, or an embedded key object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum AuthenticationEntry {
    Reference(String),
    Embedded(VerificationKey),
}

/// A service object in a DID document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub id: String,

    #[serde(rename = "type")]
    pub service_type: String,

    pub service_endpoint: String,
}

/// Minimal delta between two states of a DID.
///
/// Empty sections are absent from the JSON entirely.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateEntryDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<AddSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoke: Option<RevokeSection>,
}

impl UpdateEntryDocument {
    pub fn is_empty(&self) -> bool {
        self.add.is_none() && self.revoke.is_none()
    }
}

/// Keys, authentication methods and services added by an update.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<VerificationKey>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<AuthenticationEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<ServiceEntry>>,
}

/// Aliases revoked by an update.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<String>>,
}
