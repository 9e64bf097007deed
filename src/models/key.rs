// src/models/key.rs
//! Key and service models as held by the wallet's form state.
//!
//! The codecs in [`crate::did`] only read these; ownership stays with the
//! caller that edits a DID.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Signature scheme of a key.
///
/// The wire spelling doubles as the prefix of the verification key type,
/// e.g. `Ed25519VerificationKey`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureType {
    #[serde(rename = "Ed25519")]
    Ed25519,
    #[serde(rename = "ECDSASecp256k1")]
    EcdsaSecp256k1,
    #[serde(rename = "RSA")]
    Rsa,
}

impl SignatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureType::Ed25519 => "Ed25519",
            SignatureType::EcdsaSecp256k1 => "ECDSASecp256k1",
            SignatureType::Rsa => "RSA",
        }
    }

    /// Type string of the verification key object in a DID document.
    pub fn verification_key_type(&self) -> String {
        format!("{}VerificationKey", self.as_str())
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a DID key may be used for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    PublicKey,
    AuthenticationKey,
}

/// Variant-specific data of a key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KeyRole {
    /// A key with no role beyond its base fields.
    Plain,
    /// A key listed in the DID document.
    #[serde(rename_all = "camelCase")]
    Did {
        purpose: BTreeSet<Purpose>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority_requirement: Option<u32>,
    },
    /// A key allowed to update the DID itself. Priority 0 is the highest
    /// authority.
    #[serde(rename_all = "camelCase")]
    Management {
        priority: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority_requirement: Option<u32>,
    },
}

/// A key belonging to a DID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyModel {
    /// Human label, unique within one DID
    pub alias: String,
    pub signature_type: SignatureType,
    /// DID string of the key's controller
    pub controller: String,
    /// Base58 public key, or PEM text for RSA keys
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    pub role: KeyRole,
}

impl KeyModel {
    pub fn plain(
        alias: impl Into<String>,
        signature_type: SignatureType,
        controller: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        KeyModel {
            alias: alias.into(),
            signature_type,
            controller: controller.into(),
            public_key: public_key.into(),
            private_key: None,
            role: KeyRole::Plain,
        }
    }

    /// Turns this key into a DID key with the given purposes.
    pub fn with_purpose(mut self, purpose: impl IntoIterator<Item = Purpose>) -> Self {
        self.role = KeyRole::Did {
            purpose: purpose.into_iter().collect(),
            priority_requirement: None,
        };
        self
    }

    /// Turns this key into a management key.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.role = KeyRole::Management {
            priority,
            priority_requirement: None,
        };
        self
    }

    pub fn priority_requirement(&self) -> Option<u32> {
        match &self.role {
            KeyRole::Plain => None,
            KeyRole::Did { priority_requirement, .. }
            | KeyRole::Management { priority_requirement, .. } => *priority_requirement,
        }
    }

    pub fn has_purpose(&self, wanted: Purpose) -> bool {
        matches!(&self.role, KeyRole::Did { purpose, .. } if purpose.contains(&wanted))
    }
}

/// A service endpoint advertised by a DID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceModel {
    #[serde(rename = "type")]
    pub service_type: String,
    pub endpoint: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_requirement: Option<u32>,
}

impl ServiceModel {
    pub fn new(
        alias: impl Into<String>,
        service_type: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        ServiceModel {
            service_type: service_type.into(),
            endpoint: endpoint.into(),
            alias: alias.into(),
            priority_requirement: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_tagged() {
        let key = KeyModel::plain("k1", SignatureType::Ed25519, "did:factom:ab", "3yQ")
            .with_priority(0);
        let value = serde_json::to_value(&key).unwrap();
        assert_eq!(value["role"], json!({"kind": "management", "priority": 0}));
        assert_eq!(value["signatureType"], json!("Ed25519"));
    }

    #[test]
    fn test_purpose_lookup() {
        let key = KeyModel::plain("k1", SignatureType::EcdsaSecp256k1, "did:factom:ab", "3yQ")
            .with_purpose([Purpose::AuthenticationKey]);
        assert!(key.has_purpose(Purpose::AuthenticationKey));
        assert!(!key.has_purpose(Purpose::PublicKey));
        assert_eq!(
            SignatureType::EcdsaSecp256k1.verification_key_type(),
            "ECDSASecp256k1VerificationKey"
        );
    }
}
