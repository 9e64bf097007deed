// src/did/document.rs
//! Builds the canonical DID document published when a DID is created.

use crate::models::did::{
    AuthenticationEntry, DIDDocument, ServiceEntry, VerificationKey, DID_CONTEXT,
};
use crate::models::key::{KeyModel, ServiceModel, SignatureType};

/// `<did>#<alias>`, the id of a key or service inside a DID document.
pub fn full_id(did: &str, alias: &str) -> String {
    format!("{}#{}", did, alias)
}

/// Converts a key into its document representation.
///
/// RSA keys carry their key as PEM text, every other scheme as base58.
pub fn key_entry(did: &str, key: &KeyModel) -> VerificationKey {
    let (public_key_base58, public_key_pem) = match key.signature_type {
        SignatureType::Rsa => (None, Some(key.public_key.clone())),
        _ => (Some(key.public_key.clone()), None),
    };

    VerificationKey {
        id: full_id(did, &key.alias),
        key_type: key.signature_type.verification_key_type(),
        controller: key.controller.clone(),
        public_key_base58,
        public_key_pem,
    }
}

pub fn service_entry(did: &str, service: &ServiceModel) -> ServiceEntry {
    ServiceEntry {
        id: full_id(did, &service.alias),
        service_type: service.service_type.clone(),
        service_endpoint: service.endpoint.clone(),
    }
}

/// Authentication methods for `authentication_keys`.
///
/// Keys that also appear in `public_keys` (matched by alias) become
/// references and come first; authentication-only keys follow as embedded
/// objects. Input order is kept within each group.
pub fn authentication_entries(
    did: &str,
    authentication_keys: &[KeyModel],
    public_keys: &[KeyModel],
) -> Vec<AuthenticationEntry> {
    let (referenced, embedded): (Vec<&KeyModel>, Vec<&KeyModel>) = authentication_keys
        .iter()
        .partition(|key| public_keys.iter().any(|pk| pk.alias == key.alias));

    referenced
        .into_iter()
        .map(|key| AuthenticationEntry::Reference(full_id(did, &key.alias)))
        .chain(
            embedded
                .into_iter()
                .map(|key| AuthenticationEntry::Embedded(key_entry(did, key))),
        )
        .collect()
}

/// Builds the DID document for a new DID.
///
/// # Arguments
/// * `did` - The DID being created
/// * `public_keys` - Keys listed under `publicKey`
/// * `authentication_keys` - Keys usable for authentication
/// * `services` - Service endpoints
pub fn build_create_document(
    did: &str,
    public_keys: &[KeyModel],
    authentication_keys: &[KeyModel],
    services: &[ServiceModel],
) -> DIDDocument {
    DIDDocument {
        context: DID_CONTEXT.to_string(),
        id: did.to_string(),
        public_key: public_keys.iter().map(|key| key_entry(did, key)).collect(),
        authentication: authentication_entries(did, authentication_keys, public_keys),
        service: services.iter().map(|s| service_entry(did, s)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DID: &str = "did:factom:f26e1c422c657521861ced450442d0c664702f49480aec67805822edfcfee758";

    fn key(alias: &str, signature_type: SignatureType, public_key: &str) -> KeyModel {
        KeyModel::plain(alias, signature_type, DID, public_key)
    }

    #[test]
    fn test_references_precede_embedded_keys() {
        let k1 = key("k1", SignatureType::Ed25519, "3yQ1");
        let k2 = key("k2", SignatureType::Ed25519, "3yQ2");
        let k3 = key("k3", SignatureType::EcdsaSecp256k1, "3yQ3");

        // Authentication-only key first in the input.
        let document = build_create_document(
            DID,
            &[k1.clone(), k2],
            &[k3.clone(), k1],
            &[],
        );

        assert_eq!(
            document.authentication,
            vec![
                AuthenticationEntry::Reference(format!("{}#k1", DID)),
                AuthenticationEntry::Embedded(key_entry(DID, &k3)),
            ]
        );
    }

    #[test]
    fn test_document_wire_format() {
        let ed = key("signing", SignatureType::Ed25519, "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV");
        let rsa = key("legacy", SignatureType::Rsa, "-----BEGIN PUBLIC KEY-----\nMIIB\n-----END PUBLIC KEY-----");
        let service = ServiceModel::new("inbox", "MessagingService", "https://inbox.example.com");

        let document = build_create_document(DID, &[ed.clone(), rsa], &[ed], &[service]);
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(
            value,
            json!({
                "@context": "https://w3id.org/did/v1",
                "id": DID,
                "publicKey": [
                    {
                        "id": format!("{}#signing", DID),
                        "type": "Ed25519VerificationKey",
                        "controller": DID,
                        "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
                    },
                    {
                        "id": format!("{}#legacy", DID),
                        "type": "RSAVerificationKey",
                        "controller": DID,
                        "publicKeyPem": "-----BEGIN PUBLIC KEY-----\nMIIB\n-----END PUBLIC KEY-----"
                    }
                ],
                "authentication": [format!("{}#signing", DID)],
                "service": [{
                    "id": format!("{}#inbox", DID),
                    "type": "MessagingService",
                    "serviceEndpoint": "https://inbox.example.com"
                }]
            })
        );
    }
}
