// src/did/entry.rs
//! Factom entries that create and update a DID.
//!
//! A DID is created by starting a new chain whose first entry carries the
//! DID document; the chain id derived from that entry's external ids is the
//! DID's identifier. Updates are appended to the same chain and are signed
//! by one of the DID's management keys.

use rand::RngCore;

use super::chain::{chain_id_of, derive_chain_id, derive_did, Entry};
use super::document::{build_create_document, full_id};
use super::update::{build_update_entry, Snapshots};
use crate::error::{Result, WalletError};
use crate::models::did::DIDDocument;
use crate::models::key::{KeyModel, KeyRole, ServiceModel};
use crate::utils::crypto::hash_data;
use crate::utils::serialization::serialize;
use crate::wallet::key_management::KeySigner;

/// First external id of a DID's create entry.
pub const CREATE_ENTRY_TAG: &str = "DIDManagement";
/// First external id of a DID update entry.
pub const UPDATE_ENTRY_TAG: &str = "UpdateDIDEntry";
/// Version of the entry schema written by this wallet.
pub const ENTRY_SCHEMA_VERSION: &str = "1.0.0";

/// A random hex nonce that makes a new DID's chain id unique.
pub fn random_nonce() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn create_ext_ids(nonce: &str) -> Vec<Vec<u8>> {
    vec![
        CREATE_ENTRY_TAG.as_bytes().to_vec(),
        ENTRY_SCHEMA_VERSION.as_bytes().to_vec(),
        nonce.as_bytes().to_vec(),
    ]
}

/// The DID that a create entry with `nonce` will produce.
///
/// Known before the entry is built, so key controllers can point at it.
pub fn did_for_nonce(nonce: &str) -> String {
    derive_did(create_ext_ids(nonce).as_slice())
}

/// Everything produced when creating a DID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDid {
    pub did: String,
    pub document: DIDDocument,
    pub entry: Entry,
}

/// Builds the chain-creating entry for a new DID.
pub fn create_entry(
    nonce: &str,
    public_keys: &[KeyModel],
    authentication_keys: &[KeyModel],
    services: &[ServiceModel],
) -> Result<CreatedDid> {
    let ext_ids = create_ext_ids(nonce);
    let chain_id = derive_chain_id(ext_ids.as_slice());
    let did = derive_did(ext_ids.as_slice());

    let document = build_create_document(&did, public_keys, authentication_keys, services);
    let content = serialize(&document)?;
    let entry = Entry::new(chain_id, ext_ids, content)?;

    Ok(CreatedDid {
        did,
        document,
        entry,
    })
}

/// Builds a signed update entry for `did`.
///
/// # Arguments
/// * `did` - DID being updated
/// * `signing_key` - Management key (with private key) authorizing the update
/// * `signer` - Signing capability for the key's scheme
/// * `snapshots` - Original and current key/service state
///
/// # Errors
/// - [`WalletError::EmptyUpdate`] when nothing changed
/// - [`WalletError::InvalidKey`] when `signing_key` is not a management key
///   or lacks its private key
pub fn update_entry(
    did: &str,
    signing_key: &KeyModel,
    signer: &dyn KeySigner,
    snapshots: Snapshots<'_>,
) -> Result<Entry> {
    let chain_id = chain_id_of(did).ok_or_else(|| WalletError::InvalidDid(did.to_string()))?;

    if !matches!(signing_key.role, KeyRole::Management { .. }) {
        return Err(WalletError::InvalidKey(format!(
            "{} is not a management key",
            signing_key.alias
        )));
    }
    let private_key = signing_key
        .private_key
        .as_deref()
        .ok_or_else(|| WalletError::InvalidKey(format!("{} has no private key", signing_key.alias)))?;

    let document = build_update_entry(did, snapshots);
    if document.is_empty() {
        return Err(WalletError::EmptyUpdate);
    }
    let content = serialize(&document)?;
    let key_id = full_id(did, &signing_key.alias);

    let mut signed = Vec::new();
    signed.extend_from_slice(UPDATE_ENTRY_TAG.as_bytes());
    signed.extend_from_slice(ENTRY_SCHEMA_VERSION.as_bytes());
    signed.extend_from_slice(key_id.as_bytes());
    signed.extend_from_slice(chain_id.as_bytes());
    signed.extend_from_slice(content.as_bytes());
    let signature = signer.sign(signing_key.signature_type, private_key, &hash_data(&signed))?;

    Entry::new(
        chain_id.to_string(),
        vec![
            UPDATE_ENTRY_TAG.as_bytes().to_vec(),
            ENTRY_SCHEMA_VERSION.as_bytes().to_vec(),
            key_id.into_bytes(),
            signature,
        ],
        content,
    )
}
