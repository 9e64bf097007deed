// src/did/chain.rs
//! Factom chain identity and entries.
//!
//! A chain id is derived from the external ids of the chain's first entry:
//! each external id is hashed on its own, the digests are concatenated in
//! order and the result is hashed once more. Hashing the concatenated
//! external ids directly gives a different (wrong) id.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::utils::crypto::hash_data;

/// Method prefix of Factom DIDs.
pub const DID_METHOD_PREFIX: &str = "did:factom:";

/// Largest entry payload accepted by the Factom network.
pub const MAX_ENTRY_SIZE: usize = 10 * 1024;

/// Derives the hex chain id for a chain whose first entry carries `ext_ids`.
pub fn derive_chain_id<T: AsRef<[u8]>>(ext_ids: &[T]) -> String {
    let digests: Vec<u8> = ext_ids
        .iter()
        .flat_map(|ext_id| hash_data(ext_id.as_ref()))
        .collect();
    hex::encode(hash_data(&digests))
}

/// Derives the DID identified by the chain whose first entry carries `ext_ids`.
pub fn derive_did<T: AsRef<[u8]>>(ext_ids: &[T]) -> String {
    format!("{}{}", DID_METHOD_PREFIX, derive_chain_id(ext_ids))
}

/// Returns the chain id part of a Factom DID.
pub fn chain_id_of(did: &str) -> Option<&str> {
    did.strip_prefix(DID_METHOD_PREFIX)
}

/// A Factom entry ready to be submitted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub chain_id: String,
    /// External ids, hex encoded on the wire
    #[serde(with = "hex_list")]
    pub ext_ids: Vec<Vec<u8>>,
    pub content: String,
}

impl Entry {
    /// Builds an entry and checks it against [`MAX_ENTRY_SIZE`].
    pub fn new(chain_id: String, ext_ids: Vec<Vec<u8>>, content: String) -> Result<Self> {
        let entry = Entry {
            chain_id,
            ext_ids,
            content,
        };
        let size = entry.size();
        if size > MAX_ENTRY_SIZE {
            return Err(WalletError::EntryTooLarge {
                size,
                max: MAX_ENTRY_SIZE,
            });
        }
        Ok(entry)
    }

    /// Payload size as counted by the network: content, external ids and a
    /// two-byte length prefix per external id.
    pub fn size(&self) -> usize {
        self.content.len()
            + self
                .ext_ids
                .iter()
                .map(|ext_id| ext_id.len() + 2)
                .sum::<usize>()
    }
}

mod hex_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(ids: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        ids.iter().map(hex::encode).collect::<Vec<_>>().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_of_hashes() {
        let mut concatenated = Vec::new();
        concatenated.extend_from_slice(&hash_data(b"a"));
        concatenated.extend_from_slice(&hash_data(b"b"));
        let expected = hex::encode(hash_data(&concatenated));

        assert_eq!(derive_chain_id(&["a", "b"]), expected);
        assert_ne!(derive_chain_id(&["a", "b"]), hex::encode(hash_data(b"ab")));
    }

    #[test]
    fn test_chain_id_is_deterministic_and_order_sensitive() {
        let id = derive_chain_id(&["a", "b"]);
        assert_eq!(id, derive_chain_id(&[b"a".to_vec(), b"b".to_vec()]));
        assert_ne!(id, derive_chain_id(&["b", "a"]));
        assert_eq!(id.len(), 64);
    }

    #[test]
    fn test_did_prefix() {
        let did = derive_did(&["DIDManagement", "1.0.0", "nonce"]);
        assert!(crate::broker::validator::is_valid_did(&did));
        assert_eq!(chain_id_of(&did).map(str::len), Some(64));
        assert_eq!(chain_id_of("did:web:example.com"), None);
    }

    #[test]
    fn test_entry_size_limit() {
        let fits = "x".repeat(MAX_ENTRY_SIZE - 7);
        let entry = Entry::new("00".repeat(32), vec![b"abcde".to_vec()], fits).unwrap();
        assert_eq!(entry.size(), MAX_ENTRY_SIZE);

        let too_big = "x".repeat(MAX_ENTRY_SIZE - 6);
        assert!(matches!(
            Entry::new("00".repeat(32), vec![b"abcde".to_vec()], too_big),
            Err(WalletError::EntryTooLarge { size, .. }) if size == MAX_ENTRY_SIZE + 1
        ));
    }

    #[test]
    fn test_entry_ext_ids_are_hex_on_the_wire() {
        let entry = Entry::new("ab".into(), vec![b"DID".to_vec()], "{}".into()).unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["extIds"], serde_json::json!(["444944"]));
        let back: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
