// src/utils/crypto.rs
//! Hashing and key-encoding helpers.
//!
//! Factom identifies chains and signs entries over SHA-256, so every digest
//! in the wallet goes through [`hash_data`].

use ring::digest::{digest, SHA256};

use crate::error::{Result, WalletError};

/// Computes a SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

/// Encodes raw key bytes as base58 (bitcoin alphabet).
pub fn to_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decodes a base58 key string.
pub fn from_base58(encoded: &str) -> Result<Vec<u8>> {
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| WalletError::InvalidKey(format!("base58: {}", e)))
}
