// src/error.rs
//! Error types shared across the wallet core.
//!
//! Validation problems never leave the broker as errors (they become a
//! `{success: false}` reply), so the variants here cover the codec, the key
//! material and the signing flow.

use thiserror::Error;

/// Errors produced by the wallet core.
#[derive(Error, Debug)]
pub enum WalletError {
    /// The inbound request failed validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] crate::broker::validator::ValidationError),

    /// A key alias or DID referenced by a request is not among the
    /// available signing keys.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The vault rejected the supplied password.
    #[error("Invalid password")]
    InvalidPassword,

    /// The key uses a signature scheme this wallet cannot sign with.
    #[error("Unsupported signature type: {0}")]
    UnsupportedSignatureType(String),

    /// A DID string is not a Factom DID.
    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    /// Key material could not be decoded.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// A Factom entry exceeds the network's size limit.
    #[error("Entry size {size} exceeds the maximum of {max} bytes")]
    EntryTooLarge { size: usize, max: usize },

    /// An update entry was requested with no changes.
    #[error("Nothing to update")]
    EmptyUpdate,

    /// The vault cipher failed for a reason other than the password.
    #[error("Vault error: {0}")]
    Vault(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker task is no longer running.
    #[error("Broker channel closed")]
    BrokerClosed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WalletError>;
