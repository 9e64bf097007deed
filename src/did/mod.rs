// src/did/mod.rs
//! DID document and update-entry codecs, and the Factom chain identity a
//! DID is derived from.

pub mod chain;
pub mod document;
pub mod entry;
pub mod update;

pub use chain::{derive_chain_id, derive_did, Entry};
pub use document::build_create_document;
pub use update::{build_update_entry, Snapshots};
