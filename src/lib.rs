// src/lib.rs
//! Core of a DID identity wallet: the signing-request broker that sits
//! between web pages and the wallet UI, the Factom DID document and update
//! entry codecs, and the key material behind them.

pub mod broker;    // Request validation, queueing and approval
pub mod config;    // Runtime settings
pub mod did;       // DID documents and Factom entries
pub mod error;     // Shared error type
pub mod models;    // Data structures
pub mod services;  // HTTP boundary and page relay
pub mod utils;     // Hashing and encoding helpers
pub mod wallet;    // Keys, signing, backups and address lists
