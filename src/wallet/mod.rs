// src/wallet/mod.rs
//! Key material, the signing flow and everything the wallet persists.

pub mod address_events;
pub mod key_management;
pub mod signing;
pub mod vault;
