// src/models/mod.rs
pub mod did;
pub mod key;
pub mod request;
