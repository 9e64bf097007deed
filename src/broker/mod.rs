// src/broker/mod.rs
//! Signing-request broker: validation, queueing and arbitration of
//! requests that cross from web pages to the wallet UI and back.

pub mod actor;
pub mod arbiter;
pub mod badge;
pub mod queue;
pub mod signing_broker;
pub mod validator;

/// Single-use reply channel for one request.
pub type Responder = tokio::sync::oneshot::Sender<serde_json::Value>;

pub use actor::{spawn, BrokerHandle};
pub use signing_broker::{BrokerMessage, SigningBroker, INVALID_REQUEST};
