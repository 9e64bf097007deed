// src/broker/actor.rs
//! Message-passing boundary around the [`SigningBroker`].
//!
//! The broker lives on its own task and is only reachable through a
//! [`BrokerHandle`]. The inbox is drained one message at a time, which is
//! what keeps the broker's state free of locks.

use log::info;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::signing_broker::SigningBroker;
use super::Responder;
use crate::error::{Result, WalletError};

struct Envelope {
    message: Value,
    reply: Responder,
}

/// Cloneable sender side of the broker's inbox.
#[derive(Clone, Debug)]
pub struct BrokerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope").field("message", &self.message).finish()
    }
}

/// Moves `broker` onto a new task and returns the handle to reach it.
///
/// The task ends once every handle has been dropped.
pub fn spawn(broker: SigningBroker, capacity: usize) -> BrokerHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(capacity.max(1));

    tokio::spawn(async move {
        let mut broker = broker;
        while let Some(envelope) = rx.recv().await {
            broker.handle_raw(envelope.message, envelope.reply);
        }
        info!("signing broker stopped");
    });

    BrokerHandle { tx }
}

impl BrokerHandle {
    /// Sends a raw message and waits for its reply.
    ///
    /// For `ReceiveSigningRequest` and `ReceiveApprovalRequest` the reply
    /// only arrives once the user has acted on the request; there is no
    /// timeout.
    pub async fn dispatch(&self, message: Value) -> Result<Value> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { message, reply })
            .await
            .map_err(|_| WalletError::BrokerClosed)?;
        rx.await.map_err(|_| WalletError::BrokerClosed)
    }
}
