// src/services/content_relay.rs
//! Relay between web pages and the background broker.
//!
//! Pages dispatch events (`SigningRequest`, `GetFCTAddresses`,
//! `GetECAddresses`); the relay turns each into a broker message and turns
//! the broker's reply back into the event the page listens for.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::broker::BrokerHandle;
use crate::error::Result;
use crate::wallet::address_events::{AddressBook, AddressChange, AddressKind};

/// Events a page can dispatch.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "detail")]
pub enum PageRequest {
    SigningRequest(Value),
    #[serde(rename = "GetFCTAddresses")]
    GetFctAddresses,
    #[serde(rename = "GetECAddresses")]
    GetEcAddresses,
}

/// Reply to an address request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AddressReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Value>>,
}

/// Events delivered back to pages.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "detail")]
pub enum PageEvent {
    SigningResponse(Value),
    #[serde(rename = "FCTAddresses")]
    FctAddresses(AddressReply),
    #[serde(rename = "ECAddresses")]
    EcAddresses(AddressReply),
    #[serde(rename = "FCTAddressesChanged")]
    FctAddressesChanged(AddressChange),
    #[serde(rename = "ECAddressesChanged")]
    EcAddressesChanged(AddressChange),
}

/// Forwards page events to the broker on behalf of one origin at a time.
#[derive(Clone)]
pub struct ContentRelay {
    broker: BrokerHandle,
    addresses: Arc<AddressBook>,
}

impl ContentRelay {
    pub fn new(broker: BrokerHandle, addresses: Arc<AddressBook>) -> Self {
        ContentRelay { broker, addresses }
    }

    /// Handles one page event from `origin`. Waits for the user when the
    /// event needs a decision.
    pub async fn handle(&self, request: PageRequest, origin: &str) -> Result<PageEvent> {
        match request {
            PageRequest::SigningRequest(detail) => {
                let reply = self
                    .broker
                    .dispatch(json!({
                        "type": "ReceiveSigningRequest",
                        "content": detail,
                        "origin": origin,
                    }))
                    .await?;
                Ok(PageEvent::SigningResponse(reply))
            }
            PageRequest::GetFctAddresses => self.addresses_for(AddressKind::Fct, origin).await,
            PageRequest::GetEcAddresses => self.addresses_for(AddressKind::Ec, origin).await,
        }
    }

    async fn addresses_for(&self, kind: AddressKind, origin: &str) -> Result<PageEvent> {
        let reply = self
            .broker
            .dispatch(json!({
                "type": "ReceiveApprovalRequest",
                "requestType": kind.approval_kind(),
                "from": origin,
            }))
            .await?;

        let success = reply.get("success").and_then(Value::as_bool) == Some(true);
        let answer = AddressReply {
            success,
            addresses: success.then(|| self.addresses.addresses(kind)),
        };
        Ok(match kind {
            AddressKind::Fct => PageEvent::FctAddresses(answer),
            AddressKind::Ec => PageEvent::EcAddresses(answer),
        })
    }

    /// Records a change to stored addresses and returns the event pages
    /// should see, if anything changed.
    pub fn storage_changed(&self, kind: AddressKind, addresses: Vec<Value>) -> Option<PageEvent> {
        let change = self.addresses.replace(kind, addresses)?;
        Some(match kind {
            AddressKind::Fct => PageEvent::FctAddressesChanged(change),
            AddressKind::Ec => PageEvent::EcAddressesChanged(change),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::badge::{LogBadge, LogNotifier};
    use crate::broker::{spawn, SigningBroker};

    fn relay() -> ContentRelay {
        let broker = spawn(SigningBroker::new(Box::new(LogBadge), Box::new(LogNotifier)), 8);
        ContentRelay::new(broker, Arc::new(AddressBook::new()))
    }

    #[tokio::test]
    async fn test_invalid_signing_request_fails_fast() {
        let event = relay()
            .handle(
                PageRequest::SigningRequest(json!({"requestId": 4, "requestType": "data"})),
                "https://dapp.example",
            )
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({"event": "SigningResponse", "detail": {"success": false, "requestId": 4}})
        );
    }

    #[tokio::test]
    async fn test_addresses_after_approval() {
        let relay = relay();
        relay.storage_changed(AddressKind::Fct, vec![json!({"address": "FA1"})]);

        let asking = {
            let relay = relay.clone();
            tokio::spawn(async move { relay.handle(PageRequest::GetFctAddresses, "https://dapp.example").await })
        };

        loop {
            let count = relay
                .broker
                .dispatch(json!({"type": "ApprovalRequestsCount"}))
                .await
                .unwrap();
            if count["approvalRequestsCount"] == json!(1) {
                break;
            }
            tokio::task::yield_now().await;
        }
        relay
            .broker
            .dispatch(json!({"type": "SendApprovalRequestResponse", "success": true}))
            .await
            .unwrap();

        let event = asking.await.unwrap().unwrap();
        assert_eq!(
            event,
            PageEvent::FctAddresses(AddressReply {
                success: true,
                addresses: Some(vec![json!({"address": "FA1"})]),
            })
        );
    }

    #[test]
    fn test_page_request_wire_names() {
        let request: PageRequest = serde_json::from_value(json!({"event": "GetECAddresses"})).unwrap();
        assert_eq!(request, PageRequest::GetEcAddresses);
    }

    #[tokio::test]
    async fn test_storage_change_event() {
        let relay = relay();
        let event = relay.storage_changed(AddressKind::Ec, vec![json!("EC1")]).unwrap();
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({"event": "ECAddressesChanged", "detail": {"added": ["EC1"]}})
        );
        assert!(relay.storage_changed(AddressKind::Ec, vec![json!("EC1")]).is_none());
    }
}
