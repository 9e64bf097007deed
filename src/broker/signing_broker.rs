// src/broker/signing_broker.rs
//! The background coordinator for signing and approval requests.
//!
//! `SigningBroker` owns the request queue, the approval arbiter, the badge
//! and the one-shot latch flags. Every message is handled to completion
//! before the next one is looked at, so no state is shared and nothing is
//! locked. Messages either answer at once on their reply channel or park
//! the channel in the queue/arbiter until the user acts on it.

use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::arbiter::ApprovalArbiter;
use super::badge::{Badge, BadgeSink, Notifier};
use super::queue::RequestQueue;
use super::validator;
use super::Responder;

/// Reply sent for message kinds the broker does not know.
pub const INVALID_REQUEST: &str = "Invalid request.";

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Signing request";

/// Messages accepted across the extension boundary, tagged by `type`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum BrokerMessage {
    /// Raw `{requestId, requestType, requestInfo}` from a page.
    ReceiveSigningRequest {
        content: Value,
        #[serde(default)]
        origin: Option<String>,
    },
    PendingSigningRequestsCount,
    GetSigningRequest,
    CancelSigningRequest {
        #[serde(default, rename = "requestId")]
        request_id: Option<Value>,
        #[serde(default)]
        message: Option<String>,
    },
    SkipSigningRequest,
    /// Signature and any other fields to hand back to the page.
    SendSigningRequestResponse {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    ReceiveApprovalRequest {
        #[serde(rename = "requestType")]
        request_type: String,
        from: String,
    },
    ApprovalRequestsCount,
    GetApprovalRequest,
    SendApprovalRequestResponse {
        success: bool,
    },
    RestoreVaultRequest,
    ManageKeysRequest,
    CheckRequests,
    NewTabOpen,
}

/// Flags that route the next opened tab to a specific screen, once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Latches {
    restore_vault: bool,
    manage_keys: bool,
}

/// Process-wide coordinator for pending requests.
pub struct SigningBroker {
    queue: RequestQueue,
    arbiter: ApprovalArbiter,
    badge: Badge,
    notifier: Box<dyn Notifier>,
    notification_title: String,
    latches: Latches,
}

impl SigningBroker {
    /// Creates an empty broker and resets the badge.
    pub fn new(badge: Box<dyn BadgeSink>, notifier: Box<dyn Notifier>) -> Self {
        SigningBroker {
            queue: RequestQueue::new(),
            arbiter: ApprovalArbiter::new(),
            badge: Badge::new(badge),
            notifier,
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            latches: Latches::default(),
        }
    }

    pub fn with_notification_title(mut self, title: impl Into<String>) -> Self {
        self.notification_title = title.into();
        self
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn badge_count(&self) -> usize {
        self.badge.count()
    }

    /// Decodes a raw message and handles it. Unknown or malformed messages
    /// are answered with [`INVALID_REQUEST`].
    pub fn handle_raw(&mut self, raw: Value, reply: Responder) {
        match serde_json::from_value::<BrokerMessage>(raw) {
            Ok(message) => self.handle(message, reply),
            Err(e) => {
                warn!("invalid broker message: {}", e);
                let _ = reply.send(json!(INVALID_REQUEST));
            }
        }
    }

    /// Handles one message. `reply` is answered now, or later for the two
    /// request-receiving kinds.
    pub fn handle(&mut self, message: BrokerMessage, reply: Responder) {
        let answer = match message {
            BrokerMessage::ReceiveSigningRequest { content, origin } => {
                return self.receive_signing_request(content, origin, reply);
            }
            BrokerMessage::ReceiveApprovalRequest { request_type, from } => {
                self.arbiter.request(request_type, from, reply);
                return;
            }
            BrokerMessage::PendingSigningRequestsCount => {
                json!({ "pendingSigningRequestsCount": self.queue.len() })
            }
            BrokerMessage::GetSigningRequest => match self.queue.current() {
                Some(request) => json!({ "success": true, "signingRequest": request }),
                None => json!({ "success": false }),
            },
            BrokerMessage::CancelSigningRequest { request_id, message } => {
                let extra = match message {
                    Some(message) => json!({ "message": message }),
                    None => Value::Null,
                };
                if let Some(request) = self.queue.cancel(request_id.as_ref(), extra) {
                    info!("cancelled signing request {}", request.request_id);
                    self.badge.decrement();
                }
                Value::Null
            }
            BrokerMessage::SkipSigningRequest => {
                self.queue.skip();
                Value::Null
            }
            BrokerMessage::SendSigningRequestResponse { data } => {
                let request_id = data.get("requestId").cloned();
                if let Some(request) = self.queue.resolve(request_id.as_ref(), Value::Object(data)) {
                    info!("resolved signing request {}", request.request_id);
                    self.badge.decrement();
                }
                Value::Null
            }
            BrokerMessage::ApprovalRequestsCount => {
                json!({ "approvalRequestsCount": self.arbiter.len() })
            }
            BrokerMessage::GetApprovalRequest => match self.arbiter.peek() {
                Some(request) => json!({ "success": true, "approvalRequest": request }),
                None => json!({ "success": false }),
            },
            BrokerMessage::SendApprovalRequestResponse { success } => {
                let remaining = self.arbiter.respond(success);
                json!({ "approvalRequestsCount": remaining })
            }
            BrokerMessage::RestoreVaultRequest => {
                self.latches.restore_vault = true;
                Value::Null
            }
            BrokerMessage::ManageKeysRequest => {
                self.latches.manage_keys = true;
                Value::Null
            }
            BrokerMessage::CheckRequests => json!({
                "restoreVaultRequest": self.latches.restore_vault,
                "manageKeysRequest": self.latches.manage_keys,
                "approvalRequests": !self.arbiter.is_empty(),
            }),
            BrokerMessage::NewTabOpen => {
                self.latches = Latches::default();
                Value::Null
            }
        };

        let _ = reply.send(answer);
    }

    fn receive_signing_request(&mut self, content: Value, origin: Option<String>, reply: Responder) {
        match validator::parse(&content, origin) {
            Ok(request) => {
                let message = match &request.origin {
                    Some(origin) => format!("New signing request from {}", origin),
                    None => "New signing request".to_string(),
                };
                self.queue.enqueue(request, reply);
                self.badge.increment();
                self.notifier.notify(&self.notification_title, &message);
            }
            Err(e) => {
                let request_id = content.get("requestId").cloned().unwrap_or(Value::Null);
                warn!("rejected signing request {}: {}", request_id, e);
                let _ = reply.send(json!({ "success": false, "requestId": request_id }));
            }
        }
    }
}
