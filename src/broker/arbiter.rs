// src/broker/arbiter.rs
//! One-shot domain approval prompts.
//!
//! Pages ask for capabilities such as reading the wallet's FCT addresses.
//! Only one prompt per `(kind, origin)` is kept: a newer request replaces
//! the older one, and the replaced requester is told `{success: false}`.

use log::{info, warn};
use serde_json::json;

use super::Responder;
use crate::models::request::ApprovalRequest;

#[derive(Debug)]
struct PendingApproval {
    request: ApprovalRequest,
    responder: Responder,
}

/// Stack of pending approval prompts, newest last.
#[derive(Debug, Default)]
pub struct ApprovalArbiter {
    pending: Vec<PendingApproval>,
}

impl ApprovalArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Registers a prompt, superseding any pending one for the same
    /// capability and origin.
    pub fn request(&mut self, kind: String, origin: String, responder: Responder) {
        if let Some(index) = self
            .pending
            .iter()
            .position(|p| p.request.request_type == kind && p.request.from == origin)
        {
            let evicted = self.pending.remove(index);
            warn!("approval request for {} from {} superseded", kind, origin);
            let _ = evicted.responder.send(json!({ "success": false }));
        }

        info!("approval request for {} from {}", kind, origin);
        self.pending.push(PendingApproval {
            request: ApprovalRequest {
                request_type: kind,
                from: origin,
            },
            responder,
        });
    }

    /// The most recent prompt, if any.
    pub fn peek(&self) -> Option<&ApprovalRequest> {
        self.pending.last().map(|p| &p.request)
    }

    /// Answers the most recent prompt and returns how many remain.
    pub fn respond(&mut self, approved: bool) -> usize {
        if let Some(entry) = self.pending.pop() {
            info!(
                "approval for {} from {}: {}",
                entry.request.request_type, entry.request.from, approved
            );
            let _ = entry.responder.send(json!({ "success": approved }));
        }
        self.pending.len()
    }
}
