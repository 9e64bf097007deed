// src/broker/queue.rs
//! Pending signing requests and the cursor the UI walks them with.
//!
//! Each request is stored together with the one-shot channel that answers
//! it, so a request and its responder can only ever be removed together.
//! The cursor decides which request the UI sees; skipping moves the cursor
//! and never reorders or drops entries.

use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::Responder;
use crate::models::request::SigningRequest;
use crate::utils::serialization::merge_into;

/// A queued request and its reply channel.
#[derive(Debug)]
pub struct PendingRequest {
    pub request: SigningRequest,
    responder: Responder,
}

impl PendingRequest {
    fn answer(self, success: bool, data: Value) -> SigningRequest {
        let mut reply = Map::new();
        merge_into(&mut reply, data);
        reply.insert("success".into(), Value::Bool(success));
        reply.insert("requestId".into(), self.request.request_id.clone());

        // The page may have gone away; the request is finished either way.
        if self.responder.send(Value::Object(reply)).is_err() {
            debug!("requester for {} is gone", self.request.request_id);
        }
        self.request
    }
}

/// Ordered queue of signing requests with a presentation cursor.
#[derive(Debug)]
pub struct RequestQueue {
    entries: Vec<PendingRequest>,
    /// Index of the request shown next. May drift out of range after skips
    /// and removals; it is clamped before every dereference.
    cursor: isize,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestQueue {
    pub fn new() -> Self {
        RequestQueue {
            entries: Vec::new(),
            cursor: -1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a request. The newest request becomes the current one.
    pub fn enqueue(&mut self, request: SigningRequest, responder: Responder) {
        info!("queued signing request {}", request.request_id);
        self.entries.push(PendingRequest { request, responder });
        self.cursor = self.entries.len() as isize - 1;
    }

    fn clamp(&mut self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor < 0 || self.cursor >= self.entries.len() as isize {
            self.cursor = self.entries.len() as isize - 1;
        }
        Some(self.cursor as usize)
    }

    /// The request the UI should show, or `None` when nothing is pending.
    pub fn current(&mut self) -> Option<&SigningRequest> {
        let index = self.clamp()?;
        Some(&self.entries[index].request)
    }

    /// Moves the cursor one step towards older requests. Stepping past the
    /// oldest wraps to the newest on the next [`current`](Self::current).
    pub fn skip(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.cursor -= 1;
        debug!("signing cursor moved to {}", self.cursor);
    }

    /// Answers a request with `{...data, success: true, requestId}` and
    /// removes it.
    ///
    /// With `request_id` the request carrying that id is answered, wherever
    /// the cursor is; without it the current request is. An id that matches
    /// nothing answers nothing.
    pub fn resolve(&mut self, request_id: Option<&Value>, data: Value) -> Option<SigningRequest> {
        self.complete(true, request_id, data)
    }

    /// Answers a request with `{...extra, success: false, requestId}` and
    /// removes it. Targets the same request [`resolve`](Self::resolve) would.
    pub fn cancel(&mut self, request_id: Option<&Value>, extra: Value) -> Option<SigningRequest> {
        self.complete(false, request_id, extra)
    }

    fn position(&mut self, request_id: Option<&Value>) -> Option<usize> {
        let Some(id) = request_id else {
            return self.clamp();
        };
        let index = self.entries.iter().position(|entry| &entry.request.request_id == id);
        if index.is_none() {
            warn!("no pending signing request {}", id);
        }
        index
    }

    fn complete(&mut self, success: bool, request_id: Option<&Value>, data: Value) -> Option<SigningRequest> {
        let index = self.position(request_id)?;
        let entry = self.entries.remove(index);
        if self.entries.is_empty() {
            self.cursor = -1;
        } else if (index as isize) < self.cursor {
            // Keep the cursor on the request the UI is showing.
            self.cursor -= 1;
        }
        Some(entry.answer(success, data))
    }
}
