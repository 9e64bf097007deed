// src/services/api_server.rs
//! HTTP boundary of the wallet's background process.
//!
//! The extension's views post broker messages to `/message`; content scripts
//! post page events to `/page/event` with the page's `Origin` header; the
//! storage layer reports new address lists to `/storage/addresses`.
//!
//! Requests that need the user (signing and approval) hold the HTTP
//! connection open until the user acts.

use axum::{
    extract::{Json, State},
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::broker::BrokerHandle;
use crate::services::content_relay::{ContentRelay, PageRequest};
use crate::wallet::address_events::AddressKind;

/// Origin recorded for page events that arrive without an `Origin` header.
const UNKNOWN_ORIGIN: &str = "unknown";

/// Origin of the calling page, as reported by the `Origin` header.
fn page_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Request payload for `/storage/addresses`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressesUpdate {
    kind: AddressListKind,
    addresses: Vec<Value>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum AddressListKind {
    Fct,
    Ec,
}

impl From<AddressListKind> for AddressKind {
    fn from(kind: AddressListKind) -> Self {
        match kind {
            AddressListKind::Fct => AddressKind::Fct,
            AddressListKind::Ec => AddressKind::Ec,
        }
    }
}

/// API server state shared by all handlers
#[derive(Clone)]
pub struct ApiServer {
    /// Inbox of the signing broker
    broker: BrokerHandle,

    /// Relay for page-facing events
    relay: ContentRelay,
}

impl ApiServer {
    pub fn new(broker: BrokerHandle, relay: ContentRelay) -> Self {
        ApiServer { broker, relay }
    }

    /// Builds the router with every endpoint attached.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/message", post(Self::message_handler))
            .route("/page/event", post(Self::page_event_handler))
            .route("/storage/addresses", post(Self::addresses_handler))
            .route("/health", get(Self::health_handler))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and serves until the listener fails.
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3030")
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, app).await
    }

    /// Forwards a broker message and returns its reply.
    ///
    /// # Endpoint
    /// POST /message
    ///
    /// A signing request's `origin` is taken from the `Origin` header, never
    /// from the body.
    ///
    /// # Responses
    /// - 200 OK: The broker's reply (including `"Invalid request."`)
    /// - 503 Service Unavailable: The broker task has stopped
    async fn message_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(mut message): Json<Value>,
    ) -> impl IntoResponse {
        let is_signing_request =
            message.get("type").and_then(Value::as_str) == Some("ReceiveSigningRequest");
        if let (true, Value::Object(fields)) = (is_signing_request, &mut message) {
            if fields.remove("origin").is_some() {
                debug!("ignoring origin supplied in message body");
            }
            if let Some(origin) = page_origin(&headers) {
                fields.insert("origin".into(), Value::String(origin));
            }
        }

        match state.broker.dispatch(message).await {
            Ok(reply) => (StatusCode::OK, Json(reply)),
            Err(e) => {
                warn!("message dropped: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": e.to_string() })))
            }
        }
    }

    /// Relays a page event on behalf of the requesting origin.
    ///
    /// # Endpoint
    /// POST /page/event
    ///
    /// # Responses
    /// - 200 OK: The page event to deliver back (e.g. `SigningResponse`)
    /// - 503 Service Unavailable: The broker task has stopped
    async fn page_event_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(request): Json<PageRequest>,
    ) -> impl IntoResponse {
        let origin = page_origin(&headers).unwrap_or_else(|| UNKNOWN_ORIGIN.to_string());

        match state.relay.handle(request, &origin).await {
            Ok(event) => (StatusCode::OK, Json(json!(event))),
            Err(e) => {
                warn!("page event from {} dropped: {}", origin, e);
                (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": e.to_string() })))
            }
        }
    }

    /// Records a new address list.
    ///
    /// # Endpoint
    /// POST /storage/addresses
    ///
    /// # Responses
    /// - 200 OK: The change event, or `null` when nothing changed
    async fn addresses_handler(
        State(state): State<Arc<ApiServer>>,
        Json(update): Json<AddressesUpdate>,
    ) -> impl IntoResponse {
        let event = state.relay.storage_changed(update.kind.into(), update.addresses);
        (StatusCode::OK, Json(json!(event)))
    }

    /// # Endpoint
    /// GET /health
    async fn health_handler() -> impl IntoResponse {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    }
}
