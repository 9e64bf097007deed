pub mod api_server;
pub mod content_relay;
