// src/main.rs

//! # DID Wallet - Background Process Entry Point
//!
//! Starts the signing broker and serves the extension boundary over HTTP.
//!
//! ## Architecture Overview
//! 1. **Broker**: `SigningBroker` on its own task, reached through a `BrokerHandle`
//! 2. **Relay**: `ContentRelay` turning page events into broker messages
//! 3. **Transport**: `ApiServer` routes for the wallet UI and content scripts
//!
//! ## Environment Variables
//! - `WALLET_LISTEN_ADDR`: (Optional) bind address (default: 127.0.0.1:3030)
//! - `WALLET_INBOX_CAPACITY`: (Optional) broker inbox size (default: 64)
//! - `WALLET_NOTIFICATION_TITLE`: (Optional) title of request notifications
//! - `RUST_LOG`: (Optional) log filter (default: info)

use anyhow::Context;
use did_wallet::broker::badge::{LogBadge, LogNotifier};
use did_wallet::broker::{spawn, SigningBroker};
use did_wallet::config::WalletConfig;
use did_wallet::services::api_server::ApiServer;
use did_wallet::services::content_relay::ContentRelay;
use did_wallet::wallet::address_events::AddressBook;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WalletConfig::load().context("Failed to load wallet configuration")?;

    let broker = SigningBroker::new(Box::new(LogBadge), Box::new(LogNotifier))
        .with_notification_title(config.notification_title.clone());
    let broker = spawn(broker, config.inbox_capacity);

    let relay = ContentRelay::new(broker.clone(), Arc::new(AddressBook::new()));
    let api_server = ApiServer::new(broker, relay);

    info!("Starting wallet background process on {}", config.listen_addr);
    info!("Available endpoints:");
    info!("POST /message           - Broker messages from the wallet UI");
    info!("POST /page/event        - Page events (SigningRequest, GetFCTAddresses, GetECAddresses)");
    info!("POST /storage/addresses - Report a new FCT or EC address list");
    info!("GET  /health            - Liveness check");

    api_server
        .run(config.listen_addr)
        .await
        .context("API server stopped")
}
