// src/config.rs
//! Runtime settings for the wallet's background process.
//!
//! Values are layered: built-in defaults, then an optional `wallet.toml`
//! next to the binary, then `WALLET_*` environment variables (a `.env` file
//! is loaded into the environment by `main` first).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::broker::signing_broker::DEFAULT_NOTIFICATION_TITLE;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";
const DEFAULT_INBOX_CAPACITY: i64 = 64;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WalletConfig {
    /// Address the HTTP boundary binds to
    pub listen_addr: SocketAddr,
    /// Broker inbox size before senders wait
    pub inbox_capacity: usize,
    /// Title of desktop notifications for new signing requests
    pub notification_title: String,
}

impl WalletConfig {
    /// Loads settings from defaults, `wallet.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name("wallet").required(false))
            .add_source(Environment::with_prefix("WALLET").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("listen_addr", DEFAULT_LISTEN_ADDR)?
        .set_default("inbox_capacity", DEFAULT_INBOX_CAPACITY)?
        .set_default("notification_title", DEFAULT_NOTIFICATION_TITLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let config: WalletConfig = defaults().unwrap().build().unwrap().try_deserialize().unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:3030".parse::<SocketAddr>().unwrap());
        assert_eq!(config.inbox_capacity, 64);
        assert_eq!(config.notification_title, "Signing request");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config: WalletConfig = defaults()
            .unwrap()
            .add_source(File::from_str(
                "listen_addr = \"0.0.0.0:8080\"\ninbox_capacity = 8",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.inbox_capacity, 8);
        assert_eq!(config.notification_title, "Signing request");
    }

    #[test]
    fn test_bad_address_is_an_error() {
        let result = defaults()
            .unwrap()
            .set_override("listen_addr", "not an address")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<WalletConfig>();
        assert!(result.is_err());
    }
}
