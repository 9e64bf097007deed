// src/wallet/signing.rs
//! Turns the broker's current signing request into a signed response.
//!
//! This is the UI side of the round trip: pull the current request, find
//! the key it names, sign, and hand the result back. A request naming a key
//! the wallet does not hold is cancelled with a message; a wrong vault
//! password leaves the request pending so the user can try again.

use log::{info, warn};
use serde_json::{json, Map, Value};

use super::key_management::KeySigner;
use crate::broker::{validator, BrokerHandle};
use crate::error::{Result, WalletError};
use crate::models::key::SignatureType;
use crate::models::request::{KeyType, PegnetRequest, PegnetTxType, RequestInfo, SigningRequest};

/// PegNet amounts are integers in units of 1e-8.
const PEGNET_UNITS: f64 = 100_000_000.0;

/// Unlocked key material handed out by a [`KeyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredKey {
    pub signature_type: SignatureType,
    pub public_key: String,
    pub private_key: String,
}

/// Which key to sign with: an address, or an alias inside a DID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySelection {
    pub key_type: KeyType,
    pub did: Option<String>,
    pub identifier: String,
}

/// The wallet's encrypted key vault.
pub trait KeyStore {
    /// Unlocks the vault with `password` and looks up the selected key.
    ///
    /// Returns [`WalletError::InvalidPassword`] when the password is wrong
    /// and `Ok(None)` when no such key exists.
    fn find_key(&self, selection: &KeySelection, password: &str) -> Result<Option<StoredKey>>;
}

/// Picks the key for `request`: the one the page named, else `fallback`
/// (the user's choice in the UI).
pub fn select_key(request: &SigningRequest, fallback: Option<KeySelection>) -> Option<KeySelection> {
    match &request.info {
        RequestInfo::Data(data) => match &data.key_identifier {
            Some(identifier) => Some(KeySelection {
                key_type: data.key_type,
                did: data.did.clone(),
                identifier: identifier.clone(),
            }),
            None => fallback,
        },
        RequestInfo::Pegnet(pegnet) => Some(KeySelection {
            key_type: KeyType::Fct,
            did: None,
            identifier: pegnet.input_address.clone(),
        }),
    }
}

fn pegnet_units(amount: f64) -> u64 {
    (amount * PEGNET_UNITS).round() as u64
}

/// Canonical PegNet transaction batch for a request.
pub fn pegnet_transaction(pegnet: &PegnetRequest) -> Value {
    let amount = pegnet_units(pegnet.input_amount);
    let input_asset = pegnet.input_asset.clone().unwrap_or_else(|| "FCT".to_string());

    let mut transaction = Map::new();
    transaction.insert(
        "input".into(),
        json!({ "address": pegnet.input_address, "amount": amount, "type": input_asset }),
    );
    match pegnet.tx_type {
        PegnetTxType::Burn => {
            transaction.insert("conversion".into(), json!("pFCT"));
        }
        PegnetTxType::Conversion => {
            transaction.insert("conversion".into(), json!(pegnet.output_asset));
        }
        PegnetTxType::Transfer => {
            transaction.insert(
                "transfers".into(),
                json!([{ "address": pegnet.output_address, "amount": amount }]),
            );
        }
    }

    json!({ "version": 1, "transactions": [Value::Object(transaction)] })
}

fn data_bytes(data: &Value) -> Vec<u8> {
    match data {
        Value::String(text) => text.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}

/// Signs `request` with `key` and builds the fields returned to the page.
pub fn sign_request(request: &SigningRequest, key: &StoredKey, signer: &dyn KeySigner) -> Result<Value> {
    let (message, mut response) = match &request.info {
        RequestInfo::Data(data) => {
            let mut response = Map::new();
            response.insert("keyType".into(), json!(data.key_type));
            if let Some(identifier) = &data.key_identifier {
                response.insert("keyIdentifier".into(), json!(identifier));
            }
            if let Some(did) = &data.did {
                response.insert("did".into(), json!(did));
            }
            (data_bytes(&data.data), response)
        }
        RequestInfo::Pegnet(pegnet) => {
            let content = pegnet_transaction(pegnet).to_string();
            let mut response = Map::new();
            response.insert("keyType".into(), json!(KeyType::Fct));
            response.insert("txType".into(), json!(pegnet.tx_type));
            response.insert("transaction".into(), json!(content));
            (content.into_bytes(), response)
        }
    };

    let signature = signer.sign(key.signature_type, &key.private_key, &message)?;
    response.insert("publicKey".into(), json!(key.public_key));
    response.insert("signatureType".into(), json!(key.signature_type));
    response.insert("signature".into(), json!(base64::encode(signature)));
    Ok(Value::Object(response))
}

/// Signs the broker's current request and completes it.
///
/// # Returns
/// - `Ok(Some(request_id))` once the request has been answered
/// - `Ok(None)` when nothing is pending
/// - `Err(WalletError::KeyNotFound)` after cancelling a request whose key
///   does not exist
/// - `Err(WalletError::InvalidPassword)` with the request left pending
pub async fn complete_current(
    broker: &BrokerHandle,
    store: &dyn KeyStore,
    signer: &dyn KeySigner,
    password: &str,
    fallback: Option<KeySelection>,
) -> Result<Option<Value>> {
    let reply = broker.dispatch(json!({ "type": "GetSigningRequest" })).await?;
    let Some(raw) = reply.get("signingRequest") else {
        return Ok(None);
    };
    let origin = raw.get("origin").and_then(Value::as_str).map(str::to_string);
    let request = validator::parse(raw, origin)?;
    let request_id = request.request_id.clone();

    let lookup = match select_key(&request, fallback) {
        Some(selection) => store.find_key(&selection, password)?.ok_or(selection),
        None => Err(KeySelection {
            key_type: request.key_type(),
            did: None,
            identifier: String::new(),
        }),
    };

    let key = match lookup {
        Ok(key) => key,
        Err(selection) => {
            let message = format!("Key not found: {}", selection.identifier);
            warn!("cancelling signing request {}: {}", request_id, message);
            broker
                .dispatch(json!({
                    "type": "CancelSigningRequest",
                    "requestId": request_id,
                    "message": message,
                }))
                .await?;
            return Err(WalletError::KeyNotFound(selection.identifier));
        }
    };

    let mut response = sign_request(&request, &key, signer)?;
    if let Value::Object(fields) = &mut response {
        fields.insert("type".into(), json!("SendSigningRequestResponse"));
        fields.insert("requestId".into(), request_id.clone());
    }
    broker.dispatch(response).await?;
    info!("signed request {}", request_id);
    Ok(Some(request_id))
}

/// In-memory key vault guarded by a single password.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    password: String,
    keys: Vec<(KeySelection, StoredKey)>,
}

impl MemoryKeyStore {
    pub fn new(password: impl Into<String>) -> Self {
        MemoryKeyStore {
            password: password.into(),
            keys: Vec::new(),
        }
    }

    pub fn insert(&mut self, selection: KeySelection, key: StoredKey) {
        self.keys.retain(|(existing, _)| existing != &selection);
        self.keys.push((selection, key));
    }
}

impl KeyStore for MemoryKeyStore {
    fn find_key(&self, selection: &KeySelection, password: &str) -> Result<Option<StoredKey>> {
        if password != self.password {
            return Err(WalletError::InvalidPassword);
        }
        Ok(self
            .keys
            .iter()
            .find(|(candidate, _)| candidate == selection)
            .map(|(_, key)| key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::badge::{LogBadge, LogNotifier};
    use crate::broker::{spawn, SigningBroker};
    use crate::wallet::key_management::{KeyManager, KeyPairGenerator};

    const FCT: &str = "FA2jK2HcLnRdS94dEcU27rF3meoJfpUcZPSinpb7AwQvPRY6RL1Q";

    fn store_with_fct() -> (MemoryKeyStore, StoredKey) {
        let pair = KeyManager::new().generate(SignatureType::Ed25519).unwrap();
        let key = StoredKey {
            signature_type: pair.signature_type,
            public_key: pair.public_key,
            private_key: pair.private_key,
        };
        let mut store = MemoryKeyStore::new("hunter2");
        store.insert(
            KeySelection { key_type: KeyType::Fct, did: None, identifier: FCT.into() },
            key.clone(),
        );
        (store, key)
    }

    fn queue_request(broker: &BrokerHandle, content: Value) -> tokio::task::JoinHandle<Result<Value>> {
        let broker = broker.clone();
        tokio::spawn(async move {
            broker
                .dispatch(json!({"type": "ReceiveSigningRequest", "content": content}))
                .await
        })
    }

    async fn wait_for_pending(broker: &BrokerHandle, count: u64) {
        loop {
            let reply = broker
                .dispatch(json!({"type": "PendingSigningRequestsCount"}))
                .await
                .unwrap();
            if reply["pendingSigningRequestsCount"] == json!(count) {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    fn broker() -> BrokerHandle {
        spawn(SigningBroker::new(Box::new(LogBadge), Box::new(LogNotifier)), 8)
    }

    #[tokio::test]
    async fn test_signs_data_request() {
        let (store, key) = store_with_fct();
        let broker = broker();
        let page = queue_request(
            &broker,
            json!({"requestId": 1, "requestType": "data",
                   "requestInfo": {"data": "hello", "keyType": "fct", "keyIdentifier": FCT}}),
        );
        wait_for_pending(&broker, 1).await;

        let done = complete_current(&broker, &store, &KeyManager::new(), "hunter2", None)
            .await
            .unwrap();
        assert_eq!(done, Some(json!(1)));

        let reply = page.await.unwrap().unwrap();
        assert_eq!(reply["success"], json!(true));
        assert_eq!(reply["publicKey"], json!(key.public_key));
        let signature = base64::decode(reply["signature"].as_str().unwrap()).unwrap();
        assert!(KeyManager::new()
            .verify(SignatureType::Ed25519, &key.public_key, b"hello", &signature)
            .unwrap());
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_request() {
        let (store, _key) = store_with_fct();
        let broker = broker();
        let _page = queue_request(
            &broker,
            json!({"requestId": 2, "requestType": "data",
                   "requestInfo": {"data": "hello", "keyType": "fct", "keyIdentifier": FCT}}),
        );
        wait_for_pending(&broker, 1).await;

        let result = complete_current(&broker, &store, &KeyManager::new(), "wrong", None).await;
        assert!(matches!(result, Err(WalletError::InvalidPassword)));
        wait_for_pending(&broker, 1).await;
    }

    #[tokio::test]
    async fn test_unknown_key_cancels_request() {
        let (store, _key) = store_with_fct();
        let broker = broker();
        let page = queue_request(
            &broker,
            json!({"requestId": 3, "requestType": "data",
                   "requestInfo": {"data": "hello", "keyType": "ec",
                                   "keyIdentifier": "EC2DKSYyRcNWf7RS963VFYgMExoHRYLHVeCfQ9PGPmNzwrcmgm2r"}}),
        );
        wait_for_pending(&broker, 1).await;

        let result = complete_current(&broker, &store, &KeyManager::new(), "hunter2", None).await;
        assert!(matches!(result, Err(WalletError::KeyNotFound(_))));

        let reply = page.await.unwrap().unwrap();
        assert_eq!(reply["success"], json!(false));
        assert!(reply["message"].as_str().unwrap().starts_with("Key not found"));
        wait_for_pending(&broker, 0).await;
    }

    #[tokio::test]
    async fn test_nothing_pending() {
        let (store, _key) = store_with_fct();
        let result = complete_current(&broker(), &store, &KeyManager::new(), "hunter2", None).await;
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_pegnet_transaction_shapes() {
        let transfer = PegnetRequest {
            tx_type: PegnetTxType::Transfer,
            input_address: FCT.into(),
            input_amount: 1.5,
            input_asset: Some("PEG".into()),
            output_asset: None,
            output_address: Some("FA3cih2o2tjEUsnnFR4jX1tQXPpSXFwsp3rhVp6odL5PNCHWvZV1".into()),
        };
        assert_eq!(
            pegnet_transaction(&transfer),
            json!({"version": 1, "transactions": [{
                "input": {"address": FCT, "amount": 150_000_000u64, "type": "PEG"},
                "transfers": [{"address": "FA3cih2o2tjEUsnnFR4jX1tQXPpSXFwsp3rhVp6odL5PNCHWvZV1", "amount": 150_000_000u64}]
            }]})
        );

        let burn = PegnetRequest {
            tx_type: PegnetTxType::Burn,
            input_asset: None,
            output_address: None,
            ..transfer
        };
        let tx = pegnet_transaction(&burn);
        assert_eq!(tx["transactions"][0]["input"]["type"], json!("FCT"));
        assert_eq!(tx["transactions"][0]["conversion"], json!("pFCT"));
    }
}
