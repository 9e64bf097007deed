// src/broker/validator.rs
//! Validation of inbound signing requests.
//!
//! Pages send free-form JSON; this module is the only place that turns it
//! into a typed [`SigningRequest`]. Anything that fails here is answered
//! immediately with `{success: false, requestId}` and never reaches the
//! queue.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::request::{
    DataRequest, KeyType, PegnetRequest, PegnetTxType, RequestInfo, SigningRequest,
};

static DID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("^did:factom:[a-f0-9]{64}$").expect("should compile"));

/// Prefix of public Factoid addresses.
pub const FCT_PREFIX: &str = "FA";
/// Prefix of public Entry Credit addresses.
pub const EC_PREFIX: &str = "EC";

/// The rule a request broke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing requestId")]
    MissingRequestId,
    #[error("unknown requestType")]
    UnknownRequestType,
    #[error("missing requestInfo")]
    MissingRequestInfo,
    #[error("missing data")]
    MissingData,
    #[error("unknown keyType")]
    UnknownKeyType,
    #[error("keyIdentifier must start with {0}")]
    KeyIdentifierPrefix(&'static str),
    #[error("keyIdentifier must be a string")]
    InvalidKeyIdentifier,
    #[error("did is required for DID keys")]
    MissingDid,
    #[error("did is not allowed for address keys")]
    DidNotAllowed,
    #[error("malformed did")]
    InvalidDid,
    #[error("unknown txType")]
    UnknownTxType,
    #[error("inputAddress must be an FCT address")]
    InvalidInputAddress,
    #[error("inputAmount must be a positive number")]
    InvalidInputAmount,
    #[error("missing inputAsset")]
    MissingInputAsset,
    #[error("missing outputAsset")]
    MissingOutputAsset,
    #[error("outputAddress must be an FCT address")]
    InvalidOutputAddress,
}

/// Returns true when `content` is a well-formed signing request.
pub fn validate(content: &Value) -> bool {
    parse(content, None).is_ok()
}

/// Returns true when `did` is a syntactically valid Factom DID.
pub fn is_valid_did(did: &str) -> bool {
    DID_REGEX.is_match(did)
}

/// Validates `content` and builds the typed request.
///
/// # Arguments
/// * `content` - Raw `{requestId, requestType, requestInfo}` payload
/// * `origin` - Origin of the sending page, if the relay supplied one
pub fn parse(content: &Value, origin: Option<String>) -> Result<SigningRequest, ValidationError> {
    let request_id = match content.get("requestId") {
        Some(id) if !id.is_null() => id.clone(),
        _ => return Err(ValidationError::MissingRequestId),
    };

    let info = content
        .get("requestInfo")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingRequestInfo)?;

    let info = match content.get("requestType").and_then(Value::as_str) {
        Some("data") => RequestInfo::Data(parse_data(info)?),
        Some("pegnet") => RequestInfo::Pegnet(parse_pegnet(info)?),
        _ => return Err(ValidationError::UnknownRequestType),
    };

    Ok(SigningRequest {
        request_id,
        info,
        origin,
        received_at: Utc::now(),
    })
}

fn optional_str<'a>(
    info: &'a Map<String, Value>,
    field: &str,
    err: ValidationError,
) -> Result<Option<&'a str>, ValidationError> {
    match info.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(err),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

fn parse_data(info: &Map<String, Value>) -> Result<DataRequest, ValidationError> {
    let data = match info.get("data") {
        Some(data) if !data.is_null() => data.clone(),
        _ => return Err(ValidationError::MissingData),
    };

    let key_type = info
        .get("keyType")
        .and_then(Value::as_str)
        .and_then(KeyType::from_wire)
        .ok_or(ValidationError::UnknownKeyType)?;

    let key_identifier = optional_str(info, "keyIdentifier", ValidationError::InvalidKeyIdentifier)?;
    let did = optional_str(info, "did", ValidationError::InvalidDid)?;

    if let Some(identifier) = key_identifier {
        match key_type {
            KeyType::Fct if !identifier.starts_with(FCT_PREFIX) => {
                return Err(ValidationError::KeyIdentifierPrefix(FCT_PREFIX))
            }
            KeyType::Ec if !identifier.starts_with(EC_PREFIX) => {
                return Err(ValidationError::KeyIdentifierPrefix(EC_PREFIX))
            }
            _ if key_type.is_did_scoped() && did.is_none() => {
                return Err(ValidationError::MissingDid)
            }
            _ => {}
        }
    }

    if let Some(did) = did {
        if key_type.is_address() {
            return Err(ValidationError::DidNotAllowed);
        }
        if !is_valid_did(did) {
            return Err(ValidationError::InvalidDid);
        }
    }

    Ok(DataRequest {
        data,
        key_type,
        key_identifier: key_identifier.map(str::to_string),
        did: did.map(str::to_string),
    })
}

fn parse_pegnet(info: &Map<String, Value>) -> Result<PegnetRequest, ValidationError> {
    let tx_type = info
        .get("txType")
        .and_then(Value::as_str)
        .and_then(PegnetTxType::from_wire)
        .ok_or(ValidationError::UnknownTxType)?;

    let input_address = info
        .get("inputAddress")
        .and_then(Value::as_str)
        .filter(|a| a.starts_with(FCT_PREFIX))
        .ok_or(ValidationError::InvalidInputAddress)?;

    let input_amount = info
        .get("inputAmount")
        .and_then(Value::as_f64)
        .filter(|amount| *amount > 0.0)
        .ok_or(ValidationError::InvalidInputAmount)?;

    let input_asset = non_empty(info.get("inputAsset").and_then(Value::as_str));
    if input_asset.is_none() && tx_type != PegnetTxType::Burn {
        return Err(ValidationError::MissingInputAsset);
    }

    let output_asset = non_empty(info.get("outputAsset").and_then(Value::as_str));
    if output_asset.is_none() && tx_type == PegnetTxType::Conversion {
        return Err(ValidationError::MissingOutputAsset);
    }

    let output_address = info
        .get("outputAddress")
        .and_then(Value::as_str)
        .map(str::to_string);
    if tx_type == PegnetTxType::Transfer
        && !output_address
            .as_deref()
            .is_some_and(|a| a.starts_with(FCT_PREFIX))
    {
        return Err(ValidationError::InvalidOutputAddress);
    }

    Ok(PegnetRequest {
        tx_type,
        input_address: input_address.to_string(),
        input_amount,
        input_asset,
        output_asset,
        output_address,
    })
}
