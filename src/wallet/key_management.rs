// src/wallet/key_management.rs
//! Cryptographic key management for the DID wallet.
//!
//! Key generation and signing are reached through traits so the broker and
//! the codecs never depend on a particular curve implementation. The
//! default [`KeyManager`] supports:
//! - Ed25519 (via `ed25519-dalek`), also used by Factoid and Entry Credit addresses
//! - ECDSA over secp256k1 (via `k256`), SHA-256 prehashed
//!
//! Keys travel as base58 strings: raw 32-byte seeds for private keys, raw
//! (Ed25519) or compressed SEC1 (secp256k1) bytes for public keys.

use ed25519_dalek::{Signer as _, Verifier as _};
use k256::ecdsa::signature::{Signer as _, Verifier as _};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;

use crate::error::{Result, WalletError};
use crate::models::key::SignatureType;
use crate::utils::crypto::{from_base58, to_base58};

/// A freshly generated key pair, base58 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub signature_type: SignatureType,
    pub public_key: String,
    pub private_key: String,
}

/// Source of new key pairs.
pub trait KeyPairGenerator {
    fn generate(&self, signature_type: SignatureType) -> Result<KeyPair>;
}

/// Signs and verifies with base58-encoded keys.
pub trait KeySigner {
    fn sign(&self, signature_type: SignatureType, private_key: &str, message: &[u8]) -> Result<Vec<u8>>;

    fn verify(
        &self,
        signature_type: SignatureType,
        public_key: &str,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool>;

    /// Derives the public key belonging to `private_key`.
    fn public_key(&self, signature_type: SignatureType, private_key: &str) -> Result<String>;
}

/// Default key manager backed by the system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyManager;

impl KeyManager {
    pub fn new() -> Self {
        KeyManager
    }
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| WalletError::InvalidKey(format!("{} must be {} bytes, got {}", what, N, bytes.len())))
}

fn unsupported(signature_type: SignatureType) -> WalletError {
    WalletError::UnsupportedSignatureType(signature_type.to_string())
}

fn ed25519_signing_key(private_key: &str) -> Result<ed25519_dalek::SigningKey> {
    let seed = fixed::<32>(&from_base58(private_key)?, "Ed25519 private key")?;
    Ok(ed25519_dalek::SigningKey::from_bytes(&seed))
}

fn secp256k1_signing_key(private_key: &str) -> Result<k256::ecdsa::SigningKey> {
    k256::ecdsa::SigningKey::from_slice(&from_base58(private_key)?)
        .map_err(|e| WalletError::InvalidKey(format!("secp256k1 private key: {}", e)))
}

fn secp256k1_public_key(signing_key: &k256::ecdsa::SigningKey) -> String {
    let public = k256::PublicKey::from(signing_key.verifying_key());
    to_base58(public.to_encoded_point(true).as_bytes())
}

impl KeyPairGenerator for KeyManager {
    fn generate(&self, signature_type: SignatureType) -> Result<KeyPair> {
        let (public_key, private_key) = match signature_type {
            SignatureType::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
                (
                    to_base58(signing_key.verifying_key().as_bytes()),
                    to_base58(&signing_key.to_bytes()),
                )
            }
            SignatureType::EcdsaSecp256k1 => {
                let signing_key = k256::ecdsa::SigningKey::random(&mut OsRng);
                (
                    secp256k1_public_key(&signing_key),
                    to_base58(&signing_key.to_bytes()),
                )
            }
            SignatureType::Rsa => return Err(unsupported(signature_type)),
        };

        Ok(KeyPair {
            signature_type,
            public_key,
            private_key,
        })
    }
}

impl KeySigner for KeyManager {
    fn sign(&self, signature_type: SignatureType, private_key: &str, message: &[u8]) -> Result<Vec<u8>> {
        match signature_type {
            SignatureType::Ed25519 => {
                let signature = ed25519_signing_key(private_key)?.sign(message);
                Ok(signature.to_bytes().to_vec())
            }
            SignatureType::EcdsaSecp256k1 => {
                let signature: k256::ecdsa::Signature = secp256k1_signing_key(private_key)?.sign(message);
                Ok(signature.to_bytes().to_vec())
            }
            SignatureType::Rsa => Err(unsupported(signature_type)),
        }
    }

    fn verify(
        &self,
        signature_type: SignatureType,
        public_key: &str,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let public_key = from_base58(public_key)?;
        match signature_type {
            SignatureType::Ed25519 => {
                let key = ed25519_dalek::VerifyingKey::from_bytes(&fixed::<32>(&public_key, "Ed25519 public key")?)
                    .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
                let signature = ed25519_dalek::Signature::from_bytes(&fixed::<64>(signature, "Ed25519 signature")?);
                Ok(key.verify(message, &signature).is_ok())
            }
            SignatureType::EcdsaSecp256k1 => {
                let key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&public_key)
                    .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
                let Ok(signature) = k256::ecdsa::Signature::from_slice(signature) else {
                    return Ok(false);
                };
                Ok(key.verify(message, &signature).is_ok())
            }
            SignatureType::Rsa => Err(unsupported(signature_type)),
        }
    }

    fn public_key(&self, signature_type: SignatureType, private_key: &str) -> Result<String> {
        match signature_type {
            SignatureType::Ed25519 => Ok(to_base58(ed25519_signing_key(private_key)?.verifying_key().as_bytes())),
            SignatureType::EcdsaSecp256k1 => Ok(secp256k1_public_key(&secp256k1_signing_key(private_key)?)),
            SignatureType::Rsa => Err(unsupported(signature_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sign_verify() {
        let manager = KeyManager::new();
        for signature_type in [SignatureType::Ed25519, SignatureType::EcdsaSecp256k1] {
            let pair = manager.generate(signature_type).unwrap();
            assert_eq!(manager.public_key(signature_type, &pair.private_key).unwrap(), pair.public_key);

            let signature = manager.sign(signature_type, &pair.private_key, b"message").unwrap();
            assert_eq!(signature.len(), 64);
            assert!(manager.verify(signature_type, &pair.public_key, b"message", &signature).unwrap());
            assert!(!manager.verify(signature_type, &pair.public_key, b"tampered", &signature).unwrap());
        }
    }

    #[test]
    fn test_secp256k1_public_key_is_compressed() {
        let pair = KeyManager::new().generate(SignatureType::EcdsaSecp256k1).unwrap();
        let bytes = from_base58(&pair.public_key).unwrap();
        assert_eq!(bytes.len(), 33);
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
    }

    #[test]
    fn test_rsa_is_unsupported() {
        let manager = KeyManager::new();
        assert!(matches!(
            manager.generate(SignatureType::Rsa),
            Err(WalletError::UnsupportedSignatureType(_))
        ));
        assert!(matches!(
            manager.sign(SignatureType::Rsa, "abc", b"m"),
            Err(WalletError::UnsupportedSignatureType(_))
        ));
    }

    #[test]
    fn test_bad_key_length() {
        let short = to_base58(&[1u8; 16]);
        assert!(matches!(
            KeyManager::new().sign(SignatureType::Ed25519, &short, b"m"),
            Err(WalletError::InvalidKey(_))
        ));
    }
}
