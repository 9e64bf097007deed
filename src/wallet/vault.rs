// src/wallet/vault.rs
//! Backup files for the encrypted vault.
//!
//! The cipher itself is opaque to the wallet core and is supplied through
//! [`VaultCipher`]; this module only fixes the JSON shape of a backup file
//! and checks that a file was produced with the expected algorithm.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::utils::serialization::{deserialize, serialize};

/// Algorithm name written into every backup file.
pub const ENCRYPTION_ALGORITHM: &str = "AES-GCM";
/// Authentication tag length, in bits.
pub const TAG_LENGTH: u32 = 128;

/// Output of a [`VaultCipher`], all fields base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
}

/// Password-based encryption of vault contents.
pub trait VaultCipher {
    fn encrypt(&self, password: &str, plaintext: &[u8]) -> Result<EncryptedPayload>;

    /// Returns [`WalletError::InvalidPassword`] when `password` does not
    /// open `payload`.
    fn decrypt(&self, password: &str, payload: &EncryptedPayload) -> Result<Vec<u8>>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionAlgo {
    pub name: String,
    pub iv: String,
    pub salt: String,
    pub tag_length: u32,
}

/// A downloadable vault backup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub data: String,
    pub encryption_algo: EncryptionAlgo,
    /// DID the backup belongs to, for single-DID backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
}

impl BackupFile {
    /// Encrypts `contents` into a backup file.
    pub fn create(
        cipher: &dyn VaultCipher,
        password: &str,
        contents: &[u8],
        did: Option<String>,
    ) -> Result<Self> {
        let payload = cipher.encrypt(password, contents)?;
        Ok(BackupFile {
            data: payload.ciphertext,
            encryption_algo: EncryptionAlgo {
                name: ENCRYPTION_ALGORITHM.to_string(),
                iv: payload.iv,
                salt: payload.salt,
                tag_length: TAG_LENGTH,
            },
            did,
        })
    }

    /// Decrypts the backup's contents.
    pub fn restore(&self, cipher: &dyn VaultCipher, password: &str) -> Result<Vec<u8>> {
        let algo = &self.encryption_algo;
        if algo.name != ENCRYPTION_ALGORITHM || algo.tag_length != TAG_LENGTH {
            return Err(WalletError::Vault(format!(
                "unsupported backup encryption {} ({} bit tag)",
                algo.name, algo.tag_length
            )));
        }

        cipher.decrypt(
            password,
            &EncryptedPayload {
                ciphertext: self.data.clone(),
                iv: algo.iv.clone(),
                salt: algo.salt.clone(),
            },
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serialize(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(deserialize(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Reversible stand-in cipher keyed by the password.
    struct XorCipher;

    impl VaultCipher for XorCipher {
        fn encrypt(&self, password: &str, plaintext: &[u8]) -> Result<EncryptedPayload> {
            let key = password.as_bytes();
            let mut bytes: Vec<u8> = plaintext
                .iter()
                .enumerate()
                .map(|(i, b)| b ^ key[i % key.len()])
                .collect();
            bytes.extend_from_slice(&crate::utils::crypto::hash_data(key)[..4]);
            Ok(EncryptedPayload {
                ciphertext: base64::encode(bytes),
                iv: base64::encode([1u8; 12]),
                salt: base64::encode([2u8; 32]),
            })
        }

        fn decrypt(&self, password: &str, payload: &EncryptedPayload) -> Result<Vec<u8>> {
            let key = password.as_bytes();
            let bytes = base64::decode(&payload.ciphertext).map_err(|e| WalletError::Vault(e.to_string()))?;
            let (body, tag) = bytes.split_at(bytes.len() - 4);
            if tag != &crate::utils::crypto::hash_data(key)[..4] {
                return Err(WalletError::InvalidPassword);
            }
            Ok(body.iter().enumerate().map(|(i, b)| b ^ key[i % key.len()]).collect())
        }
    }

    #[test]
    fn test_backup_file_shape() {
        let backup = BackupFile::create(&XorCipher, "pw", b"{\"keys\":[]}", Some("did:factom:ab".into())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&backup.to_json().unwrap()).unwrap();

        assert_eq!(value["encryptionAlgo"]["name"], json!("AES-GCM"));
        assert_eq!(value["encryptionAlgo"]["tagLength"], json!(128));
        assert_eq!(value["did"], json!("did:factom:ab"));
        assert!(value["data"].is_string());
    }

    #[test]
    fn test_restore_checks_password_and_algorithm() {
        let backup = BackupFile::create(&XorCipher, "pw", b"vault", None).unwrap();
        let restored = BackupFile::from_json(&backup.to_json().unwrap()).unwrap();
        assert_eq!(restored.restore(&XorCipher, "pw").unwrap(), b"vault".to_vec());
        assert!(matches!(restored.restore(&XorCipher, "nope"), Err(WalletError::InvalidPassword)));

        let mut other = restored.clone();
        other.encryption_algo.name = "AES-CBC".into();
        assert!(matches!(other.restore(&XorCipher, "pw"), Err(WalletError::Vault(_))));
    }
}
