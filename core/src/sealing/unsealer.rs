/*
 * unsealer.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Sudomail, a secure email client core.
 *
 * Sudomail is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sudomail is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sudomail.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Envelope codec.
//!
//! Private-key envelope: `RSA-OAEP(aes key)` (256 bytes) followed by
//! `AES-CBC-PKCS7(aes key, zero IV, plaintext)`, base64 encoded as a whole. Symmetric-key
//! payloads are the key manager's `IV || ciphertext` format.

use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::keys::{
    DeviceKeyManager, DeviceKeyManagerError, PublicKeyEncryptionAlgorithm,
    SymmetricKeyEncryptionAlgorithm, KEY_WRAP_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    PrivateKey,
    SymmetricKey,
}

/// Which key, and which algorithm, an unseal uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub key_id: String,
    pub key_type: KeyType,
    pub algorithm: String,
}

impl KeyInfo {
    pub fn new(key_id: impl Into<String>, key_type: KeyType, algorithm: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_type,
            algorithm: algorithm.into(),
        }
    }
}

/// Persisted shape of a sealed scalar, shared with the service schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedAttribute {
    pub algorithm: String,
    pub key_id: String,
    pub plain_text_type: String,
    pub base64_encoded_sealed_data: String,
}

#[derive(Error, Debug)]
pub enum UnsealerError {
    #[error("sealed data could not be decoded: {0}")]
    Decoding(String),

    #[error("sealed data of {0} bytes is too short")]
    SealedDataTooShort(usize),

    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error(transparent)]
    KeyManager(#[from] DeviceKeyManagerError),
}

pub struct Unsealer {
    key_manager: Arc<dyn DeviceKeyManager>,
    key_info: KeyInfo,
}

impl Unsealer {
    pub fn new(key_manager: Arc<dyn DeviceKeyManager>, key_info: KeyInfo) -> Self {
        Self {
            key_manager,
            key_info,
        }
    }

    /// Unseal base64 sealed data to a UTF-8 string.
    pub fn unseal(&self, sealed: &str) -> Result<String, UnsealerError> {
        String::from_utf8(self.unseal_bytes(sealed)?)
            .map_err(|e| UnsealerError::Decoding(e.to_string()))
    }

    pub fn unseal_bytes(&self, sealed: &str) -> Result<Vec<u8>, UnsealerError> {
        let data = BASE64
            .decode(sealed.trim())
            .map_err(|e| UnsealerError::Decoding(e.to_string()))?;
        self.unseal_raw(&data)
    }

    /// Unseal already-decoded bytes.
    pub fn unseal_raw(&self, data: &[u8]) -> Result<Vec<u8>, UnsealerError> {
        let KeyInfo {
            key_id,
            key_type,
            algorithm,
        } = &self.key_info;
        match key_type {
            KeyType::PrivateKey => {
                if data.len() <= KEY_WRAP_SIZE {
                    return Err(UnsealerError::SealedDataTooShort(data.len()));
                }
                let algorithm = PublicKeyEncryptionAlgorithm::from_str(algorithm)
                    .map_err(|_| UnsealerError::UnsupportedAlgorithm(algorithm.clone()))?;
                let (wrapped, ciphertext) = data.split_at(KEY_WRAP_SIZE);
                let key = Zeroizing::new(
                    self.key_manager
                        .decrypt_with_key_pair_id(key_id, wrapped, algorithm)?,
                );
                Ok(self
                    .key_manager
                    .decrypt_with_symmetric_key(&key, ciphertext, None)?)
            }
            KeyType::SymmetricKey => {
                SymmetricKeyEncryptionAlgorithm::from_str(algorithm)
                    .map_err(|_| UnsealerError::UnsupportedAlgorithm(algorithm.clone()))?;
                Ok(self.key_manager.decrypt_with_symmetric_key_id(key_id, data)?)
            }
        }
    }

    /// Unseal a persisted attribute. The attribute names its own symmetric key.
    pub fn unseal_attribute(&self, attribute: &SealedAttribute) -> Result<String, UnsealerError> {
        SymmetricKeyEncryptionAlgorithm::from_str(&attribute.algorithm)
            .map_err(|_| UnsealerError::UnsupportedAlgorithm(attribute.algorithm.clone()))?;
        Unsealer::new(
            self.key_manager.clone(),
            KeyInfo::new(&attribute.key_id, KeyType::SymmetricKey, &attribute.algorithm),
        )
        .unseal(&attribute.base64_encoded_sealed_data)
    }
}

/// Build a base64 private-key envelope for `public_key`, readable by the holder of its private key.
pub fn seal_with_public_key_envelope(
    key_manager: &dyn DeviceKeyManager,
    public_key: &[u8],
    plaintext: &[u8],
) -> Result<String, DeviceKeyManagerError> {
    let key = key_manager.generate_random_symmetric_key()?;
    let mut envelope = key_manager.encrypt_with_public_key(
        public_key,
        &key,
        PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1,
    )?;
    envelope.extend(key_manager.encrypt_with_symmetric_key(&key, plaintext, None)?);
    Ok(BASE64.encode(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{DefaultDeviceKeyManager, MemorySecureStore};

    fn key_manager() -> Arc<dyn DeviceKeyManager> {
        Arc::new(DefaultDeviceKeyManager::new(MemorySecureStore::new(), "eml"))
    }

    #[test]
    fn private_key_envelope_round_trip() {
        let km = key_manager();
        let pair = km.generate_key_pair().unwrap();
        for text in ["", "hello", "ünïcødé text spanning more than one AES block"] {
            let sealed = seal_with_public_key_envelope(km.as_ref(), &pair.public_key, text.as_bytes()).unwrap();
            let unsealer = Unsealer::new(
                km.clone(),
                KeyInfo::new(&pair.key_id, KeyType::PrivateKey, "RSA/ECB/OAEPWithSHA-1AndMGF1Padding"),
            );
            assert_eq!(unsealer.unseal(&sealed).unwrap(), text);
        }
    }

    #[test]
    fn short_envelope_is_rejected() {
        let unsealer = Unsealer::new(
            key_manager(),
            KeyInfo::new("k", KeyType::PrivateKey, "RSA/ECB/OAEPWithSHA-1AndMGF1Padding"),
        );
        for len in [0usize, 16, 255, 256] {
            let sealed = BASE64.encode(vec![7u8; len]);
            assert!(matches!(
                unsealer.unseal(&sealed),
                Err(UnsealerError::SealedDataTooShort(n)) if n == len
            ));
        }
    }

    #[test]
    fn bad_base64_is_a_decoding_error() {
        let unsealer = Unsealer::new(key_manager(), KeyInfo::new("k", KeyType::SymmetricKey, "AES/CBC/PKCS7Padding"));
        assert!(matches!(unsealer.unseal("%%%"), Err(UnsealerError::Decoding(_))));
    }

    #[test]
    fn attribute_with_unknown_algorithm_is_rejected() {
        let km = key_manager();
        let key_id = km.generate_new_current_symmetric_key().unwrap();
        let sealed = BASE64.encode(km.encrypt_with_symmetric_key_id(&key_id, b"Alice").unwrap());
        let unsealer = Unsealer::new(km.clone(), KeyInfo::new(&key_id, KeyType::SymmetricKey, "AES/CBC/PKCS7Padding"));

        let mut attribute = SealedAttribute {
            algorithm: "AES/CBC/PKCS7Padding".to_string(),
            key_id,
            plain_text_type: "string".to_string(),
            base64_encoded_sealed_data: sealed,
        };
        assert_eq!(unsealer.unseal_attribute(&attribute).unwrap(), "Alice");

        attribute.algorithm = "AES/GCM/NoPadding".to_string();
        assert!(matches!(
            unsealer.unseal_attribute(&attribute),
            Err(UnsealerError::UnsupportedAlgorithm(a)) if a == "AES/GCM/NoPadding"
        ));
    }

    #[test]
    fn sealed_attribute_json_shape() {
        let attribute: SealedAttribute = serde_json::from_str(
            r#"{"algorithm":"AES/CBC/PKCS7Padding","keyId":"k1","plainTextType":"string","base64EncodedSealedData":"AAAA"}"#,
        )
        .unwrap();
        assert_eq!(attribute.key_id, "k1");
        let json = serde_json::to_value(&attribute).unwrap();
        assert_eq!(json["base64EncodedSealedData"], "AAAA");
        assert_eq!(json["plainTextType"], "string");
    }
}
