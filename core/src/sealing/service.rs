/*
 * service.rs
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

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::unsealer::SealedAttribute;
use crate::keys::{DeviceKeyManager, DeviceKeyManagerError, SymmetricKeyEncryptionAlgorithm};

/// Symmetric sealing of payloads under a stored key.
pub trait SealingService: Send + Sync {
    fn seal_string(&self, key_id: &str, payload: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError>;
    fn unseal_string(&self, key_id: &str, payload: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError>;

    /// Seal `value` into the persisted attribute shape.
    fn seal_attribute(
        &self,
        key_id: &str,
        plain_text_type: &str,
        value: &str,
    ) -> Result<SealedAttribute, DeviceKeyManagerError> {
        let sealed = self.seal_string(key_id, value.as_bytes())?;
        Ok(SealedAttribute {
            algorithm: SymmetricKeyEncryptionAlgorithm::AesCbcPkcs7Padding.to_string(),
            key_id: key_id.to_string(),
            plain_text_type: plain_text_type.to_string(),
            base64_encoded_sealed_data: BASE64.encode(sealed),
        })
    }
}

pub struct DefaultSealingService {
    key_manager: Arc<dyn DeviceKeyManager>,
}

impl DefaultSealingService {
    pub fn new(key_manager: Arc<dyn DeviceKeyManager>) -> Self {
        Self { key_manager }
    }
}

impl SealingService for DefaultSealingService {
    fn seal_string(&self, key_id: &str, payload: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError> {
        self.key_manager
            .encrypt_with_symmetric_key_id(key_id, payload)
            .map_err(|e| match e {
                DeviceKeyManagerError::Encryption(_) => e,
                other => DeviceKeyManagerError::Encryption(other.to_string()),
            })
    }

    fn unseal_string(&self, key_id: &str, payload: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError> {
        self.key_manager
            .decrypt_with_symmetric_key_id(key_id, payload)
            .map_err(|e| match e {
                DeviceKeyManagerError::Decryption(_) => e,
                other => DeviceKeyManagerError::Decryption(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{DefaultDeviceKeyManager, MemorySecureStore};
    use crate::sealing::unsealer::{KeyInfo, KeyType, Unsealer};

    fn setup() -> (Arc<dyn DeviceKeyManager>, DefaultSealingService, String) {
        let km: Arc<dyn DeviceKeyManager> =
            Arc::new(DefaultDeviceKeyManager::new(MemorySecureStore::new(), "eml"));
        let key_id = km.generate_new_current_symmetric_key().unwrap();
        (km.clone(), DefaultSealingService::new(km), key_id)
    }

    #[test]
    fn seal_unseal_round_trip() {
        let (_, sealing, key_id) = setup();
        for payload in [&b""[..], &b"x"[..], &[0u8; 100][..]] {
            let sealed = sealing.seal_string(&key_id, payload).unwrap();
            assert_eq!(sealing.unseal_string(&key_id, &sealed).unwrap(), payload);
        }
    }

    #[test]
    fn failures_map_to_encryption_and_decryption() {
        let (_, sealing, key_id) = setup();
        assert!(matches!(
            sealing.seal_string("missing", b"x"),
            Err(DeviceKeyManagerError::Encryption(_))
        ));
        assert!(matches!(
            sealing.unseal_string(&key_id, b"short"),
            Err(DeviceKeyManagerError::Decryption(_))
        ));
    }

    #[test]
    fn sealed_attribute_unseals() {
        let (km, sealing, key_id) = setup();
        let attribute = sealing.seal_attribute(&key_id, "string", "Bob").unwrap();
        assert_eq!(attribute.algorithm, "AES/CBC/PKCS7Padding");
        let unsealer = Unsealer::new(km, KeyInfo::new(&key_id, KeyType::SymmetricKey, &attribute.algorithm));
        assert_eq!(unsealer.unseal_attribute(&attribute).unwrap(), "Bob");
    }
}
