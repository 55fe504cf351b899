/*
 * crypto_service.rs
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

//! Build and open secure packages: the message is encrypted once under a random AES key and
//! that key is wrapped separately for each recipient public key.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::{debug, warn};
use thiserror::Error;
use zeroize::Zeroizing;

use super::package::{
    SealedKey, SecureData, SecurePackage, BODY_CONTENT_ID, BODY_FILE_NAME, BODY_MIME_TYPE,
    KEY_EXCHANGE_CONTENT_ID, KEY_EXCHANGE_FILE_NAME, KEY_EXCHANGE_MIME_TYPE, SEALED_KEY_ALGORITHM,
};
use crate::keys::{DeviceKeyManager, PublicKeyEncryptionAlgorithm, IV_SIZE};
use crate::message::{EmailAddressPublicInfo, EmailAttachment};

#[derive(Error, Debug)]
pub enum EmailCryptoServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no private key on this device matches the message")]
    KeyNotFound,

    #[error("secure data encryption failed: {0}")]
    SecureDataEncryption(String),

    #[error("secure data decryption failed: {0}")]
    SecureDataDecryption(String),

    #[error("secure data could not be parsed: {0}")]
    SecureDataParsing(String),
}

pub struct EmailCryptoService {
    key_manager: Arc<dyn DeviceKeyManager>,
}

impl EmailCryptoService {
    pub fn new(key_manager: Arc<dyn DeviceKeyManager>) -> Self {
        Self { key_manager }
    }

    /// Encrypt `data` for every recipient key. Duplicate key ids get one key exchange part.
    pub fn encrypt(
        &self,
        data: &[u8],
        recipients: &[EmailAddressPublicInfo],
    ) -> Result<SecurePackage, EmailCryptoServiceError> {
        if data.is_empty() {
            return Err(EmailCryptoServiceError::InvalidArgument("data is empty".to_string()));
        }
        if recipients.is_empty() {
            return Err(EmailCryptoServiceError::InvalidArgument("no recipient keys".to_string()));
        }
        let encryption = |e: crate::keys::DeviceKeyManagerError| {
            EmailCryptoServiceError::SecureDataEncryption(e.to_string())
        };

        let key = self.key_manager.generate_random_symmetric_key().map_err(encryption)?;
        let iv = self.key_manager.create_random_data(IV_SIZE).map_err(encryption)?;
        let encrypted = self
            .key_manager
            .encrypt_with_symmetric_key(&key, data, Some(iv.as_slice()))
            .map_err(encryption)?;
        let secure_data = SecureData {
            encrypted_data: BASE64.encode(encrypted),
            init_vector_key_id: BASE64.encode(&iv),
        };
        let body_attachment = EmailAttachment::new(
            BODY_FILE_NAME,
            BODY_CONTENT_ID,
            BODY_MIME_TYPE,
            false,
            to_json(&secure_data)?,
        );

        let mut seen = HashSet::new();
        let mut key_attachments = Vec::new();
        for recipient in recipients {
            if !seen.insert(recipient.key_id.as_str()) {
                continue;
            }
            let wrapped = self
                .key_manager
                .encrypt_with_public_key(
                    recipient.public_key.as_bytes(),
                    &key,
                    PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1,
                )
                .map_err(encryption)?;
            let sealed_key = SealedKey {
                public_key_id: recipient.key_id.clone(),
                encrypted_key: BASE64.encode(wrapped),
                algorithm: SEALED_KEY_ALGORITHM.to_string(),
            };
            key_attachments.push(EmailAttachment::new(
                format!("{} {}", KEY_EXCHANGE_FILE_NAME, key_attachments.len() + 1),
                KEY_EXCHANGE_CONTENT_ID,
                KEY_EXCHANGE_MIME_TYPE,
                false,
                to_json(&sealed_key)?,
            ));
        }
        debug!("secure package built for {} recipient keys", key_attachments.len());
        Ok(SecurePackage {
            key_attachments,
            body_attachment,
        })
    }

    /// Decrypt a package with the first listed key whose private half is on this device.
    pub fn decrypt(&self, package: &SecurePackage) -> Result<Vec<u8>, EmailCryptoServiceError> {
        if package.body_attachment.data.is_empty() {
            return Err(EmailCryptoServiceError::InvalidArgument("body attachment is empty".to_string()));
        }
        if package.key_attachments.is_empty() {
            return Err(EmailCryptoServiceError::InvalidArgument("no key attachments".to_string()));
        }

        let mut candidates = Vec::new();
        for attachment in &package.key_attachments {
            let sealed_key: SealedKey = serde_json::from_slice(&attachment.data)
                .map_err(|e| EmailCryptoServiceError::SecureDataParsing(e.to_string()))?;
            let present = self
                .key_manager
                .private_key_exists(&sealed_key.public_key_id)
                .map_err(|e| EmailCryptoServiceError::SecureDataDecryption(e.to_string()))?;
            if present {
                candidates.push(sealed_key);
            }
        }
        if candidates.is_empty() {
            return Err(EmailCryptoServiceError::KeyNotFound);
        }

        let mut last_error = None;
        let mut content_key = None;
        for candidate in &candidates {
            match self.unwrap_key(candidate) {
                Ok(key) => {
                    content_key = Some(key);
                    break;
                }
                Err(e) => {
                    warn!("key {} could not unwrap the content key: {}", candidate.public_key_id, e);
                    last_error = Some(e);
                }
            }
        }
        let content_key = match (content_key, last_error) {
            (Some(key), _) => key,
            (None, Some(e)) => return Err(e),
            (None, None) => return Err(EmailCryptoServiceError::KeyNotFound),
        };

        let secure_data: SecureData = serde_json::from_slice(&package.body_attachment.data)
            .map_err(|e| EmailCryptoServiceError::SecureDataParsing(e.to_string()))?;
        let iv = decode_base64(&secure_data.init_vector_key_id)?;
        let encrypted = decode_base64(&secure_data.encrypted_data)?;
        self.key_manager
            .decrypt_with_symmetric_key(&content_key, &encrypted, Some(iv.as_slice()))
            .map_err(|e| EmailCryptoServiceError::SecureDataDecryption(e.to_string()))
    }

    fn unwrap_key(&self, sealed_key: &SealedKey) -> Result<Zeroizing<Vec<u8>>, EmailCryptoServiceError> {
        let algorithm = PublicKeyEncryptionAlgorithm::from_str(&sealed_key.algorithm).map_err(|_| {
            EmailCryptoServiceError::SecureDataDecryption(format!(
                "unsupported key algorithm {}",
                sealed_key.algorithm
            ))
        })?;
        let wrapped = decode_base64(&sealed_key.encrypted_key)?;
        self.key_manager
            .decrypt_with_key_pair_id(&sealed_key.public_key_id, &wrapped, algorithm)
            .map(Zeroizing::new)
            .map_err(|e| EmailCryptoServiceError::SecureDataDecryption(e.to_string()))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, EmailCryptoServiceError> {
    serde_json::to_vec(value).map_err(|e| EmailCryptoServiceError::SecureDataEncryption(e.to_string()))
}

fn decode_base64(value: &str) -> Result<Vec<u8>, EmailCryptoServiceError> {
    BASE64
        .decode(value.trim())
        .map_err(|e| EmailCryptoServiceError::SecureDataParsing(e.to_string()))
}
