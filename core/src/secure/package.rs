/*
 * package.rs
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

//! Secure package wire convention: key exchange parts plus one shared encrypted body part.

use serde::{Deserialize, Serialize};

use crate::message::EmailAttachment;

pub const KEY_EXCHANGE_FILE_NAME: &str = "Secure Data Key Exchange";
pub const KEY_EXCHANGE_MIME_TYPE: &str = "application/x-sudomail-key";
pub const KEY_EXCHANGE_CONTENT_ID: &str = "securekeyexchangedata@sudomail.com";
/// Misspelt id written by older clients.
pub const LEGACY_KEY_EXCHANGE_CONTENT_ID: &str = "securekeyexhangedata@sudomail.com";

pub const BODY_FILE_NAME: &str = "Secure Email";
pub const BODY_MIME_TYPE: &str = "application/x-sudomail-body";
pub const BODY_CONTENT_ID: &str = "securebody@sudomail.com";
pub const LEGACY_BODY_CONTENT_ID: &str = "sudomailbody@sudomail.com";

/// Algorithm named in every key exchange part.
pub const SEALED_KEY_ALGORITHM: &str = "RSAEncryptionOAEPAESCBC";

/// Content of a key exchange part: the content key wrapped for one recipient key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedKey {
    pub public_key_id: String,
    /// Base64 RSA-OAEP ciphertext of the AES content key.
    pub encrypted_key: String,
    pub algorithm: String,
}

/// Content of the body part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureData {
    #[serde(rename = "encryptedData")]
    pub encrypted_data: String,
    /// Base64 IV. The field name is historical.
    #[serde(rename = "initVectorKeyID")]
    pub init_vector_key_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurePackage {
    /// One per distinct recipient key id.
    pub key_attachments: Vec<EmailAttachment>,
    pub body_attachment: EmailAttachment,
}

pub fn is_key_exchange_content_id(content_id: &str) -> bool {
    content_id == KEY_EXCHANGE_CONTENT_ID || content_id == LEGACY_KEY_EXCHANGE_CONTENT_ID
}

pub fn is_body_content_id(content_id: &str) -> bool {
    content_id == BODY_CONTENT_ID || content_id == LEGACY_BODY_CONTENT_ID
}

impl SecurePackage {
    /// Key parts first, then the body.
    pub fn to_attachments(&self) -> Vec<EmailAttachment> {
        let mut all = self.key_attachments.clone();
        all.push(self.body_attachment.clone());
        all
    }

    /// Pick the secure parts out of a received message's attachments. A missing body part
    /// yields an empty one, which decryption rejects.
    pub fn from_attachments<'a>(attachments: impl IntoIterator<Item = &'a EmailAttachment>) -> Self {
        let mut key_attachments = Vec::new();
        let mut body_attachment = None;
        for attachment in attachments {
            let cid = attachment.content_id.as_str();
            if is_key_exchange_content_id(cid) {
                key_attachments.push(attachment.clone());
            } else if is_body_content_id(cid) && body_attachment.is_none() {
                body_attachment = Some(attachment.clone());
            }
        }
        Self {
            key_attachments,
            body_attachment: body_attachment.unwrap_or_else(|| {
                EmailAttachment::new(BODY_FILE_NAME, BODY_CONTENT_ID, BODY_MIME_TYPE, false, Vec::new())
            }),
        }
    }

    /// True if any attachment carries a secure part content id.
    pub fn is_secure_attachment(attachment: &EmailAttachment) -> bool {
        is_key_exchange_content_id(&attachment.content_id) || is_body_content_id(&attachment.content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_legacy_content_ids() {
        let parts = vec![
            EmailAttachment::new("x.txt", "", "text/plain", false, b"x".to_vec()),
            EmailAttachment::new("k", LEGACY_KEY_EXCHANGE_CONTENT_ID, KEY_EXCHANGE_MIME_TYPE, false, b"{}".to_vec()),
            EmailAttachment::new("b", LEGACY_BODY_CONTENT_ID, BODY_MIME_TYPE, false, b"{}".to_vec()),
        ];
        let package = SecurePackage::from_attachments(&parts);
        assert_eq!(package.key_attachments.len(), 1);
        assert_eq!(package.body_attachment.file_name, "b");
        assert_eq!(package.to_attachments().len(), 2);
    }

    #[test]
    fn secure_data_field_names() {
        let data = SecureData {
            encrypted_data: "AA==".to_string(),
            init_vector_key_id: "BB==".to_string(),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"encryptedData":"AA==","initVectorKeyID":"BB=="}"#);
    }
}
