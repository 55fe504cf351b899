/*
 * get.rs
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

use std::str::FromStr;

use log::debug;

use super::error::{interpret_email_message_error, EmailMessageError};
use super::object_store::{message_object_key, ObjectStoreError, ALGORITHM_METADATA, KEY_ID_METADATA};
use super::types::{EmailMessage, EmailMessageWithBody, Rfc822Header, SealedEmailMessage};
use super::EmailMessageService;
use crate::keys::SymmetricKeyEncryptionAlgorithm;
use crate::sealing::{KeyInfo, KeyType, Unsealer, UnsealerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEmailMessageWithBodyInput {
    pub id: String,
    pub email_address_id: String,
}

impl EmailMessageService {
    pub async fn get_email_message(&self, id: &str) -> Result<Option<EmailMessage>, EmailMessageError> {
        let sealed = self
            .api
            .get_email_message(id)
            .await
            .map_err(interpret_email_message_error)?;
        match sealed {
            Some(sealed) => Ok(Some(self.unseal_email_message(&sealed)?)),
            None => Ok(None),
        }
    }

    /// Fetch, unseal and parse a message body. Encrypted messages are decrypted with the first
    /// matching private key on this device.
    pub async fn get_email_message_with_body(
        &self,
        input: &GetEmailMessageWithBodyInput,
    ) -> Result<Option<EmailMessageWithBody>, EmailMessageError> {
        let bucket = &self.config.bucket;
        let key = message_object_key(&input.email_address_id, &input.id);
        let metadata = match self.object_store.get_object_metadata(bucket, &key).await {
            Ok(metadata) => metadata,
            Err(ObjectStoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let key_id = metadata
            .user_metadata
            .get(KEY_ID_METADATA)
            .ok_or_else(|| EmailMessageError::failed(format!("{} has no {} metadata", key, KEY_ID_METADATA)))?;
        let algorithm = metadata
            .user_metadata
            .get(ALGORITHM_METADATA)
            .ok_or_else(|| EmailMessageError::failed(format!("{} has no {} metadata", key, ALGORITHM_METADATA)))?;
        // Bodies are sealed for a key pair unless they name the symmetric algorithm.
        let key_type = if SymmetricKeyEncryptionAlgorithm::from_str(algorithm).is_ok() {
            KeyType::SymmetricKey
        } else {
            KeyType::PrivateKey
        };

        let sealed = self.object_store.download(bucket, &key).await?;
        let unsealer = Unsealer::new(
            self.key_manager.clone(),
            KeyInfo::new(key_id.as_str(), key_type, algorithm.as_str()),
        );
        let rfc822 = unsealer.unseal_raw(&sealed)?;
        let message = self.processor.parse_and_decrypt(&rfc822)?;
        debug!(
            "message {} has {} attachments, {} inline",
            input.id,
            message.attachments.len(),
            message.inline_attachments.len()
        );
        Ok(Some(EmailMessageWithBody {
            id: input.id.clone(),
            body: message.body,
            is_html: message.is_html,
            attachments: message.attachments,
            inline_attachments: message.inline_attachments,
            encryption_status: message.encryption_status,
        }))
    }

    pub(super) fn unseal_email_message(&self, sealed: &SealedEmailMessage) -> Result<EmailMessage, UnsealerError> {
        let attribute = &sealed.rfc822_header;
        let unsealer = Unsealer::new(
            self.key_manager.clone(),
            KeyInfo::new(attribute.key_id.as_str(), KeyType::SymmetricKey, attribute.algorithm.as_str()),
        );
        let json = unsealer.unseal_attribute(attribute)?;
        let header: Rfc822Header =
            serde_json::from_str(&json).map_err(|e| UnsealerError::Decoding(e.to_string()))?;
        Ok(EmailMessage::from_sealed(sealed, header))
    }
}
