/*
 * send.rs
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

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, warn};

use super::api::{S3ObjectRef, SendEmailMessageRequest, SendEmailMessageResult};
use super::error::{interpret_email_message_error, EmailMessageError};
use super::object_store::transient_object_key;
use super::types::Rfc822Header;
use super::EmailMessageService;
use crate::message::{EncryptionStatus, OutgoingMessage};
use crate::mime::{extract_address, format_address_list, format_message_id};

#[derive(Debug, Clone)]
pub struct SendEmailMessageInput {
    pub sender_email_address_id: String,
    pub message: OutgoingMessage,
}

impl EmailMessageService {
    /// Send a message. It is end-to-end encrypted when the sender and every recipient have
    /// published keys, plain otherwise.
    pub async fn send_email_message(
        &self,
        input: SendEmailMessageInput,
    ) -> Result<SendEmailMessageResult, EmailMessageError> {
        let mut message = input.message;
        if message.from.is_empty() {
            return Err(EmailMessageError::invalid_argument("message has no sender"));
        }
        if message.recipients().next().is_none() {
            return Err(EmailMessageError::invalid_argument("message has no recipients"));
        }

        let mut addresses: Vec<String> = Vec::new();
        for mailbox in message.from.iter().chain(message.recipients()) {
            let address = extract_address(mailbox).to_lowercase();
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }
        let public_info = self
            .api
            .lookup_email_addresses_public_info(&addresses)
            .await
            .map_err(interpret_email_message_error)?;
        let all_have_keys = addresses.iter().all(|address| {
            public_info
                .iter()
                .any(|info| info.email_address.eq_ignore_ascii_case(address))
        });
        message.encryption_status = if all_have_keys {
            EncryptionStatus::Encrypted
        } else {
            EncryptionStatus::Unencrypted
        };
        debug!(
            "sending {:?} message to {} addresses",
            message.encryption_status,
            addresses.len()
        );

        let rfc822 = self.processor.process_message_data(&message, &public_info)?;
        if rfc822.len() > self.config.message_size_limit {
            return Err(EmailMessageError::message_size_limit_exceeded(format!(
                "{} bytes exceeds the {} byte limit",
                rfc822.len(),
                self.config.message_size_limit
            )));
        }

        let key = transient_object_key(&input.sender_email_address_id);
        let bucket = &self.config.transient_bucket;
        self.object_store
            .upload(bucket, &key, rfc822, HashMap::new())
            .await?;

        let request = SendEmailMessageRequest {
            email_address_id: input.sender_email_address_id,
            message: S3ObjectRef {
                bucket: bucket.clone(),
                key: key.clone(),
                region: self.config.region.clone(),
            },
            encryption_status: message.encryption_status,
            rfc822_header: header_summary(&message),
        };
        let result = self
            .api
            .send_email_message(request)
            .await
            .map_err(interpret_email_message_error);

        // The staged copy is only needed for the duration of the call.
        if let Err(e) = self.object_store.delete(bucket, &key).await {
            warn!("could not delete staged message {}: {}", key, e);
        }
        result
    }
}

fn header_summary(message: &OutgoingMessage) -> Rfc822Header {
    Rfc822Header {
        from: format_address_list(&message.from),
        to: message.to.clone(),
        cc: message.cc.clone(),
        bcc: message.bcc.clone(),
        reply_to: Vec::new(),
        subject: message.subject.clone(),
        has_attachments: !message.attachments.is_empty() || !message.inline_attachments.is_empty(),
        date: Some(Utc::now().to_rfc3339()),
        in_reply_to: message.replying_message_id.as_deref().map(format_message_id),
        references: message.forwarding_message_id.as_deref().map(format_message_id),
    }
}
