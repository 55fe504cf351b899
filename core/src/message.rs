/*
 * message.rs
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

//! Message-level types shared by the MIME processor, the secure package code and the use cases.

use serde::{Deserialize, Serialize};

/// Whether a message body travels end-to-end encrypted inside secure attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionStatus {
    Encrypted,
    #[default]
    Unencrypted,
}

/// A MIME part carried as an attachment: ordinary files, inline images, and the
/// synthetic key-exchange / body parts of a secure package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub file_name: String,
    /// Bare content id, without angle brackets. Empty when the part has none.
    pub content_id: String,
    pub mime_type: String,
    pub inline_attachment: bool,
    pub data: Vec<u8>,
}

impl EmailAttachment {
    pub fn new(
        file_name: impl Into<String>,
        content_id: impl Into<String>,
        mime_type: impl Into<String>,
        inline_attachment: bool,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_id: content_id.into(),
            mime_type: mime_type.into(),
            inline_attachment,
            data,
        }
    }
}

/// Public key information published for an email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddressPublicInfo {
    pub email_address: String,
    pub key_id: String,
    /// SPKI or PKCS#1 RSA public key, PEM or base64 DER.
    pub public_key: String,
}

/// Structured fields of an outgoing message, before RFC 822 encoding.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub attachments: Vec<EmailAttachment>,
    pub inline_attachments: Vec<EmailAttachment>,
    pub is_html: bool,
    pub encryption_status: EncryptionStatus,
    pub replying_message_id: Option<String>,
    pub forwarding_message_id: Option<String>,
}

impl OutgoingMessage {
    /// Every recipient address (to, cc, bcc) in header order.
    pub fn recipients(&self) -> impl Iterator<Item = &String> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }
}

/// Result of parsing an RFC 822 message into display-ready parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimplifiedEmailMessage {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Option<String>,
    pub body: String,
    pub is_html: bool,
    pub attachments: Vec<EmailAttachment>,
    pub inline_attachments: Vec<EmailAttachment>,
    pub encryption_status: EncryptionStatus,
    pub replying_message_id: Option<String>,
    pub forwarding_message_id: Option<String>,
}
