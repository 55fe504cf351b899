/*
 * processor.rs
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

//! Outgoing and incoming message data processing, including secure package wrapping.

use std::sync::Arc;

use log::debug;
use percent_encoding::percent_decode_str;

use crate::keys::DeviceKeyManager;
use crate::message::{EmailAddressPublicInfo, EncryptionStatus, OutgoingMessage, SimplifiedEmailMessage};
use crate::mime::builder::encode_to_internet_message_data;
use crate::mime::error::MimeError;
use crate::mime::simplified::parse_internet_message_data;
use crate::secure::{EmailCryptoService, SecurePackage};

pub struct EmailMessageDataProcessor {
    crypto: EmailCryptoService,
}

impl EmailMessageDataProcessor {
    pub fn new(key_manager: Arc<dyn DeviceKeyManager>) -> Self {
        Self {
            crypto: EmailCryptoService::new(key_manager),
        }
    }

    pub fn encode_to_internet_message_data(&self, message: &OutgoingMessage) -> Result<Vec<u8>, MimeError> {
        encode_to_internet_message_data(message)
    }

    pub fn parse_internet_message_data(&self, raw: &[u8]) -> Result<SimplifiedEmailMessage, MimeError> {
        parse_internet_message_data(raw)
    }

    /// Produce the RFC 822 bytes to send. For an encrypted message the full encoding is sealed
    /// into a secure package for `recipients` and carried as attachments of an outer message
    /// with the same headers and a placeholder body.
    pub fn process_message_data(
        &self,
        message: &OutgoingMessage,
        recipients: &[EmailAddressPublicInfo],
    ) -> Result<Vec<u8>, MimeError> {
        let mut message = message.clone();
        if message.is_html {
            message.body = message.body.as_deref().map(replace_file_uris_with_cids);
        }
        for attachment in &mut message.inline_attachments {
            if attachment.content_id.is_empty() {
                attachment.content_id = attachment.file_name.clone();
            }
        }

        let encrypted = message.encryption_status == EncryptionStatus::Encrypted;
        message.encryption_status = EncryptionStatus::Unencrypted;
        let encoded = encode_to_internet_message_data(&message)?;
        if !encrypted {
            return Ok(encoded);
        }

        let package = self.crypto.encrypt(&encoded, recipients)?;
        debug!(
            "wrapped {} byte message for {} recipient keys",
            encoded.len(),
            package.key_attachments.len()
        );
        let outer = OutgoingMessage {
            body: None,
            is_html: false,
            attachments: package.to_attachments(),
            inline_attachments: Vec::new(),
            encryption_status: EncryptionStatus::Encrypted,
            ..message
        };
        encode_to_internet_message_data(&outer)
    }

    /// Parse received RFC 822 bytes, opening the secure package when the message carries one.
    pub fn parse_and_decrypt(&self, raw: &[u8]) -> Result<SimplifiedEmailMessage, MimeError> {
        let outer = parse_internet_message_data(raw)?;
        if outer.encryption_status != EncryptionStatus::Encrypted {
            return Ok(outer);
        }
        let package = SecurePackage::from_attachments(&outer.attachments);
        let inner = self.crypto.decrypt(&package)?;
        let mut message = parse_internet_message_data(&inner)?;
        message.encryption_status = EncryptionStatus::Encrypted;
        Ok(message)
    }
}

/// Rewrite `src` attributes pointing at `file:` URIs to `cid:<file name>`, so that images
/// composed from local files resolve against inline attachments of the same name.
pub fn replace_file_uris_with_cids(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find("src=") {
        let attr = pos + found + 4;
        // Only a standalone `src` attribute, not `data-src` or `xsrc`.
        if !html[..pos + found].ends_with(|c: char| c.is_ascii_whitespace()) {
            out.push_str(&html[pos..attr]);
            pos = attr;
            continue;
        }
        let quote = html[attr..].chars().next().filter(|c| *c == '"' || *c == '\'');
        let value_start = if quote.is_some() { attr + 1 } else { attr };
        let value_end = match quote {
            Some(q) => html[value_start..].find(q),
            None => html[value_start..].find(|c: char| c.is_whitespace() || c == '>'),
        }
        .map(|i| value_start + i)
        .unwrap_or(html.len());
        let value = &html[value_start..value_end];

        out.push_str(&html[pos..value_start]);
        if value.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:")) {
            let path = percent_decode_str(value).decode_utf8_lossy();
            let name = path
                .rsplit(|c: char| c == '/' || c == '\\')
                .next()
                .unwrap_or_default();
            out.push_str("cid:");
            out.push_str(name);
        } else {
            out.push_str(value);
        }
        pos = value_end;
    }
    out.push_str(&html[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_file_sources() {
        let html = r#"<p><img src="file:///data/user/0/My%20Photo.png" alt="x"><IMG SRC='https://x/y.png'></p>"#;
        assert_eq!(
            replace_file_uris_with_cids(html),
            r#"<p><img src="cid:My Photo.png" alt="x"><IMG SRC='https://x/y.png'></p>"#
        );
        assert_eq!(
            replace_file_uris_with_cids("<img src=file:/tmp/a.gif>"),
            "<img src=cid:a.gif>"
        );
        assert_eq!(replace_file_uris_with_cids("no images"), "no images");
    }

    #[test]
    fn leaves_other_src_attributes_alone() {
        let html = r#"<img data-src="file:///tmp/lazy.png" src="file:///tmp/real.png"><x xsrc=file:/tmp/b.gif>"#;
        assert_eq!(
            replace_file_uris_with_cids(html),
            r#"<img data-src="file:///tmp/lazy.png" src="cid:real.png"><x xsrc=file:/tmp/b.gif>"#
        );
    }
}
