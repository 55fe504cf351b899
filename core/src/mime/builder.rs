/*
 * builder.rs
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

//! Build RFC 822 / MIME bytes from an [`OutgoingMessage`].
//!
//! Layout: a `multipart/mixed` root whose first part is the body. When the message has inline
//! attachments the body and those attachments share a `multipart/related` container; file
//! attachments follow as top-level parts.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;

use crate::message::{EmailAttachment, EncryptionStatus, OutgoingMessage};
use crate::mime::address::format_address_list;
use crate::mime::content_disposition::ContentDisposition;
use crate::mime::content_id::ContentID;
use crate::mime::content_type::{parse_content_type, ContentType};
use crate::mime::error::MimeError;
use crate::mime::quoted_printable;
use crate::mime::rfc2047::encode_header_value;
use crate::mime::utils::generate_boundary;

/// Visible body of an end-to-end encrypted message; the real content travels in secure parts.
pub const ENCRYPTED_PLACEHOLDER_BODY: &str = "Encrypted message attached";
/// Marks a message whose content is carried in secure attachments.
pub const SECURE_EMAIL_HEADER: &str = "X-Sudoplatform-Encryption";
pub const PLATFORM_ENCRYPTION: &str = "sudoplatform";

const MESSAGE_ID_DOMAIN: &str = "sudomail.local";
const BASE64_LINE_LEN: usize = 76;
const FOLD_THRESHOLD: usize = 78;

/// Encode a message to RFC 822 bytes.
pub fn encode_to_internet_message_data(message: &OutgoingMessage) -> Result<Vec<u8>, MimeError> {
    let mut out = Vec::new();
    let encrypted = message.encryption_status == EncryptionStatus::Encrypted;

    append_address_header(&mut out, "From", &message.from)?;
    append_address_header(&mut out, "To", &message.to)?;
    append_address_header(&mut out, "Cc", &message.cc)?;
    append_address_header(&mut out, "Bcc", &message.bcc)?;
    if let Some(subject) = message.subject.as_deref().filter(|s| !s.is_empty()) {
        append_header(&mut out, "Subject", &encode_header_value(subject))?;
    }
    append_header(&mut out, "Date", &Utc::now().to_rfc2822())?;
    append_header(
        &mut out,
        "Message-ID",
        &ContentID::new(format!("{}@{}", uuid::Uuid::new_v4(), MESSAGE_ID_DOMAIN)).to_string(),
    )?;
    append_header(&mut out, "MIME-Version", "1.0")?;
    if let Some(id) = message.replying_message_id.as_deref() {
        append_header(&mut out, "In-Reply-To", &format_message_id(id))?;
    }
    if let Some(id) = message.forwarding_message_id.as_deref() {
        append_header(&mut out, "References", &format_message_id(id))?;
    }
    if encrypted {
        append_header(&mut out, SECURE_EMAIL_HEADER, PLATFORM_ENCRYPTION)?;
    }

    let mixed = generate_boundary("mixed");
    append_multipart_header(&mut out, "mixed", &mixed)?;
    out.extend_from_slice(b"\r\n");

    let (body, is_html) = if encrypted {
        (ENCRYPTED_PLACEHOLDER_BODY, false)
    } else {
        (message.body.as_deref().unwrap_or(""), message.is_html)
    };

    open_part(&mut out, &mixed);
    if message.inline_attachments.is_empty() {
        append_text_part(&mut out, body, is_html)?;
    } else {
        let related = generate_boundary("related");
        append_multipart_header(&mut out, "related", &related)?;
        out.extend_from_slice(b"\r\n");
        open_part(&mut out, &related);
        append_text_part(&mut out, body, is_html)?;
        for attachment in &message.inline_attachments {
            open_part(&mut out, &related);
            append_attachment_part(&mut out, attachment, true)?;
        }
        close_multipart(&mut out, &related);
    }
    for attachment in &message.attachments {
        open_part(&mut out, &mixed);
        append_attachment_part(&mut out, attachment, false)?;
    }
    close_multipart(&mut out, &mixed);
    Ok(out)
}

/// `<id>` form for In-Reply-To / References.
pub fn format_message_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with('<') && id.ends_with('>') {
        id.to_string()
    } else {
        ContentID::new(id).to_string()
    }
}

fn append_header(out: &mut Vec<u8>, name: &str, value: &str) -> Result<(), MimeError> {
    if value.contains(['\r', '\n']) {
        return Err(MimeError::InvalidHeaderValue(name.to_string()));
    }
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(b"\r\n");
    Ok(())
}

fn append_address_header(out: &mut Vec<u8>, name: &str, addrs: &[String]) -> Result<(), MimeError> {
    if addrs.is_empty() {
        return Ok(());
    }
    if addrs.iter().any(|a| a.contains(['\r', '\n'])) {
        return Err(MimeError::InvalidHeaderValue(name.to_string()));
    }
    let value = format_address_list(addrs);
    if name.len() + 2 + value.len() <= FOLD_THRESHOLD {
        return append_header(out, name, &value);
    }
    // Fold long lists after each separator.
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value.replace(", ", ",\r\n\t").as_bytes());
    out.extend_from_slice(b"\r\n");
    Ok(())
}

fn append_multipart_header(out: &mut Vec<u8>, sub_type: &str, boundary: &str) -> Result<(), MimeError> {
    let ct = ContentType::new("multipart", sub_type, None).with_parameter("boundary", boundary);
    append_header(out, "Content-Type", &ct.to_string())
}

fn open_part(out: &mut Vec<u8>, boundary: &str) {
    out.extend_from_slice(b"--");
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(b"\r\n");
}

fn close_multipart(out: &mut Vec<u8>, boundary: &str) {
    out.extend_from_slice(b"--");
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(b"--\r\n");
}

fn append_text_part(out: &mut Vec<u8>, body: &str, is_html: bool) -> Result<(), MimeError> {
    let sub_type = if is_html { "html" } else { "plain" };
    let ct = ContentType::new("text", sub_type, None).with_parameter("charset", "UTF-8");
    append_header(out, "Content-Type", &ct.to_string())?;
    append_header(out, "Content-Transfer-Encoding", "quoted-printable")?;
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(quoted_printable::encode(body.as_bytes()).as_bytes());
    out.extend_from_slice(b"\r\n");
    Ok(())
}

fn append_attachment_part(
    out: &mut Vec<u8>,
    attachment: &EmailAttachment,
    inline: bool,
) -> Result<(), MimeError> {
    let file_name = encode_header_value(&attachment.file_name);
    let mut ct = parse_content_type(&attachment.mime_type)
        .unwrap_or_else(|| ContentType::new("application", "octet-stream", None));
    if !file_name.is_empty() {
        ct = ct.with_parameter("name", file_name.as_str());
    }
    append_header(out, "Content-Type", &ct.to_string())?;
    append_header(out, "Content-Transfer-Encoding", "base64")?;
    let disposition = match (inline, file_name.is_empty()) {
        (true, false) => ContentDisposition::inline(&file_name),
        (false, false) => ContentDisposition::attachment(&file_name),
        (true, true) => ContentDisposition::new("inline", None),
        (false, true) => ContentDisposition::new("attachment", None),
    };
    append_header(out, "Content-Disposition", &disposition.to_string())?;
    if !attachment.content_id.is_empty() {
        append_header(out, "Content-ID", &ContentID::new(attachment.content_id.as_str()).to_string())?;
    }
    out.extend_from_slice(b"\r\n");
    let encoded = BASE64.encode(&attachment.data);
    let lines: Vec<&[u8]> = encoded.as_bytes().chunks(BASE64_LINE_LEN).collect();
    out.extend_from_slice(&lines.join(&b"\r\n"[..]));
    out.extend_from_slice(b"\r\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::part::MimePart;
    use crate::mime::tree::parse_message;

    fn text_message() -> OutgoingMessage {
        OutgoingMessage {
            from: vec!["alice@example.com".to_string()],
            to: vec!["bob@example.com".to_string()],
            subject: Some("Lunch".to_string()),
            body: Some("See you at noon".to_string()),
            ..OutgoingMessage::default()
        }
    }

    #[test]
    fn writes_threading_headers() {
        let mut message = text_message();
        message.replying_message_id = Some("orig@example.com".to_string());
        message.forwarding_message_id = Some("<fwd@example.com>".to_string());
        let raw = encode_to_internet_message_data(&message).unwrap();
        let parsed = parse_message(&raw).unwrap();
        assert_eq!(parsed.headers.get("In-Reply-To"), Some("<orig@example.com>"));
        assert_eq!(parsed.headers.get("References"), Some("<fwd@example.com>"));
        assert_eq!(parsed.headers.get("MIME-Version"), Some("1.0"));
        assert!(parsed.headers.get(SECURE_EMAIL_HEADER).is_none());
    }

    #[test]
    fn encrypted_status_replaces_body_and_marks_header() {
        let mut message = text_message();
        message.encryption_status = EncryptionStatus::Encrypted;
        let raw = encode_to_internet_message_data(&message).unwrap();
        let text = String::from_utf8_lossy(&raw);
        assert!(text.contains("X-Sudoplatform-Encryption: sudoplatform\r\n"));
        assert!(text.contains(ENCRYPTED_PLACEHOLDER_BODY));
        assert!(!text.contains("See you at noon"));
    }

    #[test]
    fn inline_attachments_share_related_container() {
        let mut message = text_message();
        message.is_html = true;
        message.body = Some("<img src=\"cid:logo.png\">".to_string());
        message.inline_attachments = vec![EmailAttachment::new(
            "logo.png", "logo.png", "image/png", true, vec![1, 2, 3],
        )];
        message.attachments = vec![EmailAttachment::new(
            "a.txt", "", "text/plain", false, b"abc".to_vec(),
        )];
        let raw = encode_to_internet_message_data(&message).unwrap();
        let parsed = parse_message(&raw).unwrap();
        let parts = match parsed.body {
            MimePart::Multipart(m) => m.parts,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            MimePart::Multipart(related) => {
                assert_eq!(related.sub_type, "related");
                assert_eq!(related.parts.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &parts[1] {
            MimePart::Attachment(a) => {
                assert_eq!(a.file_name.as_deref(), Some("a.txt"));
                assert_eq!(a.data, b"abc");
                assert!(!a.disposition_inline);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_header_injection() {
        let mut message = text_message();
        message.subject = Some("hi\r\nBcc: eve@example.com".to_string());
        assert!(matches!(
            encode_to_internet_message_data(&message),
            Err(MimeError::InvalidHeaderValue(_))
        ));
    }
}
