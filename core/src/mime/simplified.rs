/*
 * simplified.rs
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

//! Reduce a parsed part tree to a [`SimplifiedEmailMessage`].
//!
//! Viewable parts (text and the header blocks of embedded messages) are collected in document
//! order and joined into a single body. Everything else becomes an attachment; whether it is
//! inline is decided by the body's `cid:` references as much as by Content-Disposition, which
//! senders set unreliably.

use crate::message::{EmailAttachment, EncryptionStatus, SimplifiedEmailMessage};
use crate::mime::address::split_address_list;
use crate::mime::builder::{PLATFORM_ENCRYPTION, SECURE_EMAIL_HEADER};
use crate::mime::error::MimeError;
use crate::mime::part::{AttachmentPart, Headers, MimePart, MultipartContainer, TextPart};
use crate::mime::rfc2047::decode_encoded_words;
use crate::mime::tree::parse_message;
use crate::mime::utils::escape_html;

/// Header fields shown in the block rendered for an embedded message.
const NESTED_HEADER_FIELDS: [&str; 5] = ["From", "To", "Cc", "Date", "Subject"];

enum Viewable<'a> {
    Text(&'a TextPart),
    MessageHeader(&'a Headers),
}

/// Parse RFC 822 bytes into display-ready fields.
pub fn parse_internet_message_data(raw: &[u8]) -> Result<SimplifiedEmailMessage, MimeError> {
    let message = parse_message(raw)?;
    let headers = &message.headers;

    let mut viewables = Vec::new();
    let mut parts = Vec::new();
    collect(&message.body, &mut viewables, &mut parts);

    let is_html = viewables.iter().any(|v| match v {
        Viewable::Text(t) => t.is_html(),
        Viewable::MessageHeader(_) => true,
    });
    let body = if is_html {
        html_body(&viewables)
    } else {
        viewables
            .iter()
            .filter_map(|v| match v {
                Viewable::Text(t) => Some(t.text.as_str()),
                Viewable::MessageHeader(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut attachments = Vec::new();
    let mut inline_attachments = Vec::new();
    for part in parts {
        let referenced = part
            .content_id
            .as_deref()
            .is_some_and(|cid| body.contains(&format!("cid:{}", cid)));
        let inline = part.disposition_inline || referenced;
        let attachment = EmailAttachment::new(
            part.file_name.clone().unwrap_or_default(),
            part.content_id.clone().unwrap_or_default(),
            part.mime_type.clone(),
            inline,
            part.data.clone(),
        );
        if inline {
            inline_attachments.push(attachment);
        } else {
            attachments.push(attachment);
        }
    }

    let encryption_status = match headers.get(SECURE_EMAIL_HEADER) {
        Some(v) if v.trim().eq_ignore_ascii_case(PLATFORM_ENCRYPTION) => EncryptionStatus::Encrypted,
        _ => EncryptionStatus::Unencrypted,
    };

    Ok(SimplifiedEmailMessage {
        from: addresses(headers, "From"),
        to: addresses(headers, "To"),
        cc: addresses(headers, "Cc"),
        bcc: addresses(headers, "Bcc"),
        subject: headers.get("Subject").map(decode_encoded_words),
        body,
        is_html,
        attachments,
        inline_attachments,
        encryption_status,
        replying_message_id: non_empty(headers.get("In-Reply-To")),
        forwarding_message_id: non_empty(headers.get("References")),
    })
}

fn collect<'a>(
    part: &'a MimePart,
    viewables: &mut Vec<Viewable<'a>>,
    attachments: &mut Vec<&'a AttachmentPart>,
) {
    match part {
        MimePart::Text(text) => viewables.push(Viewable::Text(text)),
        MimePart::Attachment(attachment) => attachments.push(attachment),
        MimePart::Message(nested) => {
            viewables.push(Viewable::MessageHeader(&nested.headers));
            collect(&nested.body, viewables, attachments);
        }
        MimePart::Multipart(container) if container.is_alternative() => {
            if let Some(chosen) = choose_alternative(container) {
                collect(chosen, viewables, attachments);
            }
        }
        MimePart::Multipart(container) => {
            for child in &container.parts {
                collect(child, viewables, attachments);
            }
        }
    }
}

/// Last-declared alternative that is or contains HTML; otherwise the last alternative.
fn choose_alternative(container: &MultipartContainer) -> Option<&MimePart> {
    container
        .parts
        .iter()
        .rev()
        .find(|p| p.contains_html())
        .or_else(|| container.parts.last())
}

fn html_body(viewables: &[Viewable<'_>]) -> String {
    if let [Viewable::Text(only)] = viewables {
        if only.is_html() {
            return only.text.clone();
        }
    }
    let fragments: Vec<String> = viewables
        .iter()
        .map(|v| match v {
            Viewable::Text(t) if t.is_html() => html_inner_body(&t.text).to_string(),
            Viewable::Text(t) => format!(
                "<div>{}</div>",
                escape_html(&t.text).replace('\n', "<br>\n")
            ),
            Viewable::MessageHeader(headers) => message_header_block(headers),
        })
        .collect();
    format!("<html><body>\n{}\n</body></html>", fragments.join("\n"))
}

/// Content between `<body ...>` and `</body>`, or the whole document when there is no body tag.
fn html_inner_body(html: &str) -> &str {
    let lower = html.to_ascii_lowercase();
    let start = match lower.find("<body") {
        Some(open) => match lower[open..].find('>') {
            Some(close) => open + close + 1,
            None => return html,
        },
        None => return html,
    };
    let end = lower[start..]
        .find("</body>")
        .map(|i| start + i)
        .unwrap_or(html.len());
    &html[start..end]
}

fn message_header_block(headers: &Headers) -> String {
    let mut block = String::from("<div class=\"message-header\">");
    for name in NESTED_HEADER_FIELDS {
        if let Some(value) = headers.get(name) {
            block.push_str(&format!(
                "<b>{}:</b> {}<br>\n",
                name,
                escape_html(&decode_encoded_words(value))
            ));
        }
    }
    block.push_str("</div>");
    block
}

fn addresses(headers: &Headers, name: &str) -> Vec<String> {
    headers.get_all(name).flat_map(split_address_list).collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::OutgoingMessage;
    use crate::mime::builder::encode_to_internet_message_data;

    #[test]
    fn plain_round_trip() {
        let message = OutgoingMessage {
            from: vec!["alice@example.com".to_string()],
            to: vec!["bob@example.com".to_string(), "carol@example.com".to_string()],
            subject: Some("Grüße aus Köln".to_string()),
            body: Some("Hello Bob,\nsee you.".to_string()),
            ..OutgoingMessage::default()
        };
        let raw = encode_to_internet_message_data(&message).unwrap();
        let parsed = parse_internet_message_data(&raw).unwrap();
        assert_eq!(parsed.from, message.from);
        assert_eq!(parsed.to, message.to);
        assert_eq!(parsed.subject, message.subject);
        assert_eq!(parsed.body, "Hello Bob,\nsee you.");
        assert!(!parsed.is_html);
        assert_eq!(parsed.encryption_status, EncryptionStatus::Unencrypted);
    }

    #[test]
    fn html_with_inline_image_round_trip() {
        let logo = EmailAttachment::new("logo.png", "logo", "image/png", true, vec![0x89, b'P', b'N', b'G', 0, 1, 2]);
        let report = EmailAttachment::new("report.pdf", "", "application/pdf", false, b"%PDF-1.4".to_vec());
        let message = OutgoingMessage {
            from: vec!["\"Doe, Jöhn\" <john@example.com>".to_string()],
            to: vec!["bob@example.com".to_string()],
            subject: Some("Logo".to_string()),
            body: Some("<p>Our logo: <img src=\"cid:logo\"></p>".to_string()),
            is_html: true,
            attachments: vec![report],
            inline_attachments: vec![logo.clone()],
            ..OutgoingMessage::default()
        };
        let raw = encode_to_internet_message_data(&message).unwrap();
        let parsed = parse_internet_message_data(&raw).unwrap();

        assert!(parsed.is_html);
        assert!(parsed.body.contains("<img src=\"cid:logo\">"));
        assert_eq!(parsed.from, message.from);
        assert_eq!(parsed.to, message.to);
        assert_eq!(parsed.inline_attachments.len(), 1);
        let inline = &parsed.inline_attachments[0];
        assert_eq!(inline.content_id, "logo");
        assert_eq!(inline.file_name, "logo.png");
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, logo.data);
        assert_eq!(parsed.attachments.len(), 1);
        assert_eq!(parsed.attachments[0].file_name, "report.pdf");
        assert_eq!(parsed.attachments[0].data, b"%PDF-1.4");
    }

    #[test]
    fn cid_reference_makes_attachment_inline() {
        let raw = b"From: a@example.com\r\nContent-Type: multipart/mixed; boundary=b\r\n\r\n--b\r\nContent-Type: text/html\r\n\r\n<p><img src=\"cid:pic1\"></p>\r\n--b\r\nContent-Type: image/gif\r\nContent-Disposition: attachment; filename=pic.gif\r\nContent-ID: <pic1>\r\nContent-Transfer-Encoding: base64\r\n\r\nR0lG\r\n--b\r\nContent-Type: application/pdf; name=doc.pdf\r\nContent-Transfer-Encoding: base64\r\n\r\nJVBERg==\r\n--b--\r\n";
        let parsed = parse_internet_message_data(raw).unwrap();
        assert!(parsed.is_html);
        assert_eq!(parsed.body, "<p><img src=\"cid:pic1\"></p>");
        assert_eq!(parsed.inline_attachments.len(), 1);
        assert_eq!(parsed.inline_attachments[0].file_name, "pic.gif");
        assert!(parsed.inline_attachments[0].inline_attachment);
        assert_eq!(parsed.attachments.len(), 1);
        assert_eq!(parsed.attachments[0].file_name, "doc.pdf");
        assert_eq!(parsed.attachments[0].data, b"%PDF");
    }

    #[test]
    fn alternative_prefers_html() {
        let raw = b"Content-Type: multipart/alternative; boundary=alt\r\n\r\n--alt\r\nContent-Type: text/plain\r\n\r\nplain version\r\n--alt\r\nContent-Type: text/html\r\n\r\n<b>html version</b>\r\n--alt--\r\n";
        let parsed = parse_internet_message_data(raw).unwrap();
        assert!(parsed.is_html);
        assert_eq!(parsed.body, "<b>html version</b>");
    }

    #[test]
    fn alternative_without_html_takes_last() {
        let raw = b"Content-Type: multipart/alternative; boundary=alt\r\n\r\n--alt\r\nContent-Type: text/plain\r\n\r\nfirst\r\n--alt\r\nContent-Type: text/plain\r\n\r\nsecond\r\n--alt--\r\n";
        let parsed = parse_internet_message_data(raw).unwrap();
        assert!(!parsed.is_html);
        assert_eq!(parsed.body, "second");
    }

    #[test]
    fn nested_message_wraps_body_in_html() {
        let raw = b"Subject: fwd\r\nContent-Type: multipart/mixed; boundary=m\r\n\r\n--m\r\nContent-Type: text/plain\r\n\r\nsee <below>\r\n--m\r\nContent-Type: message/rfc822\r\n\r\nFrom: x@example.com\r\nSubject: original\r\n\r\noriginal body\r\n--m--\r\n";
        let parsed = parse_internet_message_data(raw).unwrap();
        assert!(parsed.is_html);
        assert!(parsed.body.starts_with("<html><body>"));
        assert!(parsed.body.contains("<div>see &lt;below&gt;</div>"));
        assert!(parsed.body.contains("<b>Subject:</b> original<br>"));
        assert!(parsed.body.contains("<div>original body</div>"));
    }

    #[test]
    fn reads_encryption_marker() {
        let raw = b"From: a@example.com\r\nX-Sudoplatform-Encryption: sudoplatform\r\n\r\nEncrypted message attached";
        let parsed = parse_internet_message_data(raw).unwrap();
        assert_eq!(parsed.encryption_status, EncryptionStatus::Encrypted);
    }
}
