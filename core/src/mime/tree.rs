/*
 * tree.rs
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

//! Build a typed [`MimePart`] tree from parser events.

use crate::mime::content_disposition::parse_content_disposition;
use crate::mime::content_id::strip_angle_brackets;
use crate::mime::content_type::{parse_content_type, ContentType};
use crate::mime::handler::{MimeHandler, MimeParseError};
use crate::mime::parser::MimeParser;
use crate::mime::part::{
    AttachmentPart, Headers, MimeMessage, MimePart, MultipartContainer, TextPart,
};
use crate::mime::rfc2047::decode_encoded_words;
use crate::mime::utils::decode_charset;

/// Embedded message/rfc822 parts deeper than this are kept as opaque attachments.
const MAX_NESTED_MESSAGE_DEPTH: usize = 16;

/// Parse raw RFC 822 bytes into a classified part tree.
pub fn parse_message(raw: &[u8]) -> Result<MimeMessage, MimeParseError> {
    parse_message_at_depth(raw, 0)
}

fn parse_message_at_depth(raw: &[u8], depth: usize) -> Result<MimeMessage, MimeParseError> {
    let mut parser = MimeParser::new(TreeBuilder::default());
    parser.receive(raw)?;
    parser.close()?;
    let root = parser
        .into_inner()
        .root
        .ok_or_else(|| MimeParseError::new("message has no content"))?;
    let headers = root.headers.clone();
    Ok(MimeMessage {
        headers,
        body: classify(root, depth),
    })
}

#[derive(Default)]
struct RawEntity {
    headers: Headers,
    content_type: Option<String>,
    content_disposition: Option<String>,
    content_id: Option<String>,
    body: Vec<u8>,
    children: Vec<RawEntity>,
}

/// Handler that assembles entities into a tree of raw entities.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<RawEntity>,
    root: Option<RawEntity>,
}

impl TreeBuilder {
    fn current(&mut self) -> Result<&mut RawEntity, MimeParseError> {
        self.stack
            .last_mut()
            .ok_or_else(|| MimeParseError::new("header outside of an entity"))
    }

    fn record(&mut self, name: &str, value: &str) -> Result<&mut RawEntity, MimeParseError> {
        let entity = self.current()?;
        entity.headers.push(name, value);
        Ok(entity)
    }
}

impl MimeHandler for TreeBuilder {
    fn start_entity(&mut self, _boundary: Option<&str>) -> Result<(), MimeParseError> {
        self.stack.push(RawEntity::default());
        Ok(())
    }

    fn content_type(&mut self, value: &str) -> Result<(), MimeParseError> {
        self.record("Content-Type", value)?.content_type = Some(value.to_string());
        Ok(())
    }

    fn content_disposition(&mut self, value: &str) -> Result<(), MimeParseError> {
        self.record("Content-Disposition", value)?.content_disposition = Some(value.to_string());
        Ok(())
    }

    fn content_transfer_encoding(&mut self, value: &str) -> Result<(), MimeParseError> {
        self.record("Content-Transfer-Encoding", value)?;
        Ok(())
    }

    fn content_id(&mut self, value: &str) -> Result<(), MimeParseError> {
        self.record("Content-ID", value)?.content_id = Some(value.to_string());
        Ok(())
    }

    fn content_description(&mut self, value: &str) -> Result<(), MimeParseError> {
        self.record("Content-Description", value)?;
        Ok(())
    }

    fn mime_version(&mut self, value: &str) -> Result<(), MimeParseError> {
        self.record("MIME-Version", value)?;
        Ok(())
    }

    fn header(&mut self, name: &str, value: &str) -> Result<(), MimeParseError> {
        self.record(name, value)?;
        Ok(())
    }

    fn body_content(&mut self, data: &[u8]) -> Result<(), MimeParseError> {
        self.current()?.body.extend_from_slice(data);
        Ok(())
    }

    fn end_entity(&mut self, _boundary: Option<&str>) -> Result<(), MimeParseError> {
        let entity = self
            .stack
            .pop()
            .ok_or_else(|| MimeParseError::new("unbalanced entity end"))?;
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(entity),
            None => self.root = Some(entity),
        }
        Ok(())
    }
}

fn classify(entity: RawEntity, depth: usize) -> MimePart {
    let content_type = entity
        .content_type
        .as_deref()
        .and_then(parse_content_type)
        .unwrap_or_else(ContentType::default_text);
    let disposition = entity
        .content_disposition
        .as_deref()
        .and_then(parse_content_disposition);
    let attachment_disposition = disposition.as_ref().is_some_and(|d| d.is_attachment());
    let file_name = disposition
        .as_ref()
        .and_then(|d| d.filename())
        .or_else(|| content_type.get_parameter("name").filter(|n| !n.is_empty()))
        .map(decode_encoded_words);

    if content_type.is_primary_type("multipart") {
        return MimePart::Multipart(MultipartContainer {
            sub_type: content_type.get_sub_type().to_ascii_lowercase(),
            parts: entity
                .children
                .into_iter()
                .map(|child| classify(child, depth))
                .collect(),
        });
    }

    if content_type.is_mime_type("message", "rfc822")
        && !attachment_disposition
        && depth < MAX_NESTED_MESSAGE_DEPTH
    {
        if let Ok(nested) = parse_message_at_depth(&entity.body, depth + 1) {
            return MimePart::Message(Box::new(nested));
        }
    }

    let is_text = content_type.is_mime_type("text", "plain") || content_type.is_mime_type("text", "html");
    if is_text && !attachment_disposition && file_name.is_none() {
        let text = decode_charset(&entity.body, content_type.get_parameter("charset"));
        return MimePart::Text(TextPart {
            text: text.replace("\r\n", "\n"),
            content_type,
        });
    }

    MimePart::Attachment(AttachmentPart {
        file_name,
        content_id: entity
            .content_id
            .as_deref()
            .map(strip_angle_brackets)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        mime_type: content_type.mime_type(),
        disposition_inline: disposition.as_ref().is_some_and(|d| d.is_inline()),
        data: entity.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_nested_structure() {
        let raw = b"Subject: outer\r\nContent-Type: multipart/mixed; boundary=m\r\n\r\n--m\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nline one\r\nline two\r\n--m\r\nContent-Type: message/rfc822\r\n\r\nSubject: inner\r\nContent-Type: text/html\r\n\r\n<p>inner</p>\r\n--m\r\nContent-Type: image/png; name=dot.png\r\nContent-Transfer-Encoding: base64\r\nContent-ID: <dot@local>\r\nContent-Disposition: inline\r\n\r\niVBORw==\r\n--m--\r\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.headers.get("subject"), Some("outer"));
        let parts = match &msg.body {
            MimePart::Multipart(m) => &m.parts,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(parts.len(), 3);
        match &parts[0] {
            MimePart::Text(t) => assert_eq!(t.text, "line one\nline two"),
            other => panic!("unexpected {:?}", other),
        }
        match &parts[1] {
            MimePart::Message(m) => {
                assert_eq!(m.headers.get("Subject"), Some("inner"));
                assert!(m.body.contains_html());
            }
            other => panic!("unexpected {:?}", other),
        }
        match &parts[2] {
            MimePart::Attachment(a) => {
                assert_eq!(a.file_name.as_deref(), Some("dot.png"));
                assert_eq!(a.content_id.as_deref(), Some("dot@local"));
                assert_eq!(a.mime_type, "image/png");
                assert!(a.disposition_inline);
                assert_eq!(a.data, vec![0x89, b'P', b'N', b'G']);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn text_with_attachment_disposition_is_attachment() {
        let raw = b"Content-Type: text/plain\r\nContent-Disposition: attachment; filename=notes.txt\r\n\r\nhi";
        let msg = parse_message(raw).unwrap();
        assert!(matches!(msg.body, MimePart::Attachment(_)));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_message(b"").is_err());
    }
}
