/*
 * part.rs
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

//! Typed MIME part tree.
//!
//! Parsed messages are classified into a closed set of part kinds so that body extraction can
//! recurse structurally instead of inspecting content types at every step.

use super::content_type::ContentType;

/// Header fields of one entity, in wire order. Lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed RFC 822 message: top-level headers and the classified body.
#[derive(Debug, Clone)]
pub struct MimeMessage {
    pub headers: Headers,
    pub body: MimePart,
}

#[derive(Debug, Clone)]
pub enum MimePart {
    /// Displayable text/plain or text/html content.
    Text(TextPart),
    /// Anything not rendered as body text.
    Attachment(AttachmentPart),
    /// Embedded message/rfc822, parsed recursively.
    Message(Box<MimeMessage>),
    /// multipart/* container.
    Multipart(MultipartContainer),
}

#[derive(Debug, Clone)]
pub struct TextPart {
    pub content_type: ContentType,
    pub text: String,
}

impl TextPart {
    pub fn is_html(&self) -> bool {
        self.content_type.is_sub_type("html")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub file_name: Option<String>,
    /// Bare content id, without angle brackets.
    pub content_id: Option<String>,
    pub mime_type: String,
    /// True when Content-Disposition says inline. Not authoritative on its own.
    pub disposition_inline: bool,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MultipartContainer {
    pub sub_type: String,
    pub parts: Vec<MimePart>,
}

impl MultipartContainer {
    pub fn is_alternative(&self) -> bool {
        self.sub_type.eq_ignore_ascii_case("alternative")
    }
}

impl MimePart {
    /// True if this part is, or contains, an HTML text part. Nested messages are opaque.
    pub fn contains_html(&self) -> bool {
        match self {
            MimePart::Text(t) => t.is_html(),
            MimePart::Multipart(m) => m.parts.iter().any(MimePart::contains_html),
            MimePart::Attachment(_) | MimePart::Message(_) => false,
        }
    }
}
