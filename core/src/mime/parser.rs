/*
 * parser.rs
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

//! MIME parser: receive(buffer) contract, complete lines are processed, the incomplete tail is
//! buffered for the next call. Nested multiparts are tracked on an entity stack so that every
//! entity gets a balanced start/end pair.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::mime::content_type::parse_content_type;
use crate::mime::handler::{MimeHandler, MimeLocator, MimeParseError};
use crate::mime::quoted_printable;
use crate::mime::utils::bytes_to_utf8_string;

/// Longest boundary accepted from the wire. RFC 2046 says 70; some generators exceed it.
const MAX_BOUNDARY_LEN: usize = 200;

/// Base64 bodies in the wild are sloppy about padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Event-driven MIME parser. Feed data via receive(); handler gets callbacks.
pub struct MimeParser<H> {
    handler: H,
    state: ParserState,
    /// Incomplete line carried over from previous receive()
    line_buffer: Vec<u8>,
    /// Header line waiting for possible continuation lines (RFC 5322 folding)
    pending_header: Option<Vec<u8>>,
    /// Open entities, outermost first
    entities: Vec<Entity>,
    locator: MimeLocator,
}

#[derive(Default)]
struct Entity {
    /// Boundary of the enclosing multipart that introduced this entity
    delimiter: Option<String>,
    /// Own boundary when this entity is a multipart
    boundary: Option<String>,
    /// Close-delimiter seen; remaining lines are epilogue
    closed: bool,
    transfer_encoding: Option<String>,
    /// Raw body lines joined with CRLF (the CRLF before a delimiter belongs to the delimiter)
    body: Vec<u8>,
    has_body_line: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum ParserState {
    #[default]
    Init,
    Header,
    Body,
}

impl<H: MimeHandler> MimeParser<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            state: ParserState::Init,
            line_buffer: Vec::new(),
            pending_header: None,
            entities: Vec::new(),
            locator: MimeLocator {
                offset: 0,
                line: 1,
                column: 1,
            },
        }
    }

    /// Process as much as possible from buf. Complete lines are handled now; a trailing
    /// partial line is kept until the next receive() or close(). Returns bytes accepted.
    pub fn receive(&mut self, buf: &[u8]) -> Result<usize, MimeParseError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut data = std::mem::take(&mut self.line_buffer);
        data.extend_from_slice(buf);

        let mut line_start = 0;
        for i in 0..data.len() {
            if data[i] == b'\n' {
                let line = &data[line_start..=i];
                self.locator.offset += line.len() as u64;
                self.process_line(trim_crlf(line))?;
                self.locator.line += 1;
                self.locator.column = 1;
                line_start = i + 1;
            }
        }
        self.line_buffer.extend_from_slice(&data[line_start..]);
        Ok(buf.len())
    }

    /// End of input; flush the partial line and close every open entity.
    pub fn close(&mut self) -> Result<(), MimeParseError> {
        self.handler.set_locator(self.locator.clone());
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            self.locator.offset += line.len() as u64;
            self.process_line(trim_crlf(&line))?;
        }
        if self.state == ParserState::Init {
            return Ok(());
        }
        if self.state == ParserState::Header {
            self.flush_header()?;
            self.handler.end_headers()?;
            self.state = ParserState::Body;
        }
        while !self.entities.is_empty() {
            self.close_entity()?;
        }
        Ok(())
    }

    /// Return the handler (e.g. after close) for inspection.
    pub fn into_inner(self) -> H {
        self.handler
    }

    fn process_line(&mut self, line: &[u8]) -> Result<(), MimeParseError> {
        match self.state {
            ParserState::Init => {
                self.open_entity(None)?;
                self.process_header_line(line)
            }
            ParserState::Header => {
                if let Some((index, is_close)) = self.match_boundary(line) {
                    // Part with no header/body separator before the next delimiter.
                    self.flush_header()?;
                    self.handler.end_headers()?;
                    self.state = ParserState::Body;
                    return self.on_boundary(index, is_close);
                }
                self.process_header_line(line)
            }
            ParserState::Body => {
                if let Some((index, is_close)) = self.match_boundary(line) {
                    return self.on_boundary(index, is_close);
                }
                self.body_line(line)
            }
        }
    }

    fn process_header_line(&mut self, line: &[u8]) -> Result<(), MimeParseError> {
        if line.is_empty() {
            self.flush_header()?;
            self.handler.end_headers()?;
            self.state = ParserState::Body;
            return Ok(());
        }
        if matches!(line[0], b' ' | b'\t') {
            if let Some(pending) = self.pending_header.as_mut() {
                pending.extend_from_slice(line);
            }
            return Ok(());
        }
        self.flush_header()?;
        self.pending_header = Some(line.to_vec());
        Ok(())
    }

    fn flush_header(&mut self) -> Result<(), MimeParseError> {
        let raw = match self.pending_header.take() {
            Some(raw) => raw,
            None => return Ok(()),
        };
        let (name, value) = match split_header(&raw) {
            Some(p) => p,
            None => return Ok(()),
        };
        let name = bytes_to_utf8_string(name).trim().to_string();
        let value = bytes_to_utf8_string(value).trim().to_string();
        match name.to_ascii_lowercase().as_str() {
            "content-type" => {
                if let Some(ct) = parse_content_type(&value) {
                    let boundary = ct
                        .get_parameter("boundary")
                        .filter(|b| !b.is_empty() && b.len() <= MAX_BOUNDARY_LEN);
                    if let (true, Some(b), Some(entity)) =
                        (ct.is_primary_type("multipart"), boundary, self.entities.last_mut())
                    {
                        entity.boundary = Some(b.to_string());
                    }
                }
                self.handler.content_type(&value)
            }
            "content-disposition" => self.handler.content_disposition(&value),
            "content-transfer-encoding" => {
                if let Some(entity) = self.entities.last_mut() {
                    entity.transfer_encoding = Some(value.to_ascii_lowercase());
                }
                self.handler.content_transfer_encoding(&value)
            }
            "content-id" => self.handler.content_id(&value),
            "content-description" => self.handler.content_description(&value),
            "mime-version" => self.handler.mime_version(&value),
            _ => self.handler.header(&name, &value),
        }
    }

    /// Innermost open multipart whose boundary this line is a delimiter for.
    fn match_boundary(&self, line: &[u8]) -> Option<(usize, bool)> {
        let rest = line.strip_prefix(b"--")?;
        for (index, entity) in self.entities.iter().enumerate().rev() {
            if entity.closed {
                continue;
            }
            let boundary = match entity.boundary.as_deref() {
                Some(b) => b,
                None => continue,
            };
            if let Some(after) = rest.strip_prefix(boundary.as_bytes()) {
                let (is_close, tail) = match after.strip_prefix(b"--") {
                    Some(tail) => (true, tail),
                    None => (false, after),
                };
                // Transport padding after the delimiter is allowed (RFC 2046 5.1.1).
                if tail.iter().all(|&c| c == b' ' || c == b'\t') {
                    return Some((index, is_close));
                }
            }
        }
        None
    }

    fn on_boundary(&mut self, index: usize, is_close: bool) -> Result<(), MimeParseError> {
        while self.entities.len() > index + 1 {
            self.close_entity()?;
        }
        if is_close {
            if let Some(entity) = self.entities.last_mut() {
                entity.closed = true;
            }
            self.state = ParserState::Body;
            Ok(())
        } else {
            let delimiter = self.entities[index].boundary.clone();
            self.open_entity(delimiter)
        }
    }

    fn open_entity(&mut self, delimiter: Option<String>) -> Result<(), MimeParseError> {
        self.handler.set_locator(self.locator.clone());
        self.handler.start_entity(delimiter.as_deref())?;
        self.entities.push(Entity {
            delimiter,
            ..Entity::default()
        });
        self.state = ParserState::Header;
        Ok(())
    }

    fn close_entity(&mut self) -> Result<(), MimeParseError> {
        let entity = match self.entities.pop() {
            Some(e) => e,
            None => return Ok(()),
        };
        if entity.boundary.is_none() {
            let decoded = decode_body(entity.transfer_encoding.as_deref(), entity.body)
                .map_err(|m| MimeParseError::at(m, self.locator.clone()))?;
            if !decoded.is_empty() {
                self.handler.body_content(&decoded)?;
            }
        }
        self.handler.end_entity(entity.delimiter.as_deref())
    }

    fn body_line(&mut self, line: &[u8]) -> Result<(), MimeParseError> {
        let is_multipart = match self.entities.last() {
            Some(entity) => entity.boundary.is_some(),
            None => return Ok(()),
        };
        if is_multipart {
            return self.handler.unexpected_content(line);
        }
        if let Some(entity) = self.entities.last_mut() {
            if entity.has_body_line {
                entity.body.extend_from_slice(b"\r\n");
            }
            entity.body.extend_from_slice(line);
            entity.has_body_line = true;
        }
        Ok(())
    }
}

fn decode_body(transfer_encoding: Option<&str>, body: Vec<u8>) -> Result<Vec<u8>, String> {
    match transfer_encoding {
        Some("base64") => {
            let compact: Vec<u8> = body.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
            LENIENT_BASE64
                .decode(compact)
                .map_err(|e| format!("invalid base64 body: {}", e))
        }
        Some("quoted-printable") => Ok(quoted_printable::decode(&body)),
        _ => Ok(body),
    }
}

fn trim_crlf(s: &[u8]) -> &[u8] {
    let mut end = s.len();
    if end >= 2 && s[end - 2] == b'\r' && s[end - 1] == b'\n' {
        end -= 2;
    } else if end >= 1 && (s[end - 1] == b'\n' || s[end - 1] == b'\r') {
        end -= 1;
    }
    &s[..end]
}

fn split_header(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    if colon == 0 {
        return None;
    }
    Some((&line[..colon], &line[colon + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CollectingHandler {
        content_types: Vec<String>,
        headers: Vec<(String, String)>,
        body_chunks: Vec<Vec<u8>>,
        unexpected: Vec<Vec<u8>>,
        events: Vec<String>,
    }

    impl MimeHandler for CollectingHandler {
        fn start_entity(&mut self, boundary: Option<&str>) -> Result<(), MimeParseError> {
            self.events.push(format!("start {}", boundary.unwrap_or("-")));
            Ok(())
        }
        fn content_type(&mut self, content_type: &str) -> Result<(), MimeParseError> {
            self.content_types.push(content_type.to_string());
            Ok(())
        }
        fn header(&mut self, name: &str, value: &str) -> Result<(), MimeParseError> {
            self.headers.push((name.to_string(), value.to_string()));
            Ok(())
        }
        fn body_content(&mut self, data: &[u8]) -> Result<(), MimeParseError> {
            self.body_chunks.push(data.to_vec());
            Ok(())
        }
        fn unexpected_content(&mut self, data: &[u8]) -> Result<(), MimeParseError> {
            self.unexpected.push(data.to_vec());
            Ok(())
        }
        fn end_entity(&mut self, boundary: Option<&str>) -> Result<(), MimeParseError> {
            self.events.push(format!("end {}", boundary.unwrap_or("-")));
            Ok(())
        }
    }

    fn parse(msg: &[u8]) -> CollectingHandler {
        let mut parser = MimeParser::new(CollectingHandler::default());
        parser.receive(msg).unwrap();
        parser.close().unwrap();
        parser.into_inner()
    }

    #[test]
    fn plain_text_message() {
        let h = parse(b"MIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nHello, world.\r\n");
        assert_eq!(h.content_types, vec!["text/plain; charset=utf-8"]);
        assert_eq!(h.events, vec!["start -", "end -"]);
        assert_eq!(h.body_chunks, vec![b"Hello, world.".to_vec()]);
    }

    #[test]
    fn sibling_parts_are_balanced() {
        let h = parse(b"Content-Type: multipart/mixed; boundary=sep\r\n\r\npreamble\r\n--sep\r\nContent-Type: text/plain\r\n\r\nPart one.\r\n--sep\r\nContent-Type: text/html\r\n\r\n<p>two</p>\r\n--sep--\r\nepilogue\r\n");
        assert_eq!(
            h.events,
            vec!["start -", "start sep", "end sep", "start sep", "end sep", "end -"]
        );
        assert_eq!(h.body_chunks, vec![b"Part one.".to_vec(), b"<p>two</p>".to_vec()]);
        assert_eq!(h.unexpected, vec![b"preamble".to_vec(), b"epilogue".to_vec()]);
    }

    #[test]
    fn nested_multipart_closes_inner_parts() {
        let msg = b"Content-Type: multipart/mixed; boundary=outer\r\n\r\n--outer\r\nContent-Type: multipart/alternative; boundary=inner\r\n\r\n--inner\r\nContent-Type: text/plain\r\n\r\nplain\r\n--inner\r\nContent-Type: text/html\r\n\r\nhtml\r\n--inner--\r\n--outer\r\nContent-Type: application/pdf\r\nContent-Transfer-Encoding: base64\r\n\r\nJVBERi0=\r\n--outer--\r\n";
        let h = parse(msg);
        assert_eq!(
            h.events,
            vec![
                "start -", "start outer", "start inner", "end inner", "start inner", "end inner",
                "end outer", "start outer", "end outer", "end -"
            ]
        );
        assert_eq!(h.body_chunks[2], b"%PDF-".to_vec());
    }

    #[test]
    fn folded_headers_are_unfolded() {
        let h = parse(b"Subject: a very\r\n long subject\r\nContent-Type: multipart/mixed;\r\n\tboundary=\"b1\"\r\n\r\n--b1\r\n\r\nx\r\n--b1--\r\n");
        assert_eq!(h.headers, vec![("Subject".to_string(), "a very long subject".to_string())]);
        assert_eq!(h.body_chunks, vec![b"x".to_vec()]);
    }

    #[test]
    fn input_split_across_receives() {
        let msg: &[u8] = b"Content-Type: text/plain\r\nContent-Transfer-Encoding: quoted-printable\r\n\r\ncaf=C3=A9 =\r\nnoir";
        let mut parser = MimeParser::new(CollectingHandler::default());
        for chunk in msg.chunks(7) {
            assert_eq!(parser.receive(chunk).unwrap(), chunk.len());
        }
        parser.close().unwrap();
        let h = parser.into_inner();
        assert_eq!(h.body_chunks, vec!["café noir".as_bytes().to_vec()]);
    }

    #[test]
    fn invalid_base64_reports_error() {
        let mut parser = MimeParser::new(CollectingHandler::default());
        parser
            .receive(b"Content-Transfer-Encoding: base64\r\n\r\n!!!!\r\n")
            .unwrap();
        assert!(parser.close().is_err());
    }
}
