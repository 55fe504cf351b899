/*
 * utils.rs
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

//! MIME utilities: RFC 2045 tokens, RFC 2046 boundaries, charset-aware text decoding.

/// Checks if a character is valid in an RFC 2045 token.
#[inline]
pub fn is_token_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'{' | b'|' | b'}' | b'~'
    )
}

/// Checks if the string is a valid RFC 2045 token (1+ token chars).
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Checks if a character is valid in a MIME boundary (RFC 2046).
#[inline]
pub fn is_boundary_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' |
        b'/' | b':' | b'=' | b'?'
    )
}

/// Validates MIME boundary: 1-70 chars from boundary set (RFC 2046).
pub fn is_valid_boundary(boundary: &str) -> bool {
    let b = boundary.as_bytes();
    (1..=70).contains(&b.len()) && b.iter().copied().all(is_boundary_char)
}

/// Fresh multipart boundary. `kind` keeps nested boundaries visually distinct.
pub fn generate_boundary(kind: &str) -> String {
    format!("----=_{}_{}", kind, uuid::Uuid::new_v4().simple())
}

/// Decode text bytes in the given charset. UTF-8 is the default; single-byte Latin charsets map
/// bytes straight to code points; anything else falls back to lossy UTF-8.
pub fn decode_charset(bytes: &[u8], charset: Option<&str>) -> String {
    let charset = charset.map(|c| c.trim().to_ascii_lowercase());
    match charset.as_deref() {
        Some("iso-8859-1") | Some("latin1") | Some("iso_8859-1") | Some("us-ascii")
        | Some("windows-1252") => bytes.iter().map(|&b| b as char).collect(),
        _ => bytes_to_utf8_string(bytes),
    }
}

/// UTF-8 first, ISO-8859-1 when the bytes are not valid UTF-8.
pub fn bytes_to_utf8_string(b: &[u8]) -> String {
    match std::str::from_utf8(b) {
        Ok(s) => s.to_string(),
        Err(_) => b.iter().map(|&c| c as char).collect(),
    }
}

/// Minimal HTML escaping for text embedded in a generated HTML body.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_boundaries_are_valid() {
        let b = generate_boundary("mixed");
        assert!(is_valid_boundary(&b), "{}", b);
        assert_ne!(b, generate_boundary("mixed"));
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(decode_charset(&[0x63, 0x61, 0x66, 0xe9], Some("ISO-8859-1")), "café");
        assert_eq!(bytes_to_utf8_string(&[0x63, 0x61, 0x66, 0xe9]), "café");
        assert_eq!(decode_charset("café".as_bytes(), None), "café");
    }
}
