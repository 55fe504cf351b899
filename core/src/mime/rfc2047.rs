/*
 * rfc2047.rs
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

//! RFC 2047 encoded-words (e.g. =?charset?q?text?=) for header values and parameters.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::mime::quoted_printable;
use crate::mime::utils::decode_charset;

/// Longest run of raw bytes per B-encoded word; keeps each word under 75 characters.
const MAX_ENCODED_CHUNK: usize = 45;

/// Expand RFC 2047 encoded-words in the string. Whitespace between two adjacent encoded-words
/// is dropped (RFC 2047 section 6.2); malformed words are kept literally.
pub fn decode_encoded_words(s: &str) -> String {
    let mut out = String::new();
    let mut rest = s;
    let mut last_was_word = false;

    while let Some(start) = rest.find("=?") {
        let literal = &rest[..start];
        match decode_one_encoded_word(&rest[start..]) {
            Some((decoded, consumed)) => {
                if !(last_was_word && literal.trim().is_empty()) {
                    out.push_str(literal);
                }
                out.push_str(&decoded);
                rest = &rest[start + consumed..];
                last_was_word = true;
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = &rest[start + 2..];
                last_was_word = false;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode one encoded-word at the start of `s`. Returns (decoded, bytes consumed).
fn decode_one_encoded_word(s: &str) -> Option<(String, usize)> {
    let body = s.strip_prefix("=?")?;
    let (raw_charset, after_charset) = body.split_once('?')?;
    let (encoding, after_encoding) = after_charset.split_once('?')?;
    let end = after_encoding.find("?=")?;
    let payload = &after_encoding[..end];
    if raw_charset.is_empty() || payload.contains(' ') {
        return None;
    }
    // RFC 2231 language suffix: charset*lang
    let charset = raw_charset.split('*').next().unwrap_or(raw_charset);
    let decoded_bytes = match encoding {
        "b" | "B" => BASE64.decode(payload.as_bytes()).ok()?,
        "q" | "Q" => decode_q(payload.as_bytes()),
        _ => return None,
    };
    let consumed = 2 + raw_charset.len() + 1 + encoding.len() + 1 + end + 2;
    Some((decode_charset(&decoded_bytes, Some(charset)), consumed))
}

/// Q encoding: _ = space, rest is quoted-printable.
fn decode_q(payload: &[u8]) -> Vec<u8> {
    let preprocessed: Vec<u8> = payload
        .iter()
        .map(|&b| if b == b'_' { b' ' } else { b })
        .collect();
    quoted_printable::decode(&preprocessed)
}

/// Encode a header value as UTF-8 B encoded-words when it is not plain ASCII.
pub fn encode_header_value(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    let mut words = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_len = 0;
    for (idx, c) in value.char_indices() {
        let w = c.len_utf8();
        if chunk_len + w > MAX_ENCODED_CHUNK {
            words.push(encode_word(&value[chunk_start..idx]));
            chunk_start = idx;
            chunk_len = 0;
        }
        chunk_len += w;
    }
    if chunk_start < value.len() {
        words.push(encode_word(&value[chunk_start..]));
    }
    words.join(" ")
}

fn encode_word(s: &str) -> String {
    format!("=?UTF-8?B?{}?=", BASE64.encode(s.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_encoded_words_b() {
        assert_eq!(decode_encoded_words("=?UTF-8?B?SGVsbG8=?="), "Hello");
    }

    #[test]
    fn decode_encoded_words_q() {
        assert_eq!(decode_encoded_words("=?UTF-8?Q?Hello_World?="), "Hello World");
        assert_eq!(decode_encoded_words("=?iso-8859-1?q?caf=E9?="), "café");
    }

    #[test]
    fn decode_encoded_words_mixed() {
        assert_eq!(decode_encoded_words("Hello =?UTF-8?B?V29ybGQ=?=!"), "Hello World!");
    }

    #[test]
    fn adjacent_words_join_without_space() {
        assert_eq!(
            decode_encoded_words("=?UTF-8?Q?Hel?= =?UTF-8?Q?lo?= there"),
            "Hello there"
        );
    }

    #[test]
    fn malformed_word_is_literal() {
        assert_eq!(decode_encoded_words("50% =? off"), "50% =? off");
    }

    #[test]
    fn encode_round_trip() {
        let subject = "Grüße aus Köln, ein ziemlich langer Betreff mit Umlauten äöü";
        let encoded = encode_header_value(subject);
        assert!(encoded.is_ascii());
        assert!(encoded.split(' ').all(|w| w.len() <= 75));
        assert_eq!(decode_encoded_words(&encoded), subject);
        assert_eq!(encode_header_value("plain"), "plain");
    }
}
