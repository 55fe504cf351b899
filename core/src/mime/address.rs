/*
 * address.rs
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

//! Address-list headers (From, To, Cc, Bcc): splitting, bare-address extraction, encoding.

use super::rfc2047::{decode_encoded_words, encode_header_value};

/// Split an address-list header value into individual mailboxes, honouring quoted strings,
/// comments and angle-bracketed addresses. Group syntax (`name: a, b;`) is flattened.
pub fn split_address_list(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_angle = false;
    let mut comment_depth = 0usize;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes || comment_depth > 0 => {
                current.push(c);
                escaped = true;
            }
            '"' if comment_depth == 0 => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '(' if !in_quotes => {
                comment_depth += 1;
                current.push(c);
            }
            ')' if !in_quotes && comment_depth > 0 => {
                comment_depth -= 1;
                current.push(c);
            }
            '<' if !in_quotes && comment_depth == 0 => {
                in_angle = true;
                current.push(c);
            }
            '>' if !in_quotes && comment_depth == 0 => {
                in_angle = false;
                current.push(c);
            }
            ':' if !in_quotes && !in_angle && comment_depth == 0 => {
                // Group display name: drop it, keep members.
                current.clear();
            }
            ',' | ';' if !in_quotes && !in_angle && comment_depth == 0 => {
                push_mailbox(&mut out, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_mailbox(&mut out, &current);
    out
}

fn push_mailbox(out: &mut Vec<String>, raw: &str) {
    let raw = raw.trim();
    let decoded = decode_encoded_words(raw);
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        return;
    }
    if trimmed == raw {
        out.push(trimmed.to_string());
        return;
    }
    // A decoded display name may now contain specials; quote it so the mailbox splits back
    // as one.
    match trimmed.rfind('<') {
        Some(start) if start > 0 => {
            let name = trimmed[..start].trim();
            out.push(format!("{} {}", quote_display_name(name), &trimmed[start..]));
        }
        _ => out.push(trimmed.to_string()),
    }
}

const DISPLAY_NAME_SPECIALS: &[char] = &[',', ';', '"', '<', '>', '@', ':', '(', ')', '[', ']', '\\'];

/// Quote `name` as an RFC 5322 quoted-string when it contains specials.
fn quote_display_name(name: &str) -> String {
    let already_quoted = name.len() >= 2 && name.starts_with('"') && name.ends_with('"');
    if already_quoted || !name.contains(DISPLAY_NAME_SPECIALS) {
        return name.to_string();
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Inverse of `quote_display_name`.
fn unquote_display_name(name: &str) -> String {
    let name = name.trim();
    let Some(inner) = name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) else {
        return name.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Bare `local@domain` part of a mailbox: the bracketed address when present, else the whole
/// value without comments.
pub fn extract_address(mailbox: &str) -> String {
    if let (Some(start), Some(end)) = (mailbox.rfind('<'), mailbox.rfind('>')) {
        if start < end {
            return mailbox[start + 1..end].trim().to_string();
        }
    }
    let mut out = String::new();
    let mut depth = 0usize;
    for c in mailbox.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Encode one mailbox for a header: non-ASCII display names become encoded-words.
pub fn encode_mailbox(mailbox: &str) -> String {
    let mailbox = mailbox.trim();
    if mailbox.is_ascii() {
        return mailbox.to_string();
    }
    match mailbox.rfind('<') {
        Some(start) if start > 0 => {
            let name = unquote_display_name(&mailbox[..start]);
            format!("{} {}", encode_header_value(&name), &mailbox[start..])
        }
        _ => mailbox.to_string(),
    }
}

/// Header value for a list of mailboxes.
pub fn format_address_list(mailboxes: &[String]) -> String {
    mailboxes
        .iter()
        .map(|m| encode_mailbox(m))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_quoted_display_names() {
        let list = split_address_list("\"Doe, Jane\" <jane@example.com>, bob@example.com");
        assert_eq!(list, vec!["\"Doe, Jane\" <jane@example.com>", "bob@example.com"]);
    }

    #[test]
    fn flattens_groups() {
        let list = split_address_list("friends: a@x.com, b@y.com;, c@z.com");
        assert_eq!(list, vec!["a@x.com", "b@y.com", "c@z.com"]);
    }

    #[test]
    fn extracts_bare_address() {
        assert_eq!(extract_address("Jane <jane@example.com>"), "jane@example.com");
        assert_eq!(extract_address("jane@example.com (Jane)"), "jane@example.com");
    }

    #[test]
    fn encodes_non_ascii_display_name() {
        let encoded = encode_mailbox("Jürgen <j@example.com>");
        assert!(encoded.is_ascii());
        assert!(encoded.ends_with("<j@example.com>"));
        assert_eq!(split_address_list(&encoded), vec!["Jürgen <j@example.com>"]);
    }

    #[test]
    fn decoded_display_name_with_comma_is_requoted() {
        let header = format_address_list(&["\"Doe, Jöhn\" <a@x.com>".to_string()]);
        assert!(header.is_ascii());
        let parsed = split_address_list(&header);
        assert_eq!(parsed, vec!["\"Doe, Jöhn\" <a@x.com>"]);
        // Feeding the parsed list back through the encoder is stable.
        assert_eq!(split_address_list(&format_address_list(&parsed)), parsed);
        assert_eq!(extract_address(&parsed[0]), "a@x.com");
    }

    #[test]
    fn quoting_escapes_inner_quotes() {
        assert_eq!(quote_display_name("Jöhn \"JJ\" Doe"), "\"Jöhn \\\"JJ\\\" Doe\"");
        assert_eq!(unquote_display_name("\"Jöhn \\\"JJ\\\" Doe\""), "Jöhn \"JJ\" Doe");
        assert_eq!(quote_display_name("Jöhn Doe"), "Jöhn Doe");
    }
}
