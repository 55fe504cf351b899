/*
 * content_id.rs
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

//! Content-ID / Message-ID values (RFC 2045, RFC 5322): `<id>`.
//!
//! Inline images composed from local files use the file name as the id, so unlike a strict
//! msg-id the local@domain form is not required.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentID {
    id: String,
}

impl ContentID {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Bare id without angle brackets.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_local_part(&self) -> &str {
        self.id.split_once('@').map(|(l, _)| l).unwrap_or(&self.id)
    }

    pub fn get_domain(&self) -> Option<&str> {
        self.id.split_once('@').map(|(_, d)| d)
    }

    /// Compare against a bare id or a bracketed header value.
    pub fn matches(&self, other: &str) -> bool {
        strip_angle_brackets(other).eq_ignore_ascii_case(&self.id)
    }
}

impl fmt::Display for ContentID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.id)
    }
}

/// Parse a single Content-ID or Message-ID value (with or without angle brackets).
pub fn parse_content_id(value: &str) -> Option<ContentID> {
    let id = strip_angle_brackets(value);
    if id.is_empty() || id.chars().any(|c| c.is_whitespace()) {
        return None;
    }
    Some(ContentID::new(id))
}

/// Parse a whitespace/comma separated list of ids, as found in References.
pub fn parse_content_id_list(value: &str) -> Vec<ContentID> {
    let mut ids = Vec::new();
    let mut rest = value.trim();
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) => {
                if let Some(id) = parse_content_id(&after[..end]) {
                    ids.push(id);
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    if ids.is_empty() {
        ids.extend(value.split([' ', ',', '\t']).filter_map(parse_content_id));
    }
    ids
}

pub fn strip_angle_brackets(value: &str) -> &str {
    let v = value.trim();
    let v = v.strip_prefix('<').unwrap_or(v);
    v.strip_suffix('>').unwrap_or(v).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_brackets() {
        let a = parse_content_id("<securebody@sudomail.com>").unwrap();
        let b = parse_content_id("securebody@sudomail.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get_local_part(), "securebody");
        assert_eq!(a.get_domain(), Some("sudomail.com"));
        assert_eq!(a.to_string(), "<securebody@sudomail.com>");
        assert!(a.matches("<SECUREBODY@sudomail.com>"));
    }

    #[test]
    fn accepts_file_name_ids() {
        let id = parse_content_id("<logo.png>").unwrap();
        assert_eq!(id.id(), "logo.png");
        assert_eq!(id.get_domain(), None);
        assert!(parse_content_id("<>").is_none());
    }

    #[test]
    fn parses_reference_lists() {
        let ids = parse_content_id_list("<a@x> <b@y>\t<c@z>");
        let ids: Vec<&str> = ids.iter().map(ContentID::id).collect();
        assert_eq!(ids, vec!["a@x", "b@y", "c@z"]);
    }
}
