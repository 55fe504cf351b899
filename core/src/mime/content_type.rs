/*
 * content_type.rs
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

//! Content-Type header (RFC 2045).

use std::collections::HashMap;
use std::fmt;

use super::parameter::Parameter;
use super::utils::is_token;

#[derive(Debug, Clone)]
pub struct ContentType {
    primary_type: String,
    sub_type: String,
    /// Insertion order is kept for serialization; lookups go through `parameter_map`.
    parameters: Vec<Parameter>,
    parameter_map: HashMap<String, String>,
}

impl ContentType {
    pub fn new(
        primary_type: impl Into<String>,
        sub_type: impl Into<String>,
        parameters: Option<Vec<Parameter>>,
    ) -> Self {
        let parameters = parameters.unwrap_or_default();
        let parameter_map = parameters
            .iter()
            .map(|param| (param.get_name().to_lowercase(), param.get_value().to_string()))
            .collect();
        Self {
            primary_type: primary_type.into(),
            sub_type: sub_type.into(),
            parameters,
            parameter_map,
        }
    }

    /// `text/plain` with no parameters: the RFC 2045 default when the header is absent.
    pub fn default_text() -> Self {
        Self::new("text", "plain", None)
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        self.parameter_map.insert(name.to_lowercase(), value.clone());
        self.parameters.retain(|p| !p.get_name().eq_ignore_ascii_case(name));
        self.parameters.push(Parameter::new(name, value));
        self
    }

    pub fn get_primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn get_sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Lowercased `type/subtype` without parameters.
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.primary_type, self.sub_type).to_ascii_lowercase()
    }

    pub fn is_primary_type(&self, t: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(t)
    }

    pub fn is_sub_type(&self, t: &str) -> bool {
        self.sub_type.eq_ignore_ascii_case(t)
    }

    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.is_primary_type(primary) && self.is_sub_type(sub)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        self.parameter_map.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_map.contains_key(&name.to_lowercase())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary_type, self.sub_type)?;
        for p in &self.parameters {
            write!(f, "; {}", p)?;
        }
        Ok(())
    }
}

/// Parse Content-Type header value.
pub fn parse_content_type(value: &str) -> Option<ContentType> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (type_part, params_part) = match value.find(';') {
        Some(i) => {
            let (a, b) = value.split_at(i);
            (a.trim(), b[1..].trim())
        }
        None => (value, ""),
    };
    let slash = type_part.find('/')?;
    let primary = type_part[..slash].trim();
    let sub = type_part[slash + 1..].trim();
    if !is_token(primary) || !is_token(sub) {
        return None;
    }
    let parameters = parse_parameter_list(params_part);
    Some(ContentType::new(primary, sub, parameters))
}

/// Parse semicolon-separated parameter list (name=value; name="value").
/// Malformed entries are skipped rather than failing the whole list.
pub fn parse_parameter_list(params_part: &str) -> Option<Vec<Parameter>> {
    let params_part = params_part.trim();
    if params_part.is_empty() {
        return None;
    }
    let mut parameters = Vec::new();
    let mut pos = 0;
    let bytes = params_part.as_bytes();
    let len = bytes.len();

    while pos < len {
        while pos < len && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
            pos += 1;
        }
        if pos >= len {
            break;
        }
        let eq = match bytes[pos..].iter().position(|&b| b == b'=') {
            Some(eq) => pos + eq,
            None => break,
        };
        let name = String::from_utf8_lossy(&bytes[pos..eq]).trim().to_string();
        pos = eq + 1;
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let value = if pos < len && bytes[pos] == b'"' {
            pos += 1;
            let mut v = Vec::new();
            while pos < len {
                let c = bytes[pos];
                if c == b'\\' && pos + 1 < len {
                    v.push(bytes[pos + 1]);
                    pos += 2;
                } else if c == b'"' {
                    pos += 1;
                    break;
                } else {
                    v.push(c);
                    pos += 1;
                }
            }
            // Skip anything between the closing quote and the next separator.
            while pos < len && bytes[pos] != b';' {
                pos += 1;
            }
            String::from_utf8_lossy(&v).into_owned()
        } else {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b';')
                .map(|i| pos + i)
                .unwrap_or(len);
            let v = String::from_utf8_lossy(&bytes[pos..end]).trim().to_string();
            pos = end;
            v
        };
        if is_token(&name) {
            parameters.push(Parameter::new(name, value));
        }
    }
    if parameters.is_empty() {
        None
    } else {
        Some(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boundary_and_charset() {
        let ct = parse_content_type("multipart/alternative; boundary=\"a b\"; charset=utf-8").unwrap();
        assert!(ct.is_mime_type("multipart", "alternative"));
        assert_eq!(ct.get_parameter("BOUNDARY"), Some("a b"));
        assert_eq!(ct.get_parameter("charset"), Some("utf-8"));
    }

    #[test]
    fn display_round_trips() {
        let ct = ContentType::new("text", "html", None).with_parameter("charset", "UTF-8");
        assert_eq!(ct.to_string(), "text/html; charset=UTF-8");
        let parsed = parse_content_type(&ct.to_string()).unwrap();
        assert_eq!(parsed.mime_type(), "text/html");
    }

    #[test]
    fn rejects_missing_subtype() {
        assert!(parse_content_type("text").is_none());
        assert!(parse_content_type("").is_none());
    }
}
