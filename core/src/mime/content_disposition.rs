/*
 * content_disposition.rs
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

//! Content-Disposition header (RFC 2183).

use std::collections::HashMap;
use std::fmt;

use super::content_type::parse_parameter_list;
use super::parameter::Parameter;
use super::utils::is_token;

#[derive(Debug, Clone)]
pub struct ContentDisposition {
    disposition_type: String,
    parameters: Vec<Parameter>,
    parameter_map: HashMap<String, String>,
}

impl ContentDisposition {
    pub fn new(disposition_type: impl Into<String>, parameters: Option<Vec<Parameter>>) -> Self {
        let parameters = parameters.unwrap_or_default();
        let parameter_map = parameters
            .iter()
            .map(|param| (param.get_name().to_lowercase(), param.get_value().to_string()))
            .collect();
        Self {
            disposition_type: disposition_type.into(),
            parameters,
            parameter_map,
        }
    }

    pub fn attachment(filename: &str) -> Self {
        Self::new("attachment", Some(vec![Parameter::new("filename", filename)]))
    }

    pub fn inline(filename: &str) -> Self {
        Self::new("inline", Some(vec![Parameter::new("filename", filename)]))
    }

    pub fn get_disposition_type(&self) -> &str {
        &self.disposition_type
    }

    pub fn is_disposition_type(&self, t: &str) -> bool {
        self.disposition_type.eq_ignore_ascii_case(t)
    }

    pub fn is_inline(&self) -> bool {
        self.is_disposition_type("inline")
    }

    pub fn is_attachment(&self) -> bool {
        self.is_disposition_type("attachment")
    }

    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        self.parameter_map.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_map.contains_key(&name.to_lowercase())
    }

    pub fn filename(&self) -> Option<&str> {
        self.get_parameter("filename").filter(|f| !f.is_empty())
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.disposition_type)?;
        for p in &self.parameters {
            write!(f, "; {}", p)?;
        }
        Ok(())
    }
}

pub fn parse_content_disposition(value: &str) -> Option<ContentDisposition> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (disp_part, params_part) = match value.find(';') {
        Some(i) => {
            let (a, b) = value.split_at(i);
            (a.trim(), b[1..].trim())
        }
        None => (value, ""),
    };
    if !is_token(disp_part) {
        return None;
    }
    let parameters = parse_parameter_list(params_part);
    Some(ContentDisposition::new(disp_part, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_with_filename() {
        let cd = parse_content_disposition("INLINE; filename=\"logo.png\"").unwrap();
        assert!(cd.is_inline());
        assert!(!cd.is_attachment());
        assert_eq!(cd.filename(), Some("logo.png"));
    }

    #[test]
    fn serializes_quoted_filename() {
        let cd = ContentDisposition::attachment("report 1.pdf");
        assert_eq!(cd.to_string(), "attachment; filename=\"report 1.pdf\"");
    }
}
