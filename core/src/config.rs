/*
 * config.rs
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

//! Email service configuration, read from the `emService` section of the platform config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_KEY_NAMESPACE: &str = "eml";
pub const DEFAULT_MESSAGE_SIZE_LIMIT: usize = 10 * 1024 * 1024;
const PLATFORM_CONFIG_SECTION: &str = "emService";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config has no {0} section")]
    MissingSection(&'static str),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailServiceConfig {
    pub region: String,
    pub api_url: Option<String>,
    /// Staging bucket for outgoing messages.
    pub transient_bucket: String,
    /// Bucket holding message bodies and drafts.
    pub bucket: String,
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
    #[serde(default = "default_message_size_limit")]
    pub message_size_limit: usize,
}

fn default_key_namespace() -> String {
    DEFAULT_KEY_NAMESPACE.to_string()
}

fn default_message_size_limit() -> usize {
    DEFAULT_MESSAGE_SIZE_LIMIT
}

impl EmailServiceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Read the `emService` section of a whole platform config document.
    pub fn from_platform_config(json: &str) -> Result<Self, ConfigError> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        let section = document
            .get_mut(PLATFORM_CONFIG_SECTION)
            .map(serde_json::Value::take)
            .ok_or(ConfigError::MissingSection(PLATFORM_CONFIG_SECTION))?;
        let config: Self = serde_json::from_value(section)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("region", &self.region),
            ("transientBucket", &self.transient_bucket),
            ("bucket", &self.bucket),
            ("keyNamespace", &self.key_namespace),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        if self.message_size_limit == 0 {
            return Err(ConfigError::Invalid("messageSizeLimit must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_platform_section_with_defaults() {
        let json = r#"{
            "identityService": {"region": "us-east-1"},
            "emService": {
                "region": "us-east-1",
                "apiUrl": "https://api.example.com/graphql",
                "transientBucket": "transient",
                "bucket": "messages"
            }
        }"#;
        let config = EmailServiceConfig::from_platform_config(json).unwrap();
        assert_eq!(config.bucket, "messages");
        assert_eq!(config.key_namespace, "eml");
        assert_eq!(config.message_size_limit, DEFAULT_MESSAGE_SIZE_LIMIT);
    }

    #[test]
    fn rejects_missing_section_and_empty_buckets() {
        assert!(matches!(
            EmailServiceConfig::from_platform_config("{}"),
            Err(ConfigError::MissingSection(_))
        ));
        let json = r#"{"region":"r","transientBucket":"","bucket":"b"}"#;
        assert!(matches!(
            EmailServiceConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }
}
