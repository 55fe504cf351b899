/*
 * archive.rs
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

//! Portable archive of every key entry in a namespace.
//!
//! JSON: `{"version":1,"namespace":"eml","keys":[{"name":"private/<id>","data":"<base64>"}]}`.
//! Names are relative to the namespace so an archive can be restored under another one.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::error::DeviceKeyManagerError;

pub const ARCHIVE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureKeyArchive {
    pub version: u32,
    pub namespace: String,
    pub keys: Vec<ArchivedKey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArchivedKey {
    pub name: String,
    pub data: String,
}

impl SecureKeyArchive {
    pub fn new(namespace: &str, entries: Vec<(String, Zeroizing<Vec<u8>>)>) -> Self {
        Self {
            version: ARCHIVE_VERSION,
            namespace: namespace.to_string(),
            keys: entries
                .into_iter()
                .map(|(name, data)| ArchivedKey {
                    name,
                    data: BASE64.encode(data.as_slice()),
                })
                .collect(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DeviceKeyManagerError> {
        serde_json::to_vec(self).map_err(|e| DeviceKeyManagerError::SecureKeyArchive(e.to_string()))
    }

    /// Parse and validate an archive, returning its decoded entries. Nothing is written here so
    /// a bad archive never leaves a partial import behind.
    pub fn decode(bytes: &[u8]) -> Result<Vec<(String, Zeroizing<Vec<u8>>)>, DeviceKeyManagerError> {
        let archive: SecureKeyArchive = serde_json::from_slice(bytes)
            .map_err(|e| DeviceKeyManagerError::SecureKeyArchive(e.to_string()))?;
        if archive.version != ARCHIVE_VERSION {
            return Err(DeviceKeyManagerError::SecureKeyArchive(format!(
                "unsupported archive version {}",
                archive.version
            )));
        }
        archive
            .keys
            .into_iter()
            .map(|key| {
                if key.name.is_empty() || key.name.starts_with('/') {
                    return Err(DeviceKeyManagerError::SecureKeyArchive(format!(
                        "invalid key name {:?}",
                        key.name
                    )));
                }
                let data = BASE64.decode(key.data.as_bytes()).map_err(|e| {
                    DeviceKeyManagerError::SecureKeyArchive(format!("{}: {}", key.name, e))
                })?;
                Ok((key.name, Zeroizing::new(data)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_version() {
        let json = br#"{"version":9,"namespace":"eml","keys":[]}"#;
        assert!(matches!(
            SecureKeyArchive::decode(json),
            Err(DeviceKeyManagerError::SecureKeyArchive(_))
        ));
    }

    #[test]
    fn rejects_bad_entry() {
        let json = br#"{"version":1,"namespace":"eml","keys":[{"name":"symmetric/a","data":"!!"}]}"#;
        assert!(SecureKeyArchive::decode(json).is_err());
    }
}
