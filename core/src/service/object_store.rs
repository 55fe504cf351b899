/*
 * object_store.rs
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

//! Object storage consumed by the use cases, and the key layout used in it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// User metadata naming the key an object is sealed with.
pub const KEY_ID_METADATA: &str = "key-id";
/// User metadata naming the sealing algorithm.
pub const ALGORITHM_METADATA: &str = "algorithm";

#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object storage failure: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub last_modified: Option<DateTime<Utc>>,
    pub user_metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object. Returns the key.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        metadata: HashMap<String, String>,
    ) -> Result<String, ObjectStoreError>;
    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;
    async fn get_object_metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, ObjectStoreError>;
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError>;
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectSummary>, ObjectStoreError>;
}

pub fn message_object_key(email_address_id: &str, message_id: &str) -> String {
    format!("email/{}/{}", email_address_id, message_id)
}

/// Staging key for an outgoing message in the transient bucket.
pub fn transient_object_key(email_address_id: &str) -> String {
    format!("email/{}/{}", email_address_id, uuid::Uuid::new_v4())
}

pub fn draft_prefix(email_address_id: &str) -> String {
    format!("email/{}/draft/", email_address_id)
}

pub fn draft_object_key(email_address_id: &str, draft_id: &str) -> String {
    format!("{}{}", draft_prefix(email_address_id), draft_id)
}

/// Sealing metadata for an object encrypted under `key_id`.
pub fn sealing_metadata(key_id: &str, algorithm: &str) -> HashMap<String, String> {
    HashMap::from([
        (KEY_ID_METADATA.to_string(), key_id.to_string()),
        (ALGORITHM_METADATA.to_string(), algorithm.to_string()),
    ])
}
