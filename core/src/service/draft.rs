/*
 * draft.rs
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

use chrono::Utc;
use log::{debug, warn};

use super::error::{interpret_draft_error, DraftError};
use super::object_store::{
    draft_object_key, draft_prefix, sealing_metadata, ObjectStoreError, ALGORITHM_METADATA, KEY_ID_METADATA,
};
use super::types::{BatchOperationResult, DeleteDraftFailure, DraftEmailMessage, DraftEmailMessageMetadata};
use super::EmailMessageService;
use crate::keys::SymmetricKeyEncryptionAlgorithm;
use crate::sealing::{KeyInfo, KeyType, SealingService, Unsealer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDraftEmailMessageInput {
    pub rfc822_data: Vec<u8>,
    pub sender_email_address_id: String,
    pub symmetric_key_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDraftEmailMessageInput {
    pub id: String,
    pub rfc822_data: Vec<u8>,
    pub sender_email_address_id: String,
    pub symmetric_key_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDraftEmailMessageInput {
    pub id: String,
    pub email_address_id: String,
}

impl EmailMessageService {
    /// Seal and store a new draft. Returns the draft id.
    pub async fn create_draft(&self, input: &CreateDraftEmailMessageInput) -> Result<String, DraftError> {
        self.check_email_address(&input.sender_email_address_id).await?;
        let id = uuid::Uuid::new_v4().to_string();
        self.store_draft(&input.sender_email_address_id, &id, &input.symmetric_key_id, &input.rfc822_data)
            .await?;
        debug!("created draft {}", id);
        Ok(id)
    }

    /// Replace the content of an existing draft. Returns the draft id.
    pub async fn update_draft(&self, input: &UpdateDraftEmailMessageInput) -> Result<String, DraftError> {
        self.check_email_address(&input.sender_email_address_id).await?;
        let key = draft_object_key(&input.sender_email_address_id, &input.id);
        self.object_store
            .get_object_metadata(&self.config.bucket, &key)
            .await
            .map_err(|e| draft_lookup_error(e, &input.id))?;
        self.store_draft(&input.sender_email_address_id, &input.id, &input.symmetric_key_id, &input.rfc822_data)
            .await?;
        Ok(input.id.clone())
    }

    pub async fn get_draft(&self, input: &GetDraftEmailMessageInput) -> Result<DraftEmailMessage, DraftError> {
        let bucket = &self.config.bucket;
        let key = draft_object_key(&input.email_address_id, &input.id);
        let metadata = self
            .object_store
            .get_object_metadata(bucket, &key)
            .await
            .map_err(|e| draft_lookup_error(e, &input.id))?;
        let key_id = metadata
            .user_metadata
            .get(KEY_ID_METADATA)
            .ok_or_else(|| DraftError::failed(format!("draft {} has no {} metadata", input.id, KEY_ID_METADATA)))?;
        let algorithm = metadata.user_metadata.get(ALGORITHM_METADATA).ok_or_else(|| {
            DraftError::failed(format!("draft {} has no {} metadata", input.id, ALGORITHM_METADATA))
        })?;
        let sealed = self
            .object_store
            .download(bucket, &key)
            .await
            .map_err(|e| draft_lookup_error(e, &input.id))?;
        let unsealer = Unsealer::new(
            self.key_manager.clone(),
            KeyInfo::new(key_id.as_str(), KeyType::SymmetricKey, algorithm.as_str()),
        );
        let rfc822_data = unsealer.unseal_raw(&sealed)?;
        Ok(DraftEmailMessage {
            id: input.id.clone(),
            email_address_id: input.email_address_id.clone(),
            updated_at: metadata.last_modified.unwrap_or_else(Utc::now),
            rfc822_data,
        })
    }

    /// Delete drafts one by one; a draft that cannot be deleted does not stop the rest.
    pub async fn delete_drafts(
        &self,
        ids: &[String],
        email_address_id: &str,
    ) -> Result<BatchOperationResult<String, DeleteDraftFailure>, DraftError> {
        if ids.is_empty() {
            return Err(DraftError::invalid_argument("no draft ids given"));
        }
        self.check_email_address(email_address_id).await?;
        let mut deleted = Vec::new();
        let mut failures = Vec::new();
        for id in ids {
            let key = draft_object_key(email_address_id, id);
            match self.object_store.delete(&self.config.bucket, &key).await {
                Ok(()) => deleted.push(id.clone()),
                Err(e) => {
                    warn!("could not delete draft {}: {}", id, e);
                    failures.push(DeleteDraftFailure {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(BatchOperationResult::new(deleted, failures))
    }

    pub async fn list_draft_metadata(
        &self,
        email_address_id: &str,
    ) -> Result<Vec<DraftEmailMessageMetadata>, DraftError> {
        let prefix = draft_prefix(email_address_id);
        let objects = self.object_store.list(&self.config.bucket, &prefix).await?;
        Ok(objects
            .into_iter()
            .filter_map(|object| {
                let id = object.key.strip_prefix(&prefix)?;
                (!id.is_empty()).then(|| DraftEmailMessageMetadata {
                    id: id.to_string(),
                    email_address_id: email_address_id.to_string(),
                    updated_at: object.last_modified,
                })
            })
            .collect())
    }

    async fn check_email_address(&self, email_address_id: &str) -> Result<(), DraftError> {
        match self
            .api
            .get_email_address(email_address_id)
            .await
            .map_err(interpret_draft_error)?
        {
            Some(_) => Ok(()),
            None => Err(DraftError::EmailAddressNotFound(None)),
        }
    }

    async fn store_draft(
        &self,
        email_address_id: &str,
        id: &str,
        symmetric_key_id: &str,
        rfc822_data: &[u8],
    ) -> Result<(), DraftError> {
        let sealed = self.sealing.seal_string(symmetric_key_id, rfc822_data)?;
        let metadata = sealing_metadata(
            symmetric_key_id,
            &SymmetricKeyEncryptionAlgorithm::AesCbcPkcs7Padding.to_string(),
        );
        self.object_store
            .upload(&self.config.bucket, &draft_object_key(email_address_id, id), sealed, metadata)
            .await?;
        Ok(())
    }
}

fn draft_lookup_error(error: ObjectStoreError, id: &str) -> DraftError {
    match error {
        ObjectStoreError::NotFound(_) => DraftError::DraftNotFound(id.to_string()),
        e => DraftError::ObjectStore(e),
    }
}
