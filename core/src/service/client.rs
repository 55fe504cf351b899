/*
 * client.rs
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

//! Client facade: owns the collaborators and threads the current symmetric key through
//! each request.

use std::sync::Arc;

use log::{info, warn};

use super::api::{EmailServiceApi, SendEmailMessageResult};
use super::draft::{CreateDraftEmailMessageInput, GetDraftEmailMessageInput, UpdateDraftEmailMessageInput};
use super::error::{DraftError, EmailMessageError};
use super::get::GetEmailMessageWithBodyInput;
use super::object_store::ObjectStore;
use super::send::SendEmailMessageInput;
use super::types::{
    BatchOperationResult, DeleteDraftFailure, DraftEmailMessage, DraftEmailMessageMetadata, EmailMessage,
    EmailMessageOperationFailure, EmailMessageWithBody, ListApiResult, ListEmailMessagesInput,
    PartialEmailMessage, UpdateEmailMessagesValues, UpdatedEmailMessage,
};
use super::EmailMessageService;
use crate::config::EmailServiceConfig;
use crate::keys::{
    DefaultDeviceKeyManager, DeviceKeyManager, DeviceKeyManagerError, KeyPair, KeyringSecureStore,
    MemorySecureStore, SecureStore,
};
use crate::message::OutgoingMessage;

/// Service name under which keys are kept in the system keychain.
pub const KEYCHAIN_SERVICE: &str = "sudomail";

pub struct EmailClient {
    key_manager: Arc<dyn DeviceKeyManager>,
    service: EmailMessageService,
}

impl EmailClient {
    pub fn new(
        config: EmailServiceConfig,
        api: Arc<dyn EmailServiceApi>,
        object_store: Arc<dyn ObjectStore>,
        key_manager: Arc<dyn DeviceKeyManager>,
    ) -> Self {
        Self {
            service: EmailMessageService::new(config, api, object_store, key_manager.clone()),
            key_manager,
        }
    }

    /// Build a client whose keys live in `store` under the configured namespace.
    pub fn with_secure_store<S: SecureStore + 'static>(
        config: EmailServiceConfig,
        api: Arc<dyn EmailServiceApi>,
        object_store: Arc<dyn ObjectStore>,
        store: S,
    ) -> Self {
        let key_manager: Arc<dyn DeviceKeyManager> =
            Arc::new(DefaultDeviceKeyManager::new(store, config.key_namespace.clone()));
        Self::new(config, api, object_store, key_manager)
    }

    /// Build a client whose keys live in the system keychain. When no keychain is usable the
    /// keys are held in memory for the life of the client.
    pub fn with_default_secure_store(
        config: EmailServiceConfig,
        api: Arc<dyn EmailServiceApi>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        let keychain_available = KeyringSecureStore::available(KEYCHAIN_SERVICE);
        let key_manager = default_key_manager(keychain_available, &config.key_namespace);
        Self::new(config, api, object_store, key_manager)
    }

    pub fn key_manager(&self) -> &Arc<dyn DeviceKeyManager> {
        &self.key_manager
    }

    /// The current symmetric key id, generating the first one if none exists yet.
    pub fn current_symmetric_key_id(&self) -> Result<String, DeviceKeyManagerError> {
        match self.key_manager.get_current_symmetric_key_id()? {
            Some(id) => Ok(id),
            None => self.key_manager.generate_new_current_symmetric_key(),
        }
    }

    pub fn generate_key_pair(&self) -> Result<KeyPair, DeviceKeyManagerError> {
        self.key_manager.generate_key_pair()
    }

    pub fn export_keys(&self) -> Result<Vec<u8>, DeviceKeyManagerError> {
        self.key_manager.export_keys()
    }

    pub fn import_keys(&self, archive: &[u8]) -> Result<(), DeviceKeyManagerError> {
        self.key_manager.import_keys(archive)
    }

    /// Remove every key held for this client.
    pub fn reset(&self) -> Result<(), DeviceKeyManagerError> {
        self.key_manager.remove_all_keys()
    }

    pub async fn send_email_message(
        &self,
        sender_email_address_id: &str,
        message: OutgoingMessage,
    ) -> Result<SendEmailMessageResult, EmailMessageError> {
        self.service
            .send_email_message(SendEmailMessageInput {
                sender_email_address_id: sender_email_address_id.to_string(),
                message,
            })
            .await
    }

    pub async fn get_email_message(&self, id: &str) -> Result<Option<EmailMessage>, EmailMessageError> {
        self.service.get_email_message(id).await
    }

    pub async fn get_email_message_with_body(
        &self,
        id: &str,
        email_address_id: &str,
    ) -> Result<Option<EmailMessageWithBody>, EmailMessageError> {
        self.service
            .get_email_message_with_body(&GetEmailMessageWithBodyInput {
                id: id.to_string(),
                email_address_id: email_address_id.to_string(),
            })
            .await
    }

    pub async fn list_email_messages(
        &self,
        input: &ListEmailMessagesInput,
    ) -> Result<ListApiResult<EmailMessage, PartialEmailMessage>, EmailMessageError> {
        self.service.list_email_messages(input).await
    }

    pub async fn update_email_messages(
        &self,
        ids: &[String],
        values: &UpdateEmailMessagesValues,
    ) -> Result<BatchOperationResult<UpdatedEmailMessage, EmailMessageOperationFailure>, EmailMessageError> {
        self.service.update_email_messages(ids, values).await
    }

    pub async fn delete_email_messages(
        &self,
        ids: &[String],
    ) -> Result<BatchOperationResult<String, EmailMessageOperationFailure>, EmailMessageError> {
        self.service.delete_email_messages(ids).await
    }

    pub async fn create_draft(
        &self,
        rfc822_data: Vec<u8>,
        sender_email_address_id: &str,
    ) -> Result<String, DraftError> {
        let symmetric_key_id = self.current_symmetric_key_id()?;
        self.service
            .create_draft(&CreateDraftEmailMessageInput {
                rfc822_data,
                sender_email_address_id: sender_email_address_id.to_string(),
                symmetric_key_id,
            })
            .await
    }

    pub async fn update_draft(
        &self,
        id: &str,
        rfc822_data: Vec<u8>,
        sender_email_address_id: &str,
    ) -> Result<String, DraftError> {
        let symmetric_key_id = self.current_symmetric_key_id()?;
        self.service
            .update_draft(&UpdateDraftEmailMessageInput {
                id: id.to_string(),
                rfc822_data,
                sender_email_address_id: sender_email_address_id.to_string(),
                symmetric_key_id,
            })
            .await
    }

    pub async fn get_draft(&self, id: &str, email_address_id: &str) -> Result<DraftEmailMessage, DraftError> {
        self.service
            .get_draft(&GetDraftEmailMessageInput {
                id: id.to_string(),
                email_address_id: email_address_id.to_string(),
            })
            .await
    }

    pub async fn delete_drafts(
        &self,
        ids: &[String],
        email_address_id: &str,
    ) -> Result<BatchOperationResult<String, DeleteDraftFailure>, DraftError> {
        self.service.delete_drafts(ids, email_address_id).await
    }

    pub async fn list_draft_metadata(
        &self,
        email_address_id: &str,
    ) -> Result<Vec<DraftEmailMessageMetadata>, DraftError> {
        self.service.list_draft_metadata(email_address_id).await
    }
}

fn default_key_manager(keychain_available: bool, namespace: &str) -> Arc<dyn DeviceKeyManager> {
    if keychain_available {
        info!("keeping keys in the system keychain");
        Arc::new(DefaultDeviceKeyManager::new(KeyringSecureStore::new(KEYCHAIN_SERVICE), namespace))
    } else {
        warn!("system keychain unavailable, keys will not outlive this client");
        Arc::new(DefaultDeviceKeyManager::new(MemorySecureStore::new(), namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_memory_without_keychain() {
        let _ = env_logger::builder().is_test(true).try_init();
        let key_manager = default_key_manager(false, "eml");
        let pair = key_manager.generate_key_pair().unwrap();
        assert!(key_manager.private_key_exists(&pair.key_id).unwrap());

        let other = default_key_manager(false, "eml");
        assert!(!other.private_key_exists(&pair.key_id).unwrap());
    }
}
