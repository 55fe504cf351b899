/*
 * mod.rs
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

//! Email use cases over the service API and object storage.

pub mod api;
mod batch;
pub mod client;
mod draft;
pub mod error;
mod get;
mod list;
pub mod object_store;
mod send;
pub mod types;

use std::sync::Arc;

use crate::config::EmailServiceConfig;
use crate::keys::DeviceKeyManager;
use crate::mime::EmailMessageDataProcessor;
use crate::sealing::DefaultSealingService;

pub use api::{
    ApiError, EmailServiceApi, GraphQlError, S3ObjectRef, SendEmailMessageRequest, SendEmailMessageResult,
};
pub use batch::EMAIL_MESSAGE_BATCH_LIMIT;
pub use client::EmailClient;
pub use draft::{CreateDraftEmailMessageInput, GetDraftEmailMessageInput, UpdateDraftEmailMessageInput};
pub use error::{interpret_draft_error, interpret_email_message_error, DraftError, EmailMessageError};
pub use get::GetEmailMessageWithBodyInput;
pub use object_store::{ObjectMetadata, ObjectStore, ObjectStoreError, ObjectSummary};
pub use send::SendEmailMessageInput;
pub use types::*;

/// Collaborators shared by every use case. Each use case method is a single request/response
/// exchange; nothing here holds mutable state.
pub struct EmailMessageService {
    api: Arc<dyn EmailServiceApi>,
    object_store: Arc<dyn ObjectStore>,
    key_manager: Arc<dyn DeviceKeyManager>,
    sealing: DefaultSealingService,
    processor: EmailMessageDataProcessor,
    config: EmailServiceConfig,
}

impl EmailMessageService {
    pub fn new(
        config: EmailServiceConfig,
        api: Arc<dyn EmailServiceApi>,
        object_store: Arc<dyn ObjectStore>,
        key_manager: Arc<dyn DeviceKeyManager>,
    ) -> Self {
        Self {
            api,
            object_store,
            sealing: DefaultSealingService::new(key_manager.clone()),
            processor: EmailMessageDataProcessor::new(key_manager.clone()),
            key_manager,
            config,
        }
    }

    pub fn config(&self) -> &EmailServiceConfig {
        &self.config
    }
}
