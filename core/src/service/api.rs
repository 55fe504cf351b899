/*
 * api.rs
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

//! Email service API consumed by the use cases. The GraphQL transport lives with the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{
    EmailAddress, EmailMessageOperationFailure, ListEmailMessagesInput, Rfc822Header,
    SealedEmailMessage, SealedEmailMessageConnection, UpdateEmailMessagesResponse,
    UpdateEmailMessagesValues,
};
use crate::message::{EmailAddressPublicInfo, EncryptionStatus};

/// One entry of a GraphQL response's `errors` array.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{} ({})", .message, .error_type.as_deref().unwrap_or("untyped"))]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub error_type: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("service returned an error: {0}")]
    GraphQl(#[from] GraphQlError),

    #[error("not authorized")]
    NotAuthorized,

    #[error("network failure: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// The GraphQL `errorType`, when the service sent one.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            ApiError::GraphQl(e) => e.error_type.as_deref(),
            _ => None,
        }
    }
}

/// Location of a staged object in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ObjectRef {
    pub bucket: String,
    pub key: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendEmailMessageRequest {
    pub email_address_id: String,
    pub message: S3ObjectRef,
    pub encryption_status: EncryptionStatus,
    /// Header summary; the service cannot read it from an encrypted body.
    pub rfc822_header: Rfc822Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEmailMessageResult {
    pub id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
pub trait EmailServiceApi: Send + Sync {
    async fn get_email_address(&self, id: &str) -> Result<Option<EmailAddress>, ApiError>;

    /// Public key information for the addresses that have any. Unknown addresses are omitted.
    async fn lookup_email_addresses_public_info(
        &self,
        addresses: &[String],
    ) -> Result<Vec<EmailAddressPublicInfo>, ApiError>;

    async fn send_email_message(&self, request: SendEmailMessageRequest) -> Result<SendEmailMessageResult, ApiError>;

    async fn get_email_message(&self, id: &str) -> Result<Option<SealedEmailMessage>, ApiError>;

    async fn list_email_messages(
        &self,
        input: &ListEmailMessagesInput,
    ) -> Result<SealedEmailMessageConnection, ApiError>;

    async fn update_email_messages(
        &self,
        ids: &[String],
        values: &UpdateEmailMessagesValues,
    ) -> Result<UpdateEmailMessagesResponse, ApiError>;

    /// Returns the ids that could not be deleted.
    async fn delete_email_messages(&self, ids: &[String]) -> Result<Vec<EmailMessageOperationFailure>, ApiError>;
}
