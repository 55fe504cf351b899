/*
 * types.rs
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

//! Email message records as exchanged with the service, sealed and unsealed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{EmailAttachment, EncryptionStatus};
use crate::sealing::{SealedAttribute, UnsealerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Queued,
    Sent,
    Delivered,
    Undelivered,
    Failed,
    Received,
    Deleted,
}

/// Header summary sealed into each message record. Also sent in the clear alongside an
/// encrypted message so the service can route it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rfc822Header {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: Option<String>,
    pub has_attachments: bool,
    /// RFC 3339.
    pub date: Option<String>,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
}

/// A message record as returned by the service, header still sealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedEmailMessage {
    pub id: String,
    pub email_address_id: String,
    pub folder_id: String,
    pub previous_folder_id: Option<String>,
    pub seen: bool,
    pub direction: Direction,
    pub state: State,
    pub version: u32,
    pub sort_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub size: u64,
    pub rfc822_header: SealedAttribute,
    #[serde(default)]
    pub encryption_status: EncryptionStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub id: String,
    pub email_address_id: String,
    pub folder_id: String,
    pub previous_folder_id: Option<String>,
    pub seen: bool,
    pub direction: Direction,
    pub state: State,
    pub version: u32,
    pub sort_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub size: u64,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: Option<String>,
    pub has_attachments: bool,
    pub date: Option<DateTime<Utc>>,
    pub encryption_status: EncryptionStatus,
}

impl EmailMessage {
    pub fn from_sealed(sealed: &SealedEmailMessage, header: Rfc822Header) -> Self {
        Self {
            id: sealed.id.clone(),
            email_address_id: sealed.email_address_id.clone(),
            folder_id: sealed.folder_id.clone(),
            previous_folder_id: sealed.previous_folder_id.clone(),
            seen: sealed.seen,
            direction: sealed.direction,
            state: sealed.state,
            version: sealed.version,
            sort_date: sealed.sort_date,
            created_at: sealed.created_at,
            updated_at: sealed.updated_at,
            size: sealed.size,
            from: if header.from.is_empty() {
                Vec::new()
            } else {
                crate::mime::split_address_list(&header.from)
            },
            to: header.to,
            cc: header.cc,
            bcc: header.bcc,
            reply_to: header.reply_to,
            subject: header.subject,
            has_attachments: header.has_attachments,
            date: header
                .date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc)),
            encryption_status: sealed.encryption_status,
        }
    }
}

/// The unsealable part of a message record, returned when its header cannot be unsealed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialEmailMessage {
    pub id: String,
    pub email_address_id: String,
    pub folder_id: String,
    pub previous_folder_id: Option<String>,
    pub seen: bool,
    pub direction: Direction,
    pub state: State,
    pub version: u32,
    pub sort_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub size: u64,
    pub encryption_status: EncryptionStatus,
}

impl From<&SealedEmailMessage> for PartialEmailMessage {
    fn from(sealed: &SealedEmailMessage) -> Self {
        Self {
            id: sealed.id.clone(),
            email_address_id: sealed.email_address_id.clone(),
            folder_id: sealed.folder_id.clone(),
            previous_folder_id: sealed.previous_folder_id.clone(),
            seen: sealed.seen,
            direction: sealed.direction,
            state: sealed.state,
            version: sealed.version,
            sort_date: sealed.sort_date,
            created_at: sealed.created_at,
            updated_at: sealed.updated_at,
            size: sealed.size,
            encryption_status: sealed.encryption_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessageWithBody {
    pub id: String,
    pub body: String,
    pub is_html: bool,
    pub attachments: Vec<EmailAttachment>,
    pub inline_attachments: Vec<EmailAttachment>,
    pub encryption_status: EncryptionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEmailMessagesInput {
    pub email_address_id: Option<String>,
    pub folder_id: Option<String>,
    pub limit: Option<u32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SealedEmailMessageConnection {
    pub items: Vec<SealedEmailMessage>,
    pub next_token: Option<String>,
}

/// A list item whose unsealing failed, with its position in the page.
#[derive(Debug)]
pub struct ListPartialItem<P> {
    pub index: usize,
    pub partial: P,
    pub cause: UnsealerError,
}

#[derive(Debug)]
pub enum ListApiResult<T, P> {
    Success {
        items: Vec<T>,
        next_token: Option<String>,
    },
    /// Some items could not be unsealed.
    Partial {
        items: Vec<T>,
        failed: Vec<ListPartialItem<P>>,
        next_token: Option<String>,
    },
}

impl<T, P> ListApiResult<T, P> {
    pub fn items(&self) -> &[T] {
        match self {
            ListApiResult::Success { items, .. } | ListApiResult::Partial { items, .. } => items,
        }
    }

    pub fn next_token(&self) -> Option<&str> {
        match self {
            ListApiResult::Success { next_token, .. } | ListApiResult::Partial { next_token, .. } => {
                next_token.as_deref()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperationStatus {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOperationResult<S, F> {
    pub status: BatchOperationStatus,
    pub success_values: Vec<S>,
    pub failure_values: Vec<F>,
}

impl<S, F> BatchOperationResult<S, F> {
    /// Status follows from which lists are empty; an empty batch counts as success.
    pub fn new(success_values: Vec<S>, failure_values: Vec<F>) -> Self {
        let status = match (success_values.is_empty(), failure_values.is_empty()) {
            (_, true) => BatchOperationStatus::Success,
            (true, false) => BatchOperationStatus::Failure,
            (false, false) => BatchOperationStatus::Partial,
        };
        Self {
            status,
            success_values,
            failure_values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateEmailMessagesValues {
    pub folder_id: Option<String>,
    pub seen: Option<bool>,
}

impl UpdateEmailMessagesValues {
    pub fn is_empty(&self) -> bool {
        self.folder_id.is_none() && self.seen.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedEmailMessage {
    pub id: String,
    pub version: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessageOperationFailure {
    pub id: String,
    pub error_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateEmailMessagesResponse {
    pub successes: Vec<UpdatedEmailMessage>,
    pub failures: Vec<EmailMessageOperationFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub id: String,
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEmailMessageMetadata {
    pub id: String,
    pub email_address_id: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEmailMessage {
    pub id: String,
    pub email_address_id: String,
    pub updated_at: DateTime<Utc>,
    pub rfc822_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDraftFailure {
    pub id: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_status_follows_lists() {
        let ok: BatchOperationResult<u8, u8> = BatchOperationResult::new(vec![1], vec![]);
        assert_eq!(ok.status, BatchOperationStatus::Success);
        let partial: BatchOperationResult<u8, u8> = BatchOperationResult::new(vec![1], vec![2]);
        assert_eq!(partial.status, BatchOperationStatus::Partial);
        let failed: BatchOperationResult<u8, u8> = BatchOperationResult::new(vec![], vec![2]);
        assert_eq!(failed.status, BatchOperationStatus::Failure);
    }

    #[test]
    fn header_json_is_lenient() {
        let header: Rfc822Header =
            serde_json::from_str(r#"{"from":"a@example.com","to":["b@example.com"],"hasAttachments":true}"#).unwrap();
        assert_eq!(header.to, vec!["b@example.com".to_string()]);
        assert!(header.has_attachments);
        assert!(header.subject.is_none());
    }
}
