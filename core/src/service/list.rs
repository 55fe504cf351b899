/*
 * list.rs
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

use log::warn;

use super::error::{interpret_email_message_error, EmailMessageError};
use super::types::{
    EmailMessage, ListApiResult, ListEmailMessagesInput, ListPartialItem, PartialEmailMessage,
};
use super::EmailMessageService;

const MAX_LIST_LIMIT: u32 = 1000;

impl EmailMessageService {
    /// List a page of messages. Records whose header cannot be unsealed are returned as
    /// partial items instead of failing the page.
    pub async fn list_email_messages(
        &self,
        input: &ListEmailMessagesInput,
    ) -> Result<ListApiResult<EmailMessage, PartialEmailMessage>, EmailMessageError> {
        if input.limit.is_some_and(|limit| limit == 0 || limit > MAX_LIST_LIMIT) {
            return Err(EmailMessageError::invalid_argument(format!(
                "limit must be between 1 and {}",
                MAX_LIST_LIMIT
            )));
        }
        let page = self
            .api
            .list_email_messages(input)
            .await
            .map_err(interpret_email_message_error)?;

        let mut items = Vec::with_capacity(page.items.len());
        let mut failed = Vec::new();
        for (index, sealed) in page.items.iter().enumerate() {
            match self.unseal_email_message(sealed) {
                Ok(message) => items.push(message),
                Err(cause) => {
                    warn!("message {} could not be unsealed: {}", sealed.id, cause);
                    failed.push(ListPartialItem {
                        index,
                        partial: PartialEmailMessage::from(sealed),
                        cause,
                    });
                }
            }
        }
        let next_token = page.next_token;
        Ok(if failed.is_empty() {
            ListApiResult::Success { items, next_token }
        } else {
            ListApiResult::Partial {
                items,
                failed,
                next_token,
            }
        })
    }
}
