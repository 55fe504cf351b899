/*
 * batch.rs
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

use log::debug;

use super::error::{interpret_email_message_error, EmailMessageError};
use super::types::{
    BatchOperationResult, EmailMessageOperationFailure, UpdateEmailMessagesValues, UpdatedEmailMessage,
};
use super::EmailMessageService;

/// Most message ids accepted by one batch update or delete.
pub const EMAIL_MESSAGE_BATCH_LIMIT: usize = 100;

/// Reject empty and oversized batches; drop duplicate ids keeping first occurrence order.
fn validate_batch(ids: &[String]) -> Result<Vec<String>, EmailMessageError> {
    if ids.is_empty() {
        return Err(EmailMessageError::invalid_argument("no message ids given"));
    }
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    if unique.len() > EMAIL_MESSAGE_BATCH_LIMIT {
        return Err(EmailMessageError::limit_exceeded(format!(
            "{} ids exceeds the batch limit of {}",
            unique.len(),
            EMAIL_MESSAGE_BATCH_LIMIT
        )));
    }
    Ok(unique)
}

impl EmailMessageService {
    pub async fn update_email_messages(
        &self,
        ids: &[String],
        values: &UpdateEmailMessagesValues,
    ) -> Result<BatchOperationResult<UpdatedEmailMessage, EmailMessageOperationFailure>, EmailMessageError> {
        let ids = validate_batch(ids)?;
        if values.is_empty() {
            return Err(EmailMessageError::invalid_argument("nothing to update"));
        }
        let response = self
            .api
            .update_email_messages(&ids, values)
            .await
            .map_err(interpret_email_message_error)?;
        debug!(
            "updated {} messages, {} failed",
            response.successes.len(),
            response.failures.len()
        );
        Ok(BatchOperationResult::new(response.successes, response.failures))
    }

    pub async fn delete_email_messages(
        &self,
        ids: &[String],
    ) -> Result<BatchOperationResult<String, EmailMessageOperationFailure>, EmailMessageError> {
        let ids = validate_batch(ids)?;
        let failures = self
            .api
            .delete_email_messages(&ids)
            .await
            .map_err(interpret_email_message_error)?;
        let deleted = ids
            .into_iter()
            .filter(|id| !failures.iter().any(|f| &f.id == id))
            .collect();
        Ok(BatchOperationResult::new(deleted, failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_validation() {
        assert!(matches!(validate_batch(&[]), Err(EmailMessageError::InvalidArgument { .. })));
        let too_many: Vec<String> = (0..=EMAIL_MESSAGE_BATCH_LIMIT).map(|i| i.to_string()).collect();
        assert!(matches!(validate_batch(&too_many), Err(EmailMessageError::LimitExceeded { .. })));
        let ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(validate_batch(&ids).unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
