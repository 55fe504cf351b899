/*
 * error.rs
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

//! Use case errors and the mapping from service API errors.
//!
//! Variants produced from a service failure keep the [`ApiError`] as their source so the
//! GraphQL error type or transport cause stays reachable through `Error::source`.

use log::debug;
use thiserror::Error;

use super::api::ApiError;
use super::object_store::ObjectStoreError;
use crate::keys::DeviceKeyManagerError;
use crate::mime::MimeError;
use crate::sealing::UnsealerError;

pub const ERROR_TYPE_MESSAGE_NOT_FOUND: &str = "sudoplatform.email.EmailMessageNotFound";
pub const ERROR_TYPE_LIMIT_EXCEEDED: &str = "sudoplatform.LimitExceededError";
pub const ERROR_TYPE_INVALID_ARGUMENT: &str = "sudoplatform.email.InvalidArgumentError";
pub const ERROR_TYPE_UNAUTHORIZED_ADDRESS: &str = "sudoplatform.email.UnauthorizedAddress";
pub const ERROR_TYPE_MESSAGE_SIZE_LIMIT: &str = "sudoplatform.email.MessageSizeLimitExceededError";
pub const ERROR_TYPE_ADDRESS_NOT_FOUND: &str = "sudoplatform.email.AddressNotFound";
pub const ERROR_TYPE_INSUFFICIENT_ENTITLEMENTS: &str = "sudoplatform.InsufficientEntitlementsError";
pub const ERROR_TYPE_SERVICE: &str = "sudoplatform.ServiceError";

#[derive(Error, Debug)]
pub enum EmailMessageError {
    #[error("email message not found")]
    EmailMessageNotFound(#[source] ApiError),

    #[error("limit exceeded: {message}")]
    LimitExceeded {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error("address is not authorized to send")]
    UnauthorizedAddress(#[source] ApiError),

    #[error("message size limit exceeded: {message}")]
    MessageSizeLimitExceeded {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error("email address not found")]
    AddressNotFound(#[source] ApiError),

    #[error("insufficient entitlements")]
    InsufficientEntitlements(#[source] ApiError),

    #[error("not authenticated")]
    Authentication(#[source] ApiError),

    #[error("service error")]
    Service(#[source] ApiError),

    #[error("email message operation failed: {message}")]
    Failed {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error(transparent)]
    Unseal(#[from] UnsealerError),

    #[error(transparent)]
    Mime(#[from] MimeError),

    #[error(transparent)]
    KeyManager(#[from] DeviceKeyManagerError),

    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
}

impl EmailMessageError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        EmailMessageError::InvalidArgument {
            message: message.into(),
            source: None,
        }
    }

    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        EmailMessageError::LimitExceeded {
            message: message.into(),
            source: None,
        }
    }

    pub fn message_size_limit_exceeded(message: impl Into<String>) -> Self {
        EmailMessageError::MessageSizeLimitExceeded {
            message: message.into(),
            source: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        EmailMessageError::Failed {
            message: message.into(),
            source: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("email address not found")]
    EmailAddressNotFound(#[source] Option<ApiError>),

    #[error("draft {0} not found")]
    DraftNotFound(String),

    #[error("invalid argument: {message}")]
    InvalidArgument {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error("not authenticated")]
    Authentication(#[source] ApiError),

    #[error("draft operation failed: {message}")]
    Failed {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error(transparent)]
    Unseal(#[from] UnsealerError),

    #[error(transparent)]
    KeyManager(#[from] DeviceKeyManagerError),

    #[error(transparent)]
    ObjectStore(ObjectStoreError),
}

impl DraftError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DraftError::InvalidArgument {
            message: message.into(),
            source: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        DraftError::Failed {
            message: message.into(),
            source: None,
        }
    }
}

/// The service's own message for a GraphQL error, or the transport error's text.
fn service_message(error: &ApiError) -> String {
    match error {
        ApiError::GraphQl(e) => e.message.clone(),
        other => other.to_string(),
    }
}

/// Map a service API failure to the email message error it represents.
pub fn interpret_email_message_error(error: ApiError) -> EmailMessageError {
    debug!("interpreting api error: {}", error);
    if matches!(error, ApiError::NotAuthorized) {
        return EmailMessageError::Authentication(error);
    }
    let message = service_message(&error);
    let error_type = error.error_type().map(str::to_owned);
    match error_type.as_deref() {
        Some(ERROR_TYPE_MESSAGE_NOT_FOUND) => EmailMessageError::EmailMessageNotFound(error),
        Some(ERROR_TYPE_LIMIT_EXCEEDED) => EmailMessageError::LimitExceeded {
            message,
            source: Some(error),
        },
        Some(ERROR_TYPE_INVALID_ARGUMENT) => EmailMessageError::InvalidArgument {
            message,
            source: Some(error),
        },
        Some(ERROR_TYPE_UNAUTHORIZED_ADDRESS) => EmailMessageError::UnauthorizedAddress(error),
        Some(ERROR_TYPE_MESSAGE_SIZE_LIMIT) => EmailMessageError::MessageSizeLimitExceeded {
            message,
            source: Some(error),
        },
        Some(ERROR_TYPE_ADDRESS_NOT_FOUND) => EmailMessageError::AddressNotFound(error),
        Some(ERROR_TYPE_INSUFFICIENT_ENTITLEMENTS) => EmailMessageError::InsufficientEntitlements(error),
        Some(ERROR_TYPE_SERVICE) => EmailMessageError::Service(error),
        _ => EmailMessageError::Failed {
            message,
            source: Some(error),
        },
    }
}

pub fn interpret_draft_error(error: ApiError) -> DraftError {
    debug!("interpreting api error: {}", error);
    if matches!(error, ApiError::NotAuthorized) {
        return DraftError::Authentication(error);
    }
    let message = service_message(&error);
    let error_type = error.error_type().map(str::to_owned);
    match error_type.as_deref() {
        Some(ERROR_TYPE_ADDRESS_NOT_FOUND) => DraftError::EmailAddressNotFound(Some(error)),
        Some(ERROR_TYPE_INVALID_ARGUMENT) => DraftError::InvalidArgument {
            message,
            source: Some(error),
        },
        _ => DraftError::Failed {
            message,
            source: Some(error),
        },
    }
}

impl From<ObjectStoreError> for DraftError {
    fn from(error: ObjectStoreError) -> Self {
        match error {
            ObjectStoreError::NotFound(key) => DraftError::DraftNotFound(key),
            other => DraftError::ObjectStore(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;
    use crate::service::api::GraphQlError;

    fn graphql(error_type: &str) -> ApiError {
        ApiError::GraphQl(GraphQlError {
            message: "boom".to_string(),
            error_type: Some(error_type.to_string()),
        })
    }

    #[test]
    fn maps_typed_graphql_errors() {
        assert!(matches!(
            interpret_email_message_error(graphql("sudoplatform.email.EmailMessageNotFound")),
            EmailMessageError::EmailMessageNotFound(_)
        ));
        assert!(matches!(
            interpret_email_message_error(graphql("sudoplatform.LimitExceededError")),
            EmailMessageError::LimitExceeded { message, .. } if message == "boom"
        ));
        assert!(matches!(
            interpret_email_message_error(graphql("sudoplatform.email.MessageSizeLimitExceededError")),
            EmailMessageError::MessageSizeLimitExceeded { .. }
        ));
        assert!(matches!(
            interpret_email_message_error(graphql("sudoplatform.InsufficientEntitlementsError")),
            EmailMessageError::InsufficientEntitlements(_)
        ));
        assert!(matches!(
            interpret_email_message_error(graphql("something.Else")),
            EmailMessageError::Failed { .. }
        ));
    }

    #[test]
    fn maps_transport_errors() {
        assert!(matches!(
            interpret_email_message_error(ApiError::NotAuthorized),
            EmailMessageError::Authentication(ApiError::NotAuthorized)
        ));
        assert!(matches!(
            interpret_draft_error(graphql("sudoplatform.email.AddressNotFound")),
            DraftError::EmailAddressNotFound(Some(_))
        ));
        assert!(matches!(
            DraftError::from(ObjectStoreError::NotFound("k".to_string())),
            DraftError::DraftNotFound(_)
        ));
    }

    #[test]
    fn graphql_cause_is_kept_as_source() {
        let error = interpret_email_message_error(graphql("sudoplatform.ServiceError"));
        let api = error
            .source()
            .and_then(|e| e.downcast_ref::<ApiError>())
            .expect("api error source");
        assert_eq!(api.error_type(), Some("sudoplatform.ServiceError"));
        let cause = api
            .source()
            .and_then(|e| e.downcast_ref::<GraphQlError>())
            .expect("graphql error source");
        assert_eq!(cause.message, "boom");

        let error = interpret_draft_error(graphql("sudoplatform.email.InvalidArgumentError"));
        assert!(matches!(error, DraftError::InvalidArgument { ref message, .. } if message == "boom"));
        assert!(error.source().is_some());
    }

    #[test]
    fn network_cause_is_kept_as_source() {
        let network = ApiError::Network(Box::new(io::Error::new(io::ErrorKind::TimedOut, "timed out")));
        let error = interpret_email_message_error(network);
        assert!(matches!(error, EmailMessageError::Failed { ref message, .. } if message.contains("timed out")));
        let cause = error
            .source()
            .and_then(|e| e.source())
            .and_then(|e| e.downcast_ref::<io::Error>())
            .expect("io error at the bottom of the chain");
        assert_eq!(cause.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn locally_raised_errors_have_no_source() {
        assert!(EmailMessageError::invalid_argument("no sender").source().is_none());
        assert!(DraftError::EmailAddressNotFound(None).source().is_none());
    }
}
