/*
 * lib.rs
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

//! Sudomail core: device keys, sealing, end-to-end encrypted message packages, MIME
//! encoding and parsing, and the email use cases built on them.

pub mod config;
pub mod keys;
pub mod message;
pub mod mime;
pub mod sealing;
pub mod secure;
pub mod service;

pub use config::{ConfigError, EmailServiceConfig};
pub use keys::{DefaultDeviceKeyManager, DeviceKeyManager, DeviceKeyManagerError, KeyPair};
pub use message::{EmailAddressPublicInfo, EmailAttachment, EncryptionStatus, OutgoingMessage, SimplifiedEmailMessage};
pub use service::EmailClient;
