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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecureStoreError {
    #[error("keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("secure store index is corrupt: {0}")]
    CorruptIndex(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DeviceKeyManagerError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid secure key archive: {0}")]
    SecureKeyArchive(String),

    #[error("key operation failed: {0}")]
    KeyOperationFailed(String),

    #[error("secure store: {0}")]
    Storage(#[from] SecureStoreError),
}
