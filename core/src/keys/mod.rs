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

//! Key store adapter: device key pairs, symmetric keys and their secure storage.

pub mod algorithm;
pub mod archive;
pub mod error;
pub mod manager;
pub mod secure_store;

pub use algorithm::{
    PublicKeyEncryptionAlgorithm, SymmetricKeyEncryptionAlgorithm, IV_SIZE, KEY_WRAP_SIZE,
    RSA_KEY_BITS, SYMMETRIC_KEY_SIZE,
};
pub use error::{DeviceKeyManagerError, SecureStoreError};
pub use manager::{parse_public_key, DefaultDeviceKeyManager, DeviceKeyManager, KeyPair};
pub use secure_store::{KeyringSecureStore, MemorySecureStore, SecureStore};
