/*
 * algorithm.rs
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

//! Algorithm identifiers and key sizes.
//!
//! The identifier strings are persisted in sealed records and object metadata, so they must
//! not change.

use strum::{AsRefStr, Display, EnumString};

/// Length of an RSA-2048 OAEP-wrapped AES key at the head of an envelope.
pub const KEY_WRAP_SIZE: usize = 256;
pub const RSA_KEY_BITS: usize = 2048;
/// AES-256.
pub const SYMMETRIC_KEY_SIZE: usize = 32;
pub const IV_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr, Display)]
pub enum SymmetricKeyEncryptionAlgorithm {
    #[default]
    #[strum(serialize = "AES/CBC/PKCS7Padding")]
    AesCbcPkcs7Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr, Display)]
pub enum PublicKeyEncryptionAlgorithm {
    /// Also accepted under the name used in secure package key exchange parts.
    #[default]
    #[strum(to_string = "RSA/ECB/OAEPWithSHA-1AndMGF1Padding", serialize = "RSAEncryptionOAEPAESCBC")]
    RsaEcbOaepSha1,
    #[strum(serialize = "RSA/ECB/PKCS1Padding")]
    RsaEcbPkcs1,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn identifiers_round_trip() {
        assert_eq!(
            SymmetricKeyEncryptionAlgorithm::from_str("AES/CBC/PKCS7Padding").unwrap(),
            SymmetricKeyEncryptionAlgorithm::AesCbcPkcs7Padding
        );
        assert_eq!(
            PublicKeyEncryptionAlgorithm::RsaEcbPkcs1.as_ref(),
            "RSA/ECB/PKCS1Padding"
        );
        assert!(SymmetricKeyEncryptionAlgorithm::from_str("AES/GCM/NoPadding").is_err());
        assert_eq!(
            PublicKeyEncryptionAlgorithm::from_str("RSAEncryptionOAEPAESCBC").unwrap(),
            PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1
        );
        assert_eq!(
            PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1.to_string(),
            "RSA/ECB/OAEPWithSHA-1AndMGF1Padding"
        );
    }
}
