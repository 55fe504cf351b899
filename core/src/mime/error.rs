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

//! Errors from encoding, parsing and processing email message data.

use thiserror::Error;

use crate::mime::handler::MimeParseError;
use crate::secure::EmailCryptoServiceError;

#[derive(Debug, Error)]
pub enum MimeError {
    #[error("malformed message: {0}")]
    Parse(#[from] MimeParseError),

    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),

    #[error("secure message processing failed: {0}")]
    Crypto(#[from] EmailCryptoServiceError),
}
