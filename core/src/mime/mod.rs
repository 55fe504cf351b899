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

//! MIME message processing: an event-driven push parser, a typed part tree built from its
//! events, and the encoder and simplifier used by the email use cases.

mod address;
mod builder;
mod content_disposition;
mod content_id;
mod content_type;
mod error;
mod handler;
mod parameter;
mod parser;
mod part;
mod processor;
mod quoted_printable;
mod rfc2047;
mod simplified;
mod tree;
mod utils;

pub use address::{extract_address, format_address_list, split_address_list};
pub use builder::{
    encode_to_internet_message_data, format_message_id, ENCRYPTED_PLACEHOLDER_BODY,
    PLATFORM_ENCRYPTION, SECURE_EMAIL_HEADER,
};
pub use content_disposition::{parse_content_disposition, ContentDisposition};
pub use content_id::{parse_content_id, parse_content_id_list, ContentID};
pub use content_type::{parse_content_type, ContentType};
pub use error::MimeError;
pub use handler::{MimeHandler, MimeLocator, MimeParseError};
pub use parameter::Parameter;
pub use parser::MimeParser;
pub use part::{AttachmentPart, Headers, MimeMessage, MimePart, MultipartContainer, TextPart};
pub use processor::{replace_file_uris_with_cids, EmailMessageDataProcessor};
pub use rfc2047::{decode_encoded_words, encode_header_value};
pub use simplified::parse_internet_message_data;
pub use tree::parse_message;
pub use utils::{is_boundary_char, is_token, is_token_char, is_valid_boundary};
