/*
 * quoted_printable.rs
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

//! Quoted-Printable Content-Transfer-Encoding (RFC 2045 section 6.7).

const MAX_LINE: usize = 76;
const HEX: &[u8; 16] = b"0123456789ABCDEF";

const HEX_DECODE: [i8; 256] = {
    let mut t = [-1i8; 256];
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = i as i8;
        i = i.wrapping_add(1);
    }
    let mut i = 0u8;
    while i < 6 {
        t[(b'A' + i) as usize] = (10 + i) as i8;
        t[(b'a' + i) as usize] = (10 + i) as i8;
        i = i.wrapping_add(1);
    }
    t
};

/// Decode quoted-printable. Handles =XX escapes and soft line breaks (=CRLF, =LF).
/// A stray `=` that does not start a valid escape is kept literally.
pub fn decode(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    let mut pos = 0;
    while pos < src.len() {
        let b = src[pos];
        if b != b'=' {
            out.push(b);
            pos += 1;
            continue;
        }
        let rest = &src[pos + 1..];
        if rest.starts_with(b"\r\n") {
            pos += 3;
        } else if rest.starts_with(b"\n") {
            pos += 2;
        } else if rest.len() >= 2 {
            let v1 = HEX_DECODE[rest[0] as usize];
            let v2 = HEX_DECODE[rest[1] as usize];
            if v1 >= 0 && v2 >= 0 {
                out.push(((v1 << 4) | v2) as u8);
                pos += 3;
            } else {
                out.push(b);
                pos += 1;
            }
        } else {
            out.push(b);
            pos += 1;
        }
    }
    out
}

/// Encode to quoted-printable with CRLF hard breaks and soft breaks keeping lines within 76
/// characters. Input line breaks (LF or CRLF) become CRLF.
pub fn encode(src: &[u8]) -> String {
    let mut out = String::with_capacity(src.len() + src.len() / 8);
    let mut line_len = 0;
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        if b == b'\r' && src.get(i + 1) == Some(&b'\n') {
            i += 1;
            continue;
        }
        if b == b'\n' {
            out.push_str("\r\n");
            line_len = 0;
            i += 1;
            continue;
        }
        let at_line_end = matches!(src.get(i + 1), None | Some(b'\n') | Some(b'\r'));
        let literal = ((b == b' ' || b == b'\t') && !at_line_end)
            || ((b'!'..=b'~').contains(&b) && b != b'=');
        let width = if literal { 1 } else { 3 };
        if line_len + width > MAX_LINE - 1 {
            out.push_str("=\r\n");
            line_len = 0;
        }
        if literal {
            out.push(b as char);
        } else {
            out.push('=');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
        line_len += width;
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escapes_and_soft_breaks() {
        assert_eq!(decode(b"caf=C3=A9 =\r\nau lait"), "café au lait".as_bytes());
        assert_eq!(decode(b"a=\nb"), b"ab");
        assert_eq!(decode(b"100=%"), b"100=%");
    }

    #[test]
    fn encodes_trailing_space_and_equals() {
        assert_eq!(encode(b"a = b "), "a =3D b=20");
        assert_eq!(encode("é".as_bytes()), "=C3=A9");
    }

    #[test]
    fn long_lines_are_soft_wrapped() {
        let text = "x".repeat(200);
        let encoded = encode(text.as_bytes());
        assert!(encoded.split("\r\n").all(|l| l.len() <= MAX_LINE));
        assert_eq!(decode(encoded.as_bytes()), text.as_bytes());
    }

    #[test]
    fn line_breaks_become_crlf() {
        assert_eq!(encode(b"one\ntwo\r\nthree"), "one\r\ntwo\r\nthree");
    }
}
