// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Standard-alphabet base64 with `=` padding, carrying `bytes` fields
//! through JSON strings.

const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode bytes into base64 text.
pub fn encode(data: &[u8]) -> String {
    let mut result = String::new();
    let mut chunks = data.chunks(3);

    for chunk in &mut chunks {
        let mut buffer = [0u8; 3];
        buffer[..chunk.len()].copy_from_slice(chunk);

        result.push(TABLE[(buffer[0] >> 2) as usize] as char);
        result.push(TABLE[((buffer[0] & 0x03) << 4 | buffer[1] >> 4) as usize] as char);

        if chunk.len() > 1 {
            result.push(TABLE[((buffer[1] & 0x0F) << 2 | buffer[2] >> 6) as usize] as char);
        } else {
            result.push('=');
        }

        if chunk.len() > 2 {
            result.push(TABLE[(buffer[2] & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }
    }

    result
}

/// Decode padded base64 text. Returns `None` for text that is not
/// canonical base64: wrong length, foreign characters, or padding
/// anywhere but the tail.
pub fn decode(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    if bytes.len() % 4 != 0 {
        return None;
    }

    let mut out = Vec::with_capacity(bytes.len() / 4 * 3);
    let mut chunks = bytes.chunks(4).peekable();

    while let Some(chunk) = chunks.next() {
        let pad = chunk.iter().rev().take_while(|&&b| b == b'=').count();
        if pad > 2 || (pad > 0 && chunks.peek().is_some()) {
            return None;
        }

        let q0 = sextet(chunk[0])?;
        let q1 = sextet(chunk[1])?;
        out.push(q0 << 2 | q1 >> 4);
        if pad < 2 {
            let q2 = sextet(chunk[2])?;
            out.push(q1 << 4 | q2 >> 2);
            if pad < 1 {
                let q3 = sextet(chunk[3])?;
                out.push(q2 << 6 | q3);
            }
        }
    }

    Some(out)
}

fn sextet(encoded: u8) -> Option<u8> {
    match encoded {
        b'A'..=b'Z' => Some(encoded - b'A'),
        b'a'..=b'z' => Some(encoded - b'a' + 26),
        b'0'..=b'9' => Some(encoded - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}
