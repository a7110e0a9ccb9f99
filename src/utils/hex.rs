//! Lowercase hex encoding for byte payloads.

use cashasm_derive::Error;
use std::fmt::Write;

/// Reasons a hex string cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum HexError {
    #[error("odd number of hex digits")]
    OddLength,
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },
}

/// Encodes bytes as lowercase hex without a prefix.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Decodes hex digits (either case, no prefix) into bytes.
pub fn decode(digits: &str) -> Result<Vec<u8>, HexError> {
    if let Some((position, digit)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigit { digit, position });
    }
    if !digits.len().is_multiple_of(2) {
        return Err(HexError::OddLength);
    }

    Ok(digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_lowercase() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encode(&[0x00, 0xab, 0xff]), "00abff");
    }

    #[test]
    fn decode_mixed_case() {
        assert_eq!(decode("00aBFf").unwrap(), vec![0x00, 0xab, 0xff]);
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_errors() {
        assert_eq!(decode("abc"), Err(HexError::OddLength));
        assert_eq!(
            decode("0g"),
            Err(HexError::InvalidDigit {
                digit: 'g',
                position: 1
            })
        );
    }
}
