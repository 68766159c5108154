// Text encodings for ciphertexts and probes crossing a process boundary.
//
// Hex is a plain lowercase string. Decimal is whitespace separated octets,
// optionally wrapped in brackets, e.g. "[12 255 0]".
use std::fmt;

use crate::DecodeError;

const BRACKETS: &[char] = &['[', ']', '{', '}', '(', ')'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    #[default]
    Hex,
    Decimal,
}

impl Encoding {
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => hex::encode(bytes),
            Encoding::Decimal => bytes
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn decode(self, text: &str) -> Result<Vec<u8>, DecodeError> {
        match self {
            Encoding::Hex => Ok(hex::decode(text.trim())?),
            Encoding::Decimal => decode_decimal(text),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Hex => f.write_str("hex"),
            Encoding::Decimal => f.write_str("decimal"),
        }
    }
}

/// Decodes hex if the text is valid hex, otherwise decimal octets.
pub fn decode_auto(text: &str) -> Result<Vec<u8>, DecodeError> {
    Encoding::Hex
        .decode(text)
        .or_else(|_| Encoding::Decimal.decode(text))
}

fn decode_decimal(text: &str) -> Result<Vec<u8>, DecodeError> {
    text.trim()
        .trim_matches(BRACKETS)
        .split_whitespace()
        .map(|token| {
            token
                .parse::<u8>()
                .map_err(|_| DecodeError::Octet(token.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(Encoding::Hex, &[0x00, 0x7f, 0xff], "007fff")]
    #[case(Encoding::Decimal, &[0x00, 0x7f, 0xff], "0 127 255")]
    #[case(Encoding::Hex, &[], "")]
    #[case(Encoding::Decimal, &[], "")]
    fn encode_formats_bytes(
        #[case] encoding: Encoding,
        #[case] bytes: &[u8],
        #[case] expected: &str,
    ) {
        assert_eq!(encoding.encode(bytes), expected);
        assert_eq!(encoding.decode(expected).unwrap(), bytes);
    }

    #[rstest]
    #[case("48656c6c6f", b"Hello")]
    #[case("48656C6C6F\n", b"Hello")]
    #[case("72 101 108 108 111", b"Hello")]
    #[case("[72 101 108 108 111]\n", b"Hello")]
    #[case("{72\n101\t108 108 111}", b"Hello")]
    #[case("", b"")]
    fn decode_auto_accepts_hex_and_decimal(#[case] text: &str, #[case] expected: &[u8]) {
        assert_eq!(decode_auto(text).unwrap(), expected);
    }

    #[test]
    fn decode_auto_prefers_hex_when_ambiguous() {
        assert_eq!(decode_auto("12").unwrap(), vec![0x12]);
    }

    #[rstest]
    #[case("256 1", "256")]
    #[case("12 -3", "-3")]
    #[case("hello world", "hello")]
    fn decode_auto_rejects_bad_octets(#[case] text: &str, #[case] bad_token: &str) {
        assert_eq!(
            decode_auto(text),
            Err(DecodeError::Octet(bad_token.to_string()))
        );
    }

    #[test]
    fn hex_decode_rejects_odd_length() {
        assert!(matches!(
            Encoding::Hex.decode("abc"),
            Err(DecodeError::Hex(_))
        ));
    }
}
