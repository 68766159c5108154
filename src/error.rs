use std::time::Duration;

use thiserror::Error;

/// Structural problems with a ciphertext, detected before any cryptography.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LengthError {
    #[error("ciphertext of {0} bytes is shorter than an IV plus one block")]
    TooShort(usize),
    #[error("ciphertext body of {0} bytes is not a multiple of the block size")]
    Unaligned(usize),
}

/// Failures of the authenticated decryption.
///
/// The `Display` strings of `BadPadding` and `BadMac` are the literal status
/// lines printed by the oracle binaries and matched by the oracle adapters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SchemeError {
    #[error(transparent)]
    Length(#[from] LengthError),
    #[error("INVALID PADDING")]
    BadPadding,
    #[error("INVALID MAC")]
    BadMac,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid decimal octet '{0}'")]
    Octet(String),
    #[error("key must be 64 hex characters, got {0}")]
    KeyLength(usize),
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle query timed out after {0:?}")]
    Timeout(Duration),
    #[error("oracle rejected the probe: {0}")]
    Rejected(String),
    #[error("oracle i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AttackError {
    #[error(transparent)]
    Length(#[from] LengthError),
    #[error("oracle unavailable while attacking block {block}: {source}")]
    OracleUnavailable {
        block: usize,
        #[source]
        source: OracleError,
    },
    #[error("no candidate produced valid padding at position {position} of block {block}")]
    NoValidByte { block: usize, position: usize },
    #[error("recovered plaintext of {len} bytes cannot hold {pad_len} padding bytes and a tag")]
    MalformedRecovery { len: usize, pad_len: u8 },
    #[error("attack task aborted: {0}")]
    Aborted(String),
}
