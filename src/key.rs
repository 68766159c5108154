use std::{fmt, str::FromStr};

use crate::{Block, DecodeError, BLOCK_SIZE};

pub const KEY_LEN: usize = 2 * BLOCK_SIZE;

/// A 32-byte scheme key: the first half keys AES, the second half keys the MAC.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    enc_key: Block,
    mac_key: Block,
}

impl Key {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        let mut enc_key = [0u8; BLOCK_SIZE];
        let mut mac_key = [0u8; BLOCK_SIZE];
        enc_key.copy_from_slice(&bytes[..BLOCK_SIZE]);
        mac_key.copy_from_slice(&bytes[BLOCK_SIZE..]);
        Self { enc_key, mac_key }
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, DecodeError> {
        let hex_key = hex_key.trim();
        if hex_key.len() != 2 * KEY_LEN {
            return Err(DecodeError::KeyLength(hex_key.len()));
        }
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex_key, &mut bytes)?;
        Ok(Self::new(bytes))
    }

    pub fn enc_key(&self) -> &Block {
        &self.enc_key
    }

    pub fn mac_key(&self) -> &Block {
        &self.mac_key
    }
}

impl FromStr for Key {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Keys stay out of logs.
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn from_hex_splits_key_in_half() {
        let key = Key::from_hex(
            "69e01355635fd7c8404f823ac591efefea4e0d4b7a72888d46a735149c86f852",
        )
        .unwrap();

        assert_eq!(
            hex::encode(key.enc_key()),
            "69e01355635fd7c8404f823ac591efef"
        );
        assert_eq!(
            hex::encode(key.mac_key()),
            "ea4e0d4b7a72888d46a735149c86f852"
        );
    }

    #[rstest]
    #[case("")]
    #[case("00")]
    #[case("69e01355635fd7c8404f823ac591efefea4e0d4b7a72888d46a735149c86f85")]
    #[case("69e01355635fd7c8404f823ac591efefea4e0d4b7a72888d46a735149c86f85200")]
    fn from_hex_rejects_wrong_length(#[case] hex_key: &str) {
        assert_eq!(
            Key::from_hex(hex_key),
            Err(DecodeError::KeyLength(hex_key.len()))
        );
    }

    #[test]
    fn from_hex_rejects_non_hex_characters() {
        let hex_key = "zz".repeat(KEY_LEN);

        assert!(matches!(Key::from_hex(&hex_key), Err(DecodeError::Hex(_))));
    }

    #[test]
    fn debug_output_hides_key_material() {
        let key = Key::new([0xAB; KEY_LEN]);

        assert_eq!(format!("{key:?}"), "Key(..)");
    }
}
