/// Block padding: between 1 and 16 bytes are always appended, each holding the
/// number of bytes appended. An aligned message gains a whole block of 0x10.
use crate::{SchemeError, BLOCK_SIZE};

pub fn pad_to_block(bytes: &[u8]) -> Vec<u8> {
    let n_pad = BLOCK_SIZE - bytes.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, n_pad as u8);
    out
}

/// Returns the padding length if `bytes` ends in well-formed padding.
pub fn padding_len(bytes: &[u8]) -> Option<u8> {
    let &n_pad = bytes.last()?;
    if n_pad == 0 || n_pad as usize > BLOCK_SIZE || n_pad as usize > bytes.len() {
        return None;
    }
    let padded = &bytes[(bytes.len() - n_pad as usize)..];
    if padded.iter().all(|&el| el == n_pad) {
        return Some(n_pad);
    }
    None
}

pub fn unpad(bytes: &mut Vec<u8>) -> Result<(), SchemeError> {
    let n_pad = padding_len(bytes).ok_or(SchemeError::BadPadding)?;
    bytes.truncate(bytes.len() - n_pad as usize);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("YELL", "YELL\x0c\x0c\x0c\x0c\x0c\x0c\x0c\x0c\x0c\x0c\x0c\x0c")]
    #[case("YELLOW SUBMARIN", "YELLOW SUBMARIN\x01")]
    #[case(
        "YELLOW SUBMARINE",
        "YELLOW SUBMARINE\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10"
    )]
    #[case("", "\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10\x10")]
    fn pad_to_block_pads_message(#[case] msg: &str, #[case] expected: &str) {
        let padded = pad_to_block(msg.as_bytes());

        assert_eq!(padded, expected.as_bytes());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(31)]
    #[case(32)]
    #[case(47)]
    fn padded_length_is_next_block_multiple(#[case] len: usize) {
        let padded = pad_to_block(&vec![0xAA; len]);

        assert_eq!(padded.len() % BLOCK_SIZE, 0);
        assert!(padded.len() > len);
        assert!(padded.len() - len <= BLOCK_SIZE);
    }

    #[test]
    fn unpad_unpads_message() {
        let mut msg = b"ICE ICE BABY\x04\x04\x04\x04".to_vec();

        let unpadded = unpad(&mut msg);

        assert!(unpadded.is_ok());
        assert_eq!(msg, b"ICE ICE BABY");
    }

    #[test]
    fn unpad_strips_full_padding_block() {
        let mut msg = pad_to_block(b"0123456789abcdef");

        unpad(&mut msg).unwrap();

        assert_eq!(msg, b"0123456789abcdef");
    }

    #[rstest]
    #[case(b"ICE ICE BABY\x05\x05\x05\x05")]
    #[case(b"ICE ICE BABY\x01\x02\x03\x04")]
    #[case(b"ICE ICE BABY\x03\x03\x03\x00")]
    #[case(b"ICE ICE BABY\x11\x11\x11\x11")]
    #[case(b"\x03\x03")]
    #[case(b"")]
    fn unpad_returns_err_given_invalid_padding(#[case] padded: &[u8]) {
        let mut msg = padded.to_vec();

        let unpadded = unpad(&mut msg);

        assert_eq!(unpadded, Err(SchemeError::BadPadding));
        assert_eq!(msg, padded);
    }
}
