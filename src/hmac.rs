use crate::{Hasher, SHA256_LEN};

const BLOCK_SIZE: usize = 64;
const O_PAD: [u8; BLOCK_SIZE] = [0x5c; BLOCK_SIZE];
const I_PAD: [u8; BLOCK_SIZE] = [0x36; BLOCK_SIZE];

pub type HmacSha256 = Hmac<sha2::Sha256, SHA256_LEN>;

#[derive(Debug, Clone)]
pub struct Hmac<H: Hasher<N>, const N: usize> {
    inner_hasher: H,
    outer_hasher: H,
}

impl<H: Hasher<N>, const N: usize> Hmac<H, N> {
    pub fn new(key: &[u8]) -> Self {
        let key_block = Self::to_block_sized_key(key);

        let mut inner_hasher = H::default();
        inner_hasher.update(&xor_pad(&key_block, &I_PAD));

        let mut outer_hasher = H::default();
        outer_hasher.update(&xor_pad(&key_block, &O_PAD));

        Self {
            inner_hasher,
            outer_hasher,
        }
    }

    pub fn digest_message(key: &[u8], message: &[u8]) -> [u8; N] {
        let mut hmac = Self::new(key);
        hmac.update(message);
        hmac.digest()
    }

    pub fn update(&mut self, message: &[u8]) {
        self.inner_hasher.update(message);
    }

    pub fn digest(self) -> [u8; N] {
        self.outer_hasher
            .update_and_digest(&self.inner_hasher.digest())
    }

    /// Keys longer than a block are hashed first; shorter keys are zero-padded.
    fn to_block_sized_key(var_len_key: &[u8]) -> [u8; BLOCK_SIZE] {
        let mut key = [0; BLOCK_SIZE];
        if var_len_key.len() > BLOCK_SIZE {
            key[..N].copy_from_slice(&H::digest_message(var_len_key));
        } else {
            key[..var_len_key.len()].copy_from_slice(var_len_key);
        }
        key
    }
}

fn xor_pad(key: &[u8; BLOCK_SIZE], pad: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut out = *key;
    out.iter_mut().zip(pad).for_each(|(k, p)| *k ^= p);
    out
}

/// Compares two tags without exiting early on the first differing byte.
pub fn tags_match(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    use hmac::Mac;
    use rstest::rstest;

    #[test]
    fn hmac_sha256_returns_correct_mac() {
        let key = b"key";
        let message = b"The quick brown fox jumps over the lazy dog";

        let mac = HmacSha256::digest_message(key, message);

        let expected = "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8";
        assert_eq!(hex::encode(mac), expected);
    }

    #[rstest]
    #[case(
        &[0x0bu8; 20],
        b"Hi There",
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
    )]
    #[case(
        b"Jefe",
        b"what do ya want for nothing?",
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    )]
    #[case(
        &[0xaau8; 131],
        b"Test Using Larger Than Block-Size Key - Hash Key First",
        "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
    )]
    fn hmac_sha256_matches_rfc_4231(
        #[case] key: &[u8],
        #[case] message: &[u8],
        #[case] expected: &str,
    ) {
        let mac = HmacSha256::digest_message(key, message);

        assert_eq!(hex::encode(mac), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(16)]
    #[case(64)]
    #[case(65)]
    #[case(200)]
    fn hmac_sha256_agrees_with_reference_crate(#[case] key_len: usize) {
        let key: Vec<u8> = (0..key_len).map(|i| i as u8).collect();
        let message = b"attack at dawn";

        let mut reference = hmac::Hmac::<sha2::Sha256>::new_from_slice(&key).unwrap();
        reference.update(message);

        assert_eq!(
            HmacSha256::digest_message(&key, message).as_slice(),
            reference.finalize().into_bytes().as_slice()
        );
    }

    #[test]
    fn incremental_updates_match_one_shot_digest() {
        let mut hmac = HmacSha256::new(b"key");
        hmac.update(b"The quick brown fox ");
        hmac.update(b"jumps over the lazy dog");

        assert_eq!(
            hmac.digest(),
            HmacSha256::digest_message(b"key", b"The quick brown fox jumps over the lazy dog")
        );
    }

    #[rstest]
    #[case(b"abc", b"abc", true)]
    #[case(b"abc", b"abd", false)]
    #[case(b"abc", b"ab", false)]
    #[case(b"", b"", true)]
    fn tags_match_compares_whole_tag(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: bool) {
        assert_eq!(tags_match(a, b), expected);
    }
}
