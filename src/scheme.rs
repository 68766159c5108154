// Authenticated encryption: MAC, then pad, then CBC encrypt.
//
// Decryption undoes the steps in reverse and reports a padding failure before
// the MAC is ever computed. That ordering is what makes the scheme a padding
// oracle.
use rand::RngCore;
use rayon::prelude::*;

use crate::{
    decrypt_aes_128_cbc, encrypt_aes_128_cbc, pad_to_block, tags_match, unpad, Block, HmacSha256,
    Key, LengthError, SchemeError, BLOCK_SIZE, SHA256_LEN,
};

pub const TAG_LEN: usize = SHA256_LEN;

pub fn random_iv() -> Block {
    let mut iv = [0u8; BLOCK_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

/// Number of blocks in `IV ‖ C`, IV included.
pub fn block_count(ciphertext: &[u8]) -> Result<usize, LengthError> {
    if ciphertext.len() < 2 * BLOCK_SIZE {
        return Err(LengthError::TooShort(ciphertext.len()));
    }
    let body_len = ciphertext.len() - BLOCK_SIZE;
    if body_len % BLOCK_SIZE != 0 {
        return Err(LengthError::Unaligned(body_len));
    }
    Ok(ciphertext.len() / BLOCK_SIZE)
}

pub fn encrypt(plaintext: &[u8], key: &Key) -> Vec<u8> {
    encrypt_with_iv(plaintext, key, &random_iv())
}

pub fn encrypt_with_iv(plaintext: &[u8], key: &Key, iv: &Block) -> Vec<u8> {
    let tag = HmacSha256::digest_message(key.mac_key(), plaintext);
    let padded = pad_to_block(&[plaintext, &tag].concat());
    let ciphertext = encrypt_aes_128_cbc(&padded, key.enc_key(), iv)
        .expect("padding aligns the message to the block size");
    [iv.as_slice(), &ciphertext].concat()
}

pub fn decrypt(ciphertext: &[u8], key: &Key) -> Result<Vec<u8>, SchemeError> {
    block_count(ciphertext)?;
    let (iv, body) = ciphertext.split_at(BLOCK_SIZE);
    let iv: Block = iv.try_into().map_err(|_| LengthError::TooShort(ciphertext.len()))?;

    let mut message = decrypt_aes_128_cbc(body, key.enc_key(), &iv)?;
    unpad(&mut message)?;

    if message.len() < TAG_LEN {
        return Err(SchemeError::BadMac);
    }
    let tag = message.split_off(message.len() - TAG_LEN);
    let expected_tag = HmacSha256::digest_message(key.mac_key(), &message);
    if !tags_match(&tag, &expected_tag) {
        return Err(SchemeError::BadMac);
    }
    Ok(message)
}

pub fn encrypt_batch<M: AsRef<[u8]> + Sync>(messages: &[M], key: &Key) -> Vec<Vec<u8>> {
    messages
        .par_iter()
        .map(|message| encrypt(message.as_ref(), key))
        .collect()
}

pub fn decrypt_batch<C: AsRef<[u8]> + Sync>(
    ciphertexts: &[C],
    key: &Key,
) -> Vec<Result<Vec<u8>, SchemeError>> {
    ciphertexts
        .par_iter()
        .map(|ciphertext| decrypt(ciphertext.as_ref(), key))
        .collect()
}
