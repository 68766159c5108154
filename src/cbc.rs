// AES-128 in CBC mode.
//
//                  C_i = E(C_{i-1} ⊕ P_i),    C_{-1} = IV
//                  P_i = D(C_i) ⊕ C_{i-1}
//
// Neither function pads; callers hand in block-aligned buffers.
use aes::{
    cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit},
    Aes128,
};

use crate::LengthError;

pub const BLOCK_SIZE: usize = 16;

pub type Block = [u8; BLOCK_SIZE];

pub fn xor_blocks(a: &Block, b: &Block) -> Block {
    let mut out = *a;
    out.iter_mut().zip(b).for_each(|(x, y)| *x ^= y);
    out
}

struct BlockCipher(Aes128);

impl BlockCipher {
    fn new(key: &Block) -> Self {
        Self(Aes128::new(GenericArray::from_slice(key)))
    }

    fn encrypt_block(&self, block: Block) -> Block {
        let mut buf = aes::Block::from(block);
        self.0.encrypt_block(&mut buf);
        to_block(&buf)
    }

    fn decrypt_block(&self, block: Block) -> Block {
        let mut buf = aes::Block::from(block);
        self.0.decrypt_block(&mut buf);
        to_block(&buf)
    }
}

fn check_aligned(bytes: &[u8]) -> Result<(), LengthError> {
    if bytes.len() % BLOCK_SIZE != 0 {
        return Err(LengthError::Unaligned(bytes.len()));
    }
    Ok(())
}

fn to_block(chunk: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(chunk);
    block
}

pub fn encrypt_aes_128_cbc(
    plaintext: &[u8],
    key: &Block,
    iv: &Block,
) -> Result<Vec<u8>, LengthError> {
    check_aligned(plaintext)?;
    let cipher = BlockCipher::new(key);
    let mut ciphertext = Vec::with_capacity(plaintext.len());

    let mut last_block = *iv;
    for plaintext_block in plaintext.chunks_exact(BLOCK_SIZE) {
        let message_buf = xor_blocks(&to_block(plaintext_block), &last_block);
        let ciphertext_block = cipher.encrypt_block(message_buf);
        ciphertext.extend_from_slice(&ciphertext_block);
        last_block = ciphertext_block;
    }
    Ok(ciphertext)
}

pub fn decrypt_aes_128_cbc(
    ciphertext: &[u8],
    key: &Block,
    iv: &Block,
) -> Result<Vec<u8>, LengthError> {
    check_aligned(ciphertext)?;
    let cipher = BlockCipher::new(key);
    let mut message = Vec::with_capacity(ciphertext.len());

    let mut last_block = *iv;
    for ciphertext_block in ciphertext.chunks_exact(BLOCK_SIZE) {
        // Chain on the ciphertext block, captured before it is decrypted.
        let ciphertext_buf = to_block(ciphertext_block);
        let intermediate = cipher.decrypt_block(ciphertext_buf);
        message.extend_from_slice(&xor_blocks(&intermediate, &last_block));
        last_block = ciphertext_buf;
    }
    Ok(message)
}
