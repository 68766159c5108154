mod attack;
mod cbc;
mod codec;
mod error;
mod hash;
mod hmac;
mod key;
mod oracle;
mod padding;
mod scheme;
mod server;

pub use attack::{
    recover, recover_many, strip_recovered, Attack, AttackConfig, BlockStats, ProbeFill,
};
pub use cbc::{decrypt_aes_128_cbc, encrypt_aes_128_cbc, xor_blocks, Block, BLOCK_SIZE};
pub use codec::{decode_auto, Encoding};
pub use error::{AttackError, DecodeError, LengthError, OracleError, SchemeError};
pub use hash::{Hasher, SHA256_LEN};
pub use hmac::{tags_match, Hmac, HmacSha256};
pub use key::{Key, KEY_LEN};
pub use oracle::{
    CommandOracle, HttpOracle, LocalOracle, PaddingOracle, Serialized, Verdict,
    BAD_MAC_STATUS, BAD_PADDING_STATUS, SUCCESS_STATUS,
};
pub use padding::{pad_to_block, padding_len, unpad};
pub use scheme::{
    block_count, decrypt, decrypt_batch, encrypt, encrypt_batch, encrypt_with_iv, random_iv,
    TAG_LEN,
};
pub use server::{router, serve, spawn_server, OracleRequestHandler, ORACLE_ROUTE};
