use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use cbc_oracle::{
    decode_auto, strip_recovered, Attack, AttackConfig, CommandOracle, Encoding, HttpOracle,
    PaddingOracle, ProbeFill, Serialized,
};
use clap::Parser;
use log::info;

/// Recovers the plaintext of an authenticated ciphertext through a padding
/// oracle.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Ciphertext file, IV first, as hex or decimal octets.
    #[arg(short, long, default_value = "ciphertext.txt")]
    input: PathBuf,
    #[arg(short, long, default_value = "restored-plaintext.txt")]
    output: PathBuf,
    /// Encoding the oracle expects; the recovered plaintext is written in it too.
    #[arg(long, value_enum, default_value_t = Encoding::Hex)]
    mode: Encoding,
    /// Oracle program, run as `<program> <oracle-arg>.. -i <probe file>`.
    #[arg(long, default_value = "./decrypt-test")]
    oracle: PathBuf,
    #[arg(long = "oracle-arg", allow_hyphen_values = true)]
    oracle_args: Vec<String>,
    /// URL of an HTTP oracle, used instead of the oracle program.
    #[arg(long, conflicts_with_all = ["oracle", "oracle_args"])]
    url: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Send one query at a time.
    #[arg(long)]
    serialize: bool,
    /// Take the first accepted candidate for the last byte of each block.
    #[arg(long)]
    bug_compatible: bool,
    /// Start each forged block from the real previous block instead of
    /// random bytes.
    #[arg(long)]
    preserve_fill: bool,
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn attack_config(&self) -> AttackConfig {
        let mut config = AttackConfig::default().bug_compatible(self.bug_compatible);
        if self.preserve_fill {
            config = config.with_fill(ProbeFill::Preserve);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_query_timeout(Duration::from_millis(ms));
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn oracle(&self) -> Arc<dyn PaddingOracle> {
        let oracle: Arc<dyn PaddingOracle> = match &self.url {
            Some(url) => Arc::new(HttpOracle::new(url.clone(), self.mode)),
            None => Arc::new(
                CommandOracle::new(&self.oracle, self.mode).args(self.oracle_args.iter().cloned()),
            ),
        };
        if self.serialize {
            return Arc::new(Serialized::new(oracle));
        }
        oracle
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let ciphertext = decode_auto(&text).context("decoding ciphertext")?;

    let oracle = args.oracle();
    let mut attack = Attack::new(oracle.as_ref(), &ciphertext, args.attack_config())
        .context("invalid ciphertext")?;
    info!("attacking {} blocks", attack.n_blocks() - 1);
    attack.run().await.context("attack failed")?;
    let plaintext = strip_recovered(attack.padded_plaintext())?;
    info!(
        "recovered {} bytes in {} oracle queries",
        plaintext.len(),
        attack.queries()
    );

    fs::write(&args.output, args.mode.encode(&plaintext))
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
