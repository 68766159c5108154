use std::{fs, path::PathBuf};

use anyhow::Context;
use cbc_oracle::{decode_auto, decrypt, Key, Verdict};
use clap::Parser;
use log::debug;

/// Padding oracle: decrypts a probe file and prints only the outcome.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Key as 64 hex characters.
    #[arg(short, long, env = "ORACLE_KEY", hide_env_values = true)]
    key: Key,
    /// Probe as hex or decimal octets.
    #[arg(short, long)]
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let ciphertext = decode_auto(&text).context("decoding probe")?;
    let verdict = Verdict::try_from(decrypt(&ciphertext, &args.key)).context("checking probe")?;
    debug!("{} byte probe: {verdict}", ciphertext.len());

    println!("{verdict}");
    Ok(())
}
