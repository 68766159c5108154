use std::{fs, path::PathBuf};

use anyhow::Context;
use cbc_oracle::Encoding;
use clap::Parser;

/// Converts a file between raw text and hex.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[arg(short, long, default_value = "input.txt")]
    input: PathBuf,
    #[arg(short, long, default_value = "plaintext.txt")]
    output: PathBuf,
    /// Decode hex input back to raw bytes.
    #[arg(long)]
    from_hex: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let input = fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let output = if args.from_hex {
        let text = String::from_utf8(input).context("hex input is not text")?;
        Encoding::Hex.decode(&text)?
    } else {
        Encoding::Hex.encode(&input).into_bytes()
    };

    fs::write(&args.output, output).with_context(|| format!("writing {}", args.output.display()))
}
