use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use cbc_oracle::{decrypt, encrypt, Encoding, Key, SchemeError};
use clap::{Parser, Subcommand};
use log::info;

/// Authenticated AES-CBC encryption of hex files.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    operation: Operation,
}

#[derive(Subcommand)]
enum Operation {
    /// MAC, pad and encrypt a plaintext file.
    Encrypt(Files),
    /// Decrypt and authenticate a ciphertext file.
    Decrypt(Files),
}

#[derive(clap::Args)]
struct Files {
    /// Key as 64 hex characters.
    #[arg(short, long, env = "ORACLE_KEY", hide_env_values = true)]
    key: Key,
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
}

fn read_hex(path: &Path) -> anyhow::Result<Vec<u8>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Encoding::Hex
        .decode(&text).with_context(|| format!("decoding {}", path.display()))
}

fn write_hex(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(path, hex::encode(bytes)).with_context(|| format!("writing {}", path.display()))
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.operation {
        Operation::Encrypt(files) => {
            let plaintext = read_hex(&files.input)?;
            let ciphertext = encrypt(&plaintext, &files.key);
            write_hex(&files.output, &ciphertext)?;
            info!("encrypted {} bytes into {} bytes", plaintext.len(), ciphertext.len());
        }
        Operation::Decrypt(files) => {
            let ciphertext = read_hex(&files.input)?;
            match decrypt(&ciphertext, &files.key) {
                Ok(plaintext) => {
                    write_hex(&files.output, &plaintext)?;
                    info!("decrypted {} bytes", plaintext.len());
                }
                Err(e @ (SchemeError::BadPadding | SchemeError::BadMac)) => {
                    println!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e).context("malformed ciphertext"),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
