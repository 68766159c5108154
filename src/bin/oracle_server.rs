use anyhow::Context;
use cbc_oracle::{serve, Key, OracleRequestHandler, ORACLE_ROUTE};
use clap::Parser;
use log::info;
use tokio::net::TcpListener;

/// Serves the padding oracle over HTTP.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Key as 64 hex characters.
    #[arg(short, long, env = "ORACLE_KEY", hide_env_values = true)]
    key: Key,
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    info!("oracle listening on http://{}{ORACLE_ROUTE}", listener.local_addr()?);

    serve(listener, OracleRequestHandler::new(args.key))
        .await
        .context("oracle server failed")
}
