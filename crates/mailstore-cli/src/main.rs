//! Mailstore import command entry point.

use std::error::Error;

use mailstore_cli::config::Config;
use mailstore_cli::import;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = Config::from_env()?;
    tracing::info!(input = ?config.input, id_format = ?config.id_format, "starting import");

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &config.input {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let report = import::run(reader, config.id_format)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "import failed"))?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
