//! `campus`: drive the reputation engine against a SQLite file.
//!
//! # Usage
//!
//! ```text
//! campus user add Ada
//! campus post <user-id> "hello world"
//! campus --config campus.toml notifications list <user-id>
//! ```
//!
//! Every command prints its result as JSON.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use campus_engine::EngineConfig;
use campus_store_sqlite::SqliteStore;
use clap::Parser;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "campus", version, about = "Campus reputation engine")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "campus.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

/// Shape of the configuration file and `CAMPUS_*` environment.
#[derive(Debug, Deserialize)]
struct CliConfig {
  store_path: PathBuf,
  #[serde(default)]
  engine:     EngineConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays parseable.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("store_path", "campus.db")
    .context("failed to set config defaults")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CAMPUS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let output = commands::run(cli.command, store, cfg.engine).await?;
  println!(
    "{}",
    serde_json::to_string_pretty(&output).context("failed to encode output")?
  );

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/campus.db")), PathBuf::from(home).join("campus.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/campus.db")), PathBuf::from("/tmp/campus.db"));
  }

  #[test]
  fn commands_parse() {
    let cli = Cli::try_parse_from([
      "campus",
      "vote",
      "00000000-0000-0000-0000-000000000001",
      "post",
      "00000000-0000-0000-0000-000000000002",
      "-1",
    ])
    .unwrap();
    assert!(matches!(cli.command, Command::Vote { value: -1, .. }));

    let cli = Cli::try_parse_from(["campus", "-c", "other.toml", "user", "add", "Ada"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("other.toml"));
  }
}
