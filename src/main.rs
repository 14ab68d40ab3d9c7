mod api;
mod app;
mod auth;
mod cache;
mod commands;
mod config;
mod event;
mod logging;
mod query;
mod residents;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "brgy")]
#[command(about = "Terminal dashboard for barangay resident records")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./brgy.yaml, then $XDG_CONFIG_HOME/brgy/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the registry API, overriding the config file
  #[arg(long)]
  api_url: Option<String>,

  /// Where to write logs (default: <data dir>/brgy/brgy.log)
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let log_path = match args.log_file {
    Some(path) => path,
    None => logging::default_log_path()?,
  };
  let _log_guard = logging::init(&log_path)?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref(), args.api_url.as_deref())?;
  info!(api = %config.api.url, style = ?config.api.endpoint_style, "starting brgy");

  let session = session::SessionStore::open()?;

  let mut app = app::App::new(config, session)?;
  app.run().await?;

  Ok(())
}
