//! `kpopnet` binary.
//!
//! Reads `kpopnet.toml` (or the path specified with `--config`), merged
//! with `KPOPNET_*` environment variables, and runs the crawl pipeline.
//! Exits 0 with `kpopnet.json` / `kpopnet.min.json` written on success;
//! exits 1 with a banner on any failure, leaving no output behind.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kpopnet_core::overrides;
use kpopnet_crawl::{CrawlConfig, Crawler, emit, fetch::HttpFetcher, thumb::ThumbStore};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "kpopnet profile crawler")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "kpopnet.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Crawl the source site and emit the JSON dataset.
  Crawl,
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let result = match cli.command {
    Command::Crawl => crawl(cli.config).await,
  };

  if let Err(e) = result {
    tracing::error!("{e:#}");
    let banner = "@".repeat(50);
    eprintln!("\n{banner}\nERROR OCCURRED, PLEASE CHECK LOGS\n{banner}");
    std::process::exit(1);
  }
}

async fn crawl(config_path: PathBuf) -> anyhow::Result<()> {
  let settings = config::Config::builder()
    .add_source(config::File::from(config_path).required(false))
    .add_source(config::Environment::with_prefix("KPOPNET"))
    .build()
    .context("failed to read config")?;
  let cfg: CrawlConfig = settings
    .try_deserialize()
    .context("failed to deserialise CrawlConfig")?;

  // A failed run must never leave the previous dataset looking current.
  emit::cleanup(&cfg.out_dir).context("failed to remove stale output")?;

  let rules = overrides::load_overrides(&cfg.overrides_path)
    .with_context(|| {
      format!("failed to load overrides from {}", cfg.overrides_path.display())
    })?;
  let fetcher =
    HttpFetcher::new(&cfg.user_agent).context("failed to build fetcher")?;
  let thumbs =
    ThumbStore::new(cfg.thumb_dir.clone(), cfg.thumb_base_url.clone());

  let crawler = Crawler::new(fetcher, rules, thumbs);
  let profiles = crawler.run(&cfg.start_url).await.context("crawl failed")?;

  emit::write(&cfg.out_dir, &profiles).context("failed to write dataset")?;
  tracing::info!(
    idols = profiles.idols.len(),
    groups = profiles.groups.len(),
    "dataset written"
  );
  Ok(())
}
