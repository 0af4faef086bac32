//! Crawl orchestration for the kpopnet dataset builder.
//!
//! Ties the pipeline together: a [`fetch::Fetch`]-backed page fan-out
//! feeding the extractors, the post-crawl relationship resolution, schema
//! validation, and the two-encoding JSON emitter. The binary in
//! `kpopnet-cli` is a thin wrapper over [`driver::Crawler`] plus
//! [`CrawlConfig`].

pub mod driver;
pub mod emit;
pub mod error;
pub mod fetch;
pub mod resolve;
pub mod thumb;

pub use driver::Crawler;
pub use error::{Error, Result};

use std::path::PathBuf;

use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime crawl configuration, deserialised from `kpopnet.toml` and the
/// `KPOPNET_*` environment. Every key has a sensible default; an empty
/// config file is a valid one.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
  #[serde(default = "default_start_url")]
  pub start_url:      String,
  /// Directory receiving `kpopnet.json` / `kpopnet.min.json`.
  #[serde(default = "default_out_dir")]
  pub out_dir:        PathBuf,
  #[serde(default = "default_thumb_dir")]
  pub thumb_dir:      PathBuf,
  #[serde(default = "default_thumb_base_url")]
  pub thumb_base_url: String,
  #[serde(default = "default_overrides_path")]
  pub overrides_path: PathBuf,
  #[serde(default = "default_user_agent")]
  pub user_agent:     String,
}

impl Default for CrawlConfig {
  fn default() -> Self {
    Self {
      start_url:      default_start_url(),
      out_dir:        default_out_dir(),
      thumb_dir:      default_thumb_dir(),
      thumb_base_url: default_thumb_base_url(),
      overrides_path: default_overrides_path(),
      user_agent:     default_user_agent(),
    }
  }
}

fn default_start_url() -> String {
  format!("{}/noona/search/?pt=kpop", kpopnet_core::model::SOURCE_ORIGIN)
}

fn default_out_dir() -> PathBuf {
  PathBuf::from(".")
}

fn default_thumb_dir() -> PathBuf {
  PathBuf::from("thumb")
}

fn default_thumb_base_url() -> String {
  "https://up.kpop.re/net".to_string()
}

fn default_overrides_path() -> PathBuf {
  PathBuf::from("overrides.json")
}

fn default_user_agent() -> String {
  concat!("kpopnet/", env!("CARGO_PKG_VERSION")).to_string()
}
