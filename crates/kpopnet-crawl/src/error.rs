//! Error types for `kpopnet-crawl`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] kpopnet_core::Error),

  #[error(transparent)]
  Extract(#[from] kpopnet_extract::Error),

  #[error("fetch error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("thumbnail bytes are not a JPEG")]
  NotJpeg,

  #[error("crawl task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  /// An idol page referenced a group URL no crawled group record carries.
  /// Indicates a crawl or extraction bug, never tolerable input.
  #[error("no group record for referenced url {url}")]
  DanglingGroupRef { url: String },

  #[error("member {idol_id} of sub-unit {group} not found in parent group")]
  MemberNotInParent { idol_id: String, group: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
