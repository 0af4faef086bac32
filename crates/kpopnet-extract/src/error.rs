//! Error types for `kpopnet-extract`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no profile table on page {url}")]
  MissingProfileTable { url: String },

  #[error("membership row without a group link on page {url}")]
  MissingGroupLink { url: String },

  #[error("parent row without a group link on page {url}")]
  MissingParentLink { url: String },

  #[error("thumbnail source is not a jpg: {src}")]
  BadThumbSource { src: String },

  #[error(transparent)]
  Core(#[from] kpopnet_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
