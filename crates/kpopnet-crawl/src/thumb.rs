//! Content-addressed thumbnail store.
//!
//! One jpg per record, stored under a two-level directory sharded by hash
//! prefix. Writes are idempotent: identical bytes always land on the same
//! path, so concurrent side-load tasks never conflict.

use std::path::PathBuf;

use image::ImageFormat;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

pub struct ThumbStore {
  dir:      PathBuf,
  base_url: String,
}

impl ThumbStore {
  pub fn new(dir: PathBuf, base_url: impl Into<String>) -> Self {
    Self { dir, base_url: base_url.into() }
  }

  /// Verify `bytes` decode as a JPEG, persist them content-addressed, and
  /// return the stable external URL for the stored file.
  pub fn store(&self, bytes: &[u8]) -> Result<String> {
    if image::guess_format(bytes)? != ImageFormat::Jpeg {
      return Err(Error::NotJpeg);
    }
    // Sniffing only checks magic bytes; decode to reject truncated files.
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;

    let hash = hex::encode(Sha256::digest(bytes));
    let (shard, rest) = hash.split_at(2);
    let shard_dir = self.dir.join(shard);
    std::fs::create_dir_all(&shard_dir)?;

    let file = shard_dir.join(format!("{rest}.jpg"));
    if !file.exists() {
      std::fs::write(&file, bytes)?;
    }
    Ok(format!("{}/{shard}/{rest}.jpg", self.base_url))
  }
}
