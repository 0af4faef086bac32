//! Stable record identity.
//!
//! Ids are content-derived: a SHA-256 digest truncated to 9 bytes and
//! encoded with the URL-safe base64 alphabet, giving a fixed 12-character
//! id that survives re-crawls and is safe to embed in query strings.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::model::PROFILE_URL_BASE;

/// Digest bytes kept for an id. 9 bytes encode to exactly 12 base64 chars
/// and leave collisions implausible at corpus scale.
const ID_BYTES: usize = 9;

/// Hash an identity key into a short, URL-safe id.
///
/// Pure: identical input always yields the identical id.
pub fn short_hash(input: &str) -> String {
  let digest = Sha256::digest(input.as_bytes());
  URL_SAFE_NO_PAD.encode(&digest[..ID_BYTES])
}

/// The canonical self URL for a record id, synthesized into `urls[0]`.
pub fn profile_url(id: &str) -> String {
  format!("{PROFILE_URL_BASE}{id}")
}
