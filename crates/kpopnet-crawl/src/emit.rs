//! Dataset serialization.
//!
//! Two encodings of the same data: `kpopnet.json` for humans,
//! `kpopnet.min.json` for consumers. Both use deterministic sorted key
//! order (records round-trip through `serde_json::Value`, whose object is
//! a BTreeMap) and keep non-ASCII text literal. Output is all-or-nothing:
//! stale files are removed at run start and new ones written only after
//! validation has passed.

use std::path::Path;

use kpopnet_core::Profiles;

use crate::Result;

pub const OUT_JSON: &str = "kpopnet.json";
pub const OUT_MIN_JSON: &str = "kpopnet.min.json";

/// Remove the previous run's output files, if any.
pub fn cleanup(dir: &Path) -> Result<()> {
  for name in [OUT_JSON, OUT_MIN_JSON] {
    match std::fs::remove_file(dir.join(name)) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(e.into()),
    }
  }
  Ok(())
}

/// Write both encodings. Call only after validation.
pub fn write(dir: &Path, profiles: &Profiles) -> Result<()> {
  let value = serde_json::to_value(profiles)?;
  std::fs::write(dir.join(OUT_JSON), serde_json::to_string_pretty(&value)?)?;
  std::fs::write(dir.join(OUT_MIN_JSON), serde_json::to_string(&value)?)?;
  Ok(())
}
