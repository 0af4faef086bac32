//! Declarative data patches.
//!
//! The source pages occasionally carry transcription errors or omissions
//! that have to be corrected without forking the extraction logic. The
//! corrections live in `overrides.json` as ordered match/update rules and
//! are applied to the provisional record before any required-field check.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Result;

/// One match/update pair. `match` fields compare for exact equality against
/// the record; `update` fields shallow-merge into it.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRule {
  #[serde(rename = "match")]
  pub match_fields: Map<String, Value>,
  pub update:       Map<String, Value>,
}

/// The full override table, one rule list per record kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Overrides {
  #[serde(default)]
  pub idols:  Vec<OverrideRule>,
  #[serde(default)]
  pub groups: Vec<OverrideRule>,
}

/// Read the override table from disk.
pub fn load_overrides(path: &Path) -> Result<Overrides> {
  let raw = std::fs::read_to_string(path)?;
  Ok(serde_json::from_str(&raw)?)
}

/// Apply the first matching rule to `fields`. Later matching rules are
/// ignored; first match wins.
///
/// An `update` key of the form `urls[2]` addresses a single slot of an
/// array field, replacing it in place (or appending when the index is one
/// past the end).
pub fn apply_overrides(fields: &mut Map<String, Value>, rules: &[OverrideRule]) {
  for rule in rules {
    let matched = rule
      .match_fields
      .iter()
      .all(|(k, v)| fields.get(k) == Some(v));
    if !matched {
      continue;
    }
    for (key, value) in &rule.update {
      match parse_indexed_key(key) {
        Some((field, index)) => {
          if let Some(Value::Array(items)) = fields.get_mut(field) {
            if index < items.len() {
              items[index] = value.clone();
            } else {
              items.push(value.clone());
            }
          }
        }
        None => {
          fields.insert(key.clone(), value.clone());
        }
      }
    }
    break;
  }
}

/// Split `"urls[2]"` into `("urls", 2)`; plain keys return `None`.
fn parse_indexed_key(key: &str) -> Option<(&str, usize)> {
  let open = key.find('[')?;
  let inner = key[open + 1..].strip_suffix(']')?;
  let index = inner.parse().ok()?;
  Some((&key[..open], index))
}
