//! Schema validation for finalized records.
//!
//! Runs only after the resolution pass has finished mutating records,
//! never on provisional state. Every failure is fatal to the run; the
//! dataset is all-or-nothing.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  ident,
  model::{REFERENCE_URL_PREFIX, RecordKind},
};

/// The record's serialized key set must equal exactly
/// required ∪ optional ∪ reference ∪ {id}. The error names the symmetric
/// difference so a schema drift is diagnosable from the log alone.
pub fn validate_fields(kind: RecordKind, record: &Map<String, Value>) -> Result<()> {
  let mut allowed: BTreeSet<&str> = BTreeSet::new();
  allowed.insert("id");
  allowed.extend(kind.required());
  allowed.extend(kind.optional());
  allowed.extend(kind.reference());

  let present: BTreeSet<&str> = record.keys().map(String::as_str).collect();
  if present == allowed {
    return Ok(());
  }
  Err(Error::FieldSet {
    unexpected: present.difference(&allowed).map(|s| s.to_string()).collect(),
    missing:    allowed.difference(&present).map(|s| s.to_string()).collect(),
  })
}

/// Enforce the 2–3 element `urls` shape: canonical self URL, source page
/// URL under the kind's domain prefix, optional external reference URL.
pub fn validate_urls(kind: RecordKind, record: &Map<String, Value>) -> Result<()> {
  // Field-set validation guarantees `id` exists by the time this runs.
  let id = record.get("id").and_then(Value::as_str).unwrap_or("?");
  let bad = |detail: &str| Error::InvalidUrls {
    id:     id.to_string(),
    detail: detail.to_string(),
  };

  let urls = record
    .get("urls")
    .and_then(Value::as_array)
    .ok_or_else(|| bad("urls is not an array"))?;
  if !(2..=3).contains(&urls.len()) {
    return Err(bad(&format!("expected 2-3 urls, got {}", urls.len())));
  }
  let url = |i: usize| urls[i].as_str().unwrap_or("");

  if url(0) != ident::profile_url(id) {
    return Err(bad("urls[0] is not the canonical self URL"));
  }
  if !url(1).starts_with(kind.source_url_prefix()) {
    return Err(bad("urls[1] is not a source page URL"));
  }
  if urls.len() == 3 && !url(2).starts_with(REFERENCE_URL_PREFIX) {
    return Err(bad("urls[2] is not a reference URL"));
  }
  Ok(())
}

/// No two records may share a value in any of `fields`. The first collision
/// is fatal and names both offenders.
pub fn validate_unique(
  records: &[Map<String, Value>],
  fields: &[&str],
) -> Result<()> {
  for field in fields {
    let mut seen: HashMap<String, String> = HashMap::new();
    for record in records {
      let Some(value) = record.get(*field) else {
        continue;
      };
      let value = value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string);
      let label = describe(record);
      if let Some(first) = seen.insert(value.clone(), label.clone()) {
        return Err(Error::Duplicate {
          field: field.to_string(),
          value,
          first,
          second: label,
        });
      }
    }
  }
  Ok(())
}

/// Per-record field-set and URL validation, then the uniqueness pass over
/// the kind's unique fields.
pub fn validate_all<T: Serialize>(kind: RecordKind, records: &[T]) -> Result<()> {
  let mut objects = Vec::with_capacity(records.len());
  for record in records {
    let Value::Object(object) = serde_json::to_value(record)? else {
      return Err(Error::NotAnObject);
    };
    validate_fields(kind, &object)?;
    validate_urls(kind, &object)?;
    objects.push(object);
  }
  validate_unique(&objects, kind.unique())
}

fn describe(record: &Map<String, Value>) -> String {
  let name = record.get("name").and_then(Value::as_str).unwrap_or("?");
  let id = record.get("id").and_then(Value::as_str).unwrap_or("?");
  format!("{name} ({id})")
}
