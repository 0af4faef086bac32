//! Record finalization: overrides → required-field assertions → identity.
//!
//! A record arrives from the extractor as a loose JSON object holding only
//! the fields the page actually carried. [`normalize`] turns that into a
//! complete object (patched, checked, id-stamped, canonical-URL-prefixed)
//! and [`finish`] converts it into the typed record.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  ident,
  model::RecordKind,
  overrides::{OverrideRule, apply_overrides},
};

/// Normalize a provisional record in place.
///
/// Steps, in order: apply the first matching override rule; assert every
/// required field is present and non-empty (a failure here is a
/// data-quality bug, not a recoverable condition); default absent optional
/// fields to null; derive the id; prepend the canonical self URL.
pub fn normalize(
  kind: RecordKind,
  fields: &mut Map<String, Value>,
  rules: &[OverrideRule],
) -> Result<()> {
  apply_overrides(fields, rules);

  for field in kind.required() {
    if fields.get(*field).is_none_or(is_empty) {
      return Err(Error::MissingField { field });
    }
  }
  for field in kind.optional() {
    fields.entry(*field).or_insert(Value::Null);
  }

  let id = kind.gen_id(fields)?;
  if let Some(Value::Array(urls)) = fields.get_mut("urls") {
    urls.insert(0, Value::String(ident::profile_url(&id)));
  }
  fields.insert("id".to_string(), Value::String(id));
  Ok(())
}

/// Convert a normalized object into its typed record.
pub fn finish<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T> {
  Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Null, `""` and `[]` all count as missing for required-field purposes.
fn is_empty(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    Value::Array(items) => items.is_empty(),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::model::Idol;

  fn idol_fields() -> Map<String, Value> {
    let Value::Object(map) = json!({
      "name": "Boram",
      "name_original": "보람",
      "real_name": "Jeon Boram",
      "real_name_original": "전보람",
      "birth_date": "1986-03-22",
      "urls": ["https://selca.kastden.org/noona/idol/12"],
    }) else {
      unreachable!()
    };
    map
  }

  #[test]
  fn normalize_completes_a_minimal_idol() {
    let mut fields = idol_fields();
    normalize(RecordKind::Idol, &mut fields, &[]).unwrap();

    let id = fields["id"].as_str().unwrap();
    assert_eq!(id.len(), 12);
    let urls = fields["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(
      urls[0].as_str().unwrap(),
      format!("https://net.kpop.re/?id={id}")
    );
    for optional in RecordKind::Idol.optional() {
      assert_eq!(fields[*optional], Value::Null, "{optional} defaults null");
    }

    let idol: Idol = finish(fields).unwrap();
    assert!(idol.groups.is_empty());
  }

  #[test]
  fn normalize_is_stable_across_unrelated_edits() {
    let mut a = idol_fields();
    let mut b = idol_fields();
    b.insert("height".to_string(), json!(152.8));
    b.insert("name".to_string(), json!("BORAM"));
    normalize(RecordKind::Idol, &mut a, &[]).unwrap();
    normalize(RecordKind::Idol, &mut b, &[]).unwrap();
    assert_eq!(a["id"], b["id"], "id binds to identity fields only");
  }

  #[test]
  fn missing_required_field_fails_hard() {
    let mut fields = idol_fields();
    fields.remove("real_name");
    let err = normalize(RecordKind::Idol, &mut fields, &[]).unwrap_err();
    assert!(matches!(
      err,
      Error::MissingField { field: "real_name" }
    ));
  }

  #[test]
  fn empty_string_counts_as_missing() {
    let mut fields = idol_fields();
    fields.insert("name".to_string(), json!(""));
    assert!(normalize(RecordKind::Idol, &mut fields, &[]).is_err());
  }

  #[test]
  fn override_can_supply_a_missing_required_field() {
    let mut fields = idol_fields();
    fields.remove("real_name");
    let rules: Vec<_> = vec![
      serde_json::from_value(json!({
        "match": { "name": "Boram" },
        "update": { "real_name": "Jeon Boram" },
      }))
      .unwrap(),
    ];
    normalize(RecordKind::Idol, &mut fields, &rules).unwrap();
    assert_eq!(fields["real_name"], json!("Jeon Boram"));
  }

  #[test]
  fn group_id_binds_to_original_name_only() {
    let Value::Object(mut a) = json!({
      "name": "T-ara",
      "name_original": "티아라",
      "agency_name": "MBK Entertainment",
      "urls": ["https://selca.kastden.org/noona/group/7"],
    }) else {
      unreachable!()
    };
    let mut b = a.clone();
    b.insert("agency_name".to_string(), json!("Someone Else"));
    normalize(RecordKind::Group, &mut a, &[]).unwrap();
    normalize(RecordKind::Group, &mut b, &[]).unwrap();
    assert_eq!(a["id"], b["id"]);
  }
}
