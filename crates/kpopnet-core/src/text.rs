//! Value coercion helpers for scraped table cells.
//!
//! The source site embeds its data in free text ("1986-03-22 (age 37) ▲ ▼",
//! "152.8cm (5'0\")"); these helpers pull the structured part out and fail
//! hard when the shape is not what the site has historically produced.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static DATE_FULL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(\d{4})\s*-\s*(\d{2})\s*-\s*(\d{2})").unwrap());
static DATE_LOOSE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(\d{4})(?:\s*-\s*(\d{2})(?:\s*-\s*(\d{2}))?)?").unwrap()
});
static TRAILING_PAREN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\s*\(.*\)$").unwrap());
static HEIGHT_CM: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)cm").unwrap());
static WEIGHT_KG: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)kg").unwrap());

/// Extract a `YYYY-MM-DD` date from a free-text cell.
///
/// In strict mode all three components must be present. In loose mode a
/// bare year or year-month is accepted and the missing parts become `"00"`.
pub fn parse_date(
  field: &'static str,
  value: &str,
  strict: bool,
) -> Result<String> {
  let caps = if strict {
    DATE_FULL.captures(value)
  } else {
    DATE_LOOSE.captures(value)
  };
  let caps = caps.ok_or_else(|| Error::MalformedField {
    field,
    value: value.to_string(),
  })?;

  let year = &caps[1];
  let month = caps.get(2).map_or("00", |m| m.as_str());
  let day = caps.get(3).map_or("00", |m| m.as_str());
  Ok(format!("{year}-{month}-{day}"))
}

/// Drop a trailing parenthetical suffix, the site's alternate-script
/// rendering, e.g. `"전보람 (全寶藍)"` → `"전보람"`.
pub fn strip_parenthetical(value: &str) -> String {
  TRAILING_PAREN.replace(value, "").trim().to_string()
}

/// Flatten a "formerly known as" cell into a flat comma-separated list,
/// unnesting parenthetical groupings:
/// `"Lim Chanmi (임찬미 (林澯美))"` → `"Lim Chanmi, 임찬미, 林澯美"`.
pub fn flatten_aliases(value: &str) -> String {
  let mut names = Vec::new();
  let mut current = String::new();
  for c in value.chars() {
    match c {
      '(' | ')' | ',' => {
        let name = current.trim();
        if !name.is_empty() {
          names.push(name.to_string());
        }
        current.clear();
      }
      _ => current.push(c),
    }
  }
  let name = current.trim();
  if !name.is_empty() {
    names.push(name.to_string());
  }
  names.join(", ")
}

/// Extract a `…cm` measurement as a float.
pub fn parse_height(field: &'static str, value: &str) -> Result<f64> {
  parse_measure(field, value, &HEIGHT_CM)
}

/// Extract a `…kg` measurement as a float.
pub fn parse_weight(field: &'static str, value: &str) -> Result<f64> {
  parse_measure(field, value, &WEIGHT_KG)
}

fn parse_measure(
  field: &'static str,
  value: &str,
  pattern: &Regex,
) -> Result<f64> {
  let caps = pattern.captures(value).ok_or_else(|| Error::MalformedField {
    field,
    value: value.to_string(),
  })?;
  caps[1].parse().map_err(|_| Error::MalformedField {
    field,
    value: value.to_string(),
  })
}
