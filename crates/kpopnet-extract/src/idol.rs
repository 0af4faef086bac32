//! Idol detail page extraction.
//!
//! ```text
//! Pop type: K-pop
//! Stage name (romanized): Boram
//! Stage name (original): 보람
//! Real name (romanized): Jeon Boram
//! Real name (original): 전보람
//! Birth date: 1986-03-22 (age 37) ▲ ▼
//! Height: 152.8cm (5'0") ▲ ▼
//! Weight: 40.0kg (88lb) ▲ ▼
//! Debut date: 2008-04-15 (15 years and 6 months ago) ▲ ▼
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};

use kpopnet_core::{MembershipRef, model::REFERENCE_URL_PREFIX, text};

use crate::{
  Error, IdolPage, Result,
  table::{
    cell_link, label_pattern, profile_rows, reference_link, relation_rows,
    text_of, thumb_src,
  },
};

static POP_TYPE: Lazy<Regex> = Lazy::new(|| label_pattern(r"pop\s+type"));
static STAGE_NAME_ROM: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"stage\s+name.*romanized"));
static STAGE_NAME_ORIG: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"stage\s+name.*original"));
static REAL_NAME_ROM: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"real\s+name.*romanized"));
static REAL_NAME_ORIG: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"real\s+name.*original"));
static BIRTH_DATE: Lazy<Regex> = Lazy::new(|| label_pattern(r"birth\s+date"));
static DEBUT_DATE: Lazy<Regex> = Lazy::new(|| label_pattern(r"debut\s+date"));
static HEIGHT: Lazy<Regex> = Lazy::new(|| label_pattern(r"height"));
static WEIGHT: Lazy<Regex> = Lazy::new(|| label_pattern(r"weight"));
static FORMERLY_KNOWN: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"formerly\s+known"));

/// Parse one idol detail page into a provisional record plus its
/// side-channel data.
pub fn extract_idol(html: &str, page_url: &str) -> Result<IdolPage> {
  let doc = Html::parse_document(html);
  let mut fields = Map::new();
  let set = |fields: &mut Map<String, Value>, key: &str, value: String| {
    fields.insert(key.to_string(), Value::String(value));
  };

  for (label, value) in profile_rows(&doc, page_url)? {
    // Unknown labels are ignored on purpose; the site grows columns
    // faster than we care about them.
    if POP_TYPE.is_match(&label) {
      if value != "K-pop" {
        return Err(
          kpopnet_core::Error::MalformedField {
            field: "pop_type",
            value,
          }
          .into(),
        );
      }
    } else if STAGE_NAME_ROM.is_match(&label) {
      set(&mut fields, "name", text::strip_parenthetical(&value));
    } else if STAGE_NAME_ORIG.is_match(&label) {
      set(&mut fields, "name_original", text::strip_parenthetical(&value));
    } else if REAL_NAME_ROM.is_match(&label) {
      set(&mut fields, "real_name", text::strip_parenthetical(&value));
    } else if REAL_NAME_ORIG.is_match(&label) {
      set(
        &mut fields,
        "real_name_original",
        text::strip_parenthetical(&value),
      );
    } else if BIRTH_DATE.is_match(&label) {
      set(
        &mut fields,
        "birth_date",
        text::parse_date("birth_date", &value, true)?,
      );
    } else if DEBUT_DATE.is_match(&label) {
      set(
        &mut fields,
        "debut_date",
        text::parse_date("debut_date", &value, false)?,
      );
    } else if HEIGHT.is_match(&label) {
      fields.insert(
        "height".to_string(),
        text::parse_height("height", &value)?.into(),
      );
    } else if WEIGHT.is_match(&label) {
      fields.insert(
        "weight".to_string(),
        text::parse_weight("weight", &value)?.into(),
      );
    } else if FORMERLY_KNOWN.is_match(&label) {
      set(&mut fields, "name_alias", text::flatten_aliases(&value));
    }
  }

  let memberships = extract_memberships(&doc, page_url)?;

  let mut urls = vec![Value::String(page_url.to_string())];
  if let Some(reference) = reference_link(&doc, REFERENCE_URL_PREFIX) {
    urls.push(Value::String(reference));
  }
  fields.insert("urls".to_string(), Value::Array(urls));

  Ok(IdolPage {
    fields,
    memberships,
    thumb_url: thumb_src(&doc)?,
  })
}

/// The group affiliation table, one transient membership per row.
///
/// Column layout: `[_, group link, _, _, disbanded marker, current yes/no,
/// roles]`, with the last two columns optional. A member counts as current
/// unless the disbanded cell is non-empty, and an explicit yes/no column
/// wins over that default.
fn extract_memberships(
  doc: &Html,
  page_url: &str,
) -> Result<Vec<MembershipRef>> {
  let mut memberships = Vec::new();
  for cells in relation_rows(doc) {
    let group_url = cells
      .get(1)
      .copied()
      .and_then(cell_link)
      .ok_or_else(|| Error::MissingGroupLink { url: page_url.to_string() })?;

    let disbanded = cells.get(4).is_some_and(|c| !text_of(*c).is_empty());
    let mut current = !disbanded;
    if let Some(cell) = cells.get(5) {
      current = text_of(*cell) == "Yes";
    }
    let roles = cells
      .get(6)
      .map(|c| text_of(*c).to_lowercase())
      .filter(|s| !s.is_empty());

    memberships.push(MembershipRef { group_url, current, roles });
  }
  Ok(memberships)
}
