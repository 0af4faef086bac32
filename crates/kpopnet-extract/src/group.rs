//! Group detail page extraction.
//!
//! ```text
//! Display name (romanized): T-ara
//! Display name (original): 티아라
//! Company: MBK Entertainment
//! Debut date: 2009-07-29 (14 years and 3 months ago)
//! ```
//!
//! Sub-unit pages omit the `Company` row and instead carry a one-row table
//! linking to the parent group; the agency name is copied from that row.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};

use kpopnet_core::{model::REFERENCE_URL_PREFIX, text};

use crate::{
  Error, GroupPage, Result,
  table::{
    cell_link, label_pattern, profile_rows, reference_link, relation_rows,
    text_of, thumb_src,
  },
};

static DISPLAY_NAME_ROM: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"display\s+name.*romanized"));
static DISPLAY_NAME_ORIG: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"display\s+name.*original"));
static COMPANY: Lazy<Regex> = Lazy::new(|| label_pattern(r"company"));
static DEBUT_DATE: Lazy<Regex> = Lazy::new(|| label_pattern(r"debut\s+date"));
static DISBAND_DATE: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"disbandment\s+date"));
static FORMERLY_KNOWN: Lazy<Regex> =
  Lazy::new(|| label_pattern(r"formerly\s+known"));

/// Parse one group detail page into a provisional record plus its
/// side-channel data.
pub fn extract_group(html: &str, page_url: &str) -> Result<GroupPage> {
  let doc = Html::parse_document(html);
  let mut fields = Map::new();
  let set = |fields: &mut Map<String, Value>, key: &str, value: String| {
    fields.insert(key.to_string(), Value::String(value));
  };

  for (label, value) in profile_rows(&doc, page_url)? {
    if DISPLAY_NAME_ROM.is_match(&label) {
      set(&mut fields, "name", value);
    } else if DISPLAY_NAME_ORIG.is_match(&label) {
      set(&mut fields, "name_original", value);
    } else if COMPANY.is_match(&label) {
      set(&mut fields, "agency_name", value);
    } else if DEBUT_DATE.is_match(&label) {
      set(
        &mut fields,
        "debut_date",
        text::parse_date("debut_date", &value, false)?,
      );
    } else if DISBAND_DATE.is_match(&label) {
      set(
        &mut fields,
        "disband_date",
        text::parse_date("disband_date", &value, false)?,
      );
    } else if FORMERLY_KNOWN.is_match(&label) {
      set(&mut fields, "name_alias", text::flatten_aliases(&value));
    }
  }

  let parent_url = extract_parent(&doc, &mut fields, page_url)?;
  if let Some(url) = &parent_url {
    fields.insert("parent_id".to_string(), Value::String(url.clone()));
  }

  let mut urls = vec![Value::String(page_url.to_string())];
  if let Some(reference) = reference_link(&doc, REFERENCE_URL_PREFIX) {
    urls.push(Value::String(reference));
  }
  fields.insert("urls".to_string(), Value::Array(urls));

  Ok(GroupPage {
    fields,
    parent_url,
    thumb_url: thumb_src(&doc)?,
  })
}

/// The parent-group row of a sub-unit page.
///
/// Column layout: `[_, parent link, agency]`. Sub-unit profile tables have
/// no `Company` row, so the agency cell fills `agency_name` unless the
/// profile table already did.
fn extract_parent(
  doc: &Html,
  fields: &mut Map<String, Value>,
  page_url: &str,
) -> Result<Option<String>> {
  let Some(cells) = relation_rows(doc).into_iter().next() else {
    return Ok(None);
  };
  let parent_url = cells
    .get(1)
    .copied()
    .and_then(cell_link)
    .ok_or_else(|| Error::MissingParentLink { url: page_url.to_string() })?;

  if !fields.contains_key("agency_name")
    && let Some(agency) = cells.get(2).map(|c| text_of(*c))
    && !agency.is_empty()
  {
    fields.insert("agency_name".to_string(), Value::String(agency));
  }
  Ok(Some(parent_url))
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE_URL: &str = "https://selca.kastden.org/noona/group/7";

  fn page(profile_rows: &str, extra: &str) -> String {
    format!(
      "<html><body>\
       <h1>T-ara</h1><div><table>{profile_rows}</table></div>\
       {extra}\
       </body></html>"
    )
  }

  fn row(label: &str, value: &str) -> String {
    format!("<tr><td>{label}</td><td>{value}</td></tr>")
  }

  #[test]
  fn group_profile_is_extracted() {
    let rows = [
      row("Display name (romanized)", "T-ara"),
      row("Display name (original)", "티아라"),
      row("Company", "MBK Entertainment"),
      row("Debut date", "2009-07-29 (14 years ago)"),
      row("Disbandment date", "2024"),
    ]
    .join("");
    let extracted = extract_group(&page(&rows, ""), PAGE_URL).unwrap();
    let f = &extracted.fields;

    assert_eq!(f["name"], "T-ara");
    assert_eq!(f["name_original"], "티아라");
    assert_eq!(f["agency_name"], "MBK Entertainment");
    assert_eq!(f["debut_date"], "2009-07-29");
    assert_eq!(f["disband_date"], "2024-00-00");
    assert!(extracted.parent_url.is_none());
    assert!(!f.contains_key("parent_id"));
  }

  #[test]
  fn subunit_takes_parent_url_and_agency_from_parent_row() {
    let rows = [
      row("Display name (romanized)", "QBS"),
      row("Display name (original)", "큐비에스"),
      row("Debut date", "2013-06"),
    ]
    .join("");
    let parent = "<h2>Member of</h2><table><tbody>\
      <tr><td>1</td><td><a href=\"/noona/group/7\">T-ara</a></td>\
          <td>MBK Entertainment</td></tr>\
      </tbody></table>";
    let extracted = extract_group(&page(&rows, parent), PAGE_URL).unwrap();

    assert_eq!(
      extracted.parent_url.as_deref(),
      Some("https://selca.kastden.org/noona/group/7")
    );
    assert_eq!(
      extracted.fields["parent_id"],
      "https://selca.kastden.org/noona/group/7"
    );
    assert_eq!(extracted.fields["agency_name"], "MBK Entertainment");
  }

  #[test]
  fn profile_company_wins_over_parent_row_agency() {
    let rows = [
      row("Display name (romanized)", "QBS"),
      row("Display name (original)", "큐비에스"),
      row("Company", "Own Label"),
    ]
    .join("");
    let parent = "<h2>Member of</h2><table><tbody>\
      <tr><td>1</td><td><a href=\"/noona/group/7\">T-ara</a></td>\
          <td>MBK Entertainment</td></tr>\
      </tbody></table>";
    let extracted = extract_group(&page(&rows, parent), PAGE_URL).unwrap();
    assert_eq!(extracted.fields["agency_name"], "Own Label");
  }

  #[test]
  fn parent_row_without_link_is_fatal() {
    let rows = [row("Display name (romanized)", "QBS")].join("");
    let parent = "<h2>Member of</h2><table><tbody>\
      <tr><td>1</td><td>T-ara</td><td>MBK</td></tr>\
      </tbody></table>";
    assert!(matches!(
      extract_group(&page(&rows, parent), PAGE_URL),
      Err(Error::MissingParentLink { .. })
    ));
  }
}
