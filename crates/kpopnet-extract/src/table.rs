//! Shared selector plumbing for the source site's page layout.
//!
//! Detail pages carry their data in a label/value table directly after the
//! `h1` heading; relationship tables (group affiliations on idol pages, the
//! parent-group row on sub-unit pages) follow an `h2` heading.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

fn sel(source: &'static str) -> Selector {
  Selector::parse(source).expect("static selector")
}

/// Case-insensitive label matcher for profile table rows.
pub(crate) fn label_pattern(pattern: &str) -> Regex {
  Regex::new(&format!("(?i){pattern}")).expect("static pattern")
}

static PROFILE_TABLE: Lazy<Selector> = Lazy::new(|| sel("h1 ~ div table"));
static RELATION_TABLE: Lazy<Selector> = Lazy::new(|| sel("h2 ~ table tbody"));
static ROW: Lazy<Selector> = Lazy::new(|| sel("tr"));
static CELL: Lazy<Selector> = Lazy::new(|| sel("td"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| sel("a"));
static THUMB_IMG: Lazy<Selector> = Lazy::new(|| sel(".thumb img"));
static REFERENCE_LINK: Lazy<Selector> = Lazy::new(|| sel("h2 ~ ul a"));

/// All text beneath `element`, joined and trimmed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
  element.text().collect::<String>().trim().to_string()
}

/// The label/value rows of the page's profile table. Rows with an empty
/// label or value cell are skipped, matching the site's spacer rows.
pub(crate) fn profile_rows(
  doc: &Html,
  url: &str,
) -> Result<Vec<(String, String)>> {
  let table = doc
    .select(&PROFILE_TABLE)
    .next()
    .ok_or_else(|| Error::MissingProfileTable { url: url.to_string() })?;

  let mut rows = Vec::new();
  for row in table.select(&ROW) {
    let mut cells = row.select(&CELL);
    let (Some(label), Some(value)) = (cells.next(), cells.next()) else {
      continue;
    };
    let label = text_of(label);
    let value = text_of(value);
    if label.is_empty() || value.is_empty() {
      continue;
    }
    rows.push((label, value));
  }
  Ok(rows)
}

/// The rows of the first relationship table, as cell lists.
pub(crate) fn relation_rows(doc: &Html) -> Vec<Vec<ElementRef<'_>>> {
  let Some(body) = doc.select(&RELATION_TABLE).next() else {
    return Vec::new();
  };
  body
    .select(&ROW)
    .map(|row| row.select(&CELL).collect())
    .filter(|cells: &Vec<_>| !cells.is_empty())
    .collect()
}

/// The `href` of the first anchor in `cell`, absolutized.
pub(crate) fn cell_link(cell: ElementRef<'_>) -> Option<String> {
  cell
    .select(&ANCHOR)
    .next()
    .and_then(|a| a.value().attr("href"))
    .map(absolutize)
}

/// The page's thumbnail source URL, if any. The site only serves jpg
/// thumbnails; anything else means the markup changed under us.
pub(crate) fn thumb_src(doc: &Html) -> Result<Option<String>> {
  let Some(img) = doc.select(&THUMB_IMG).next() else {
    return Ok(None);
  };
  let Some(src) = img.value().attr("src") else {
    return Ok(None);
  };
  if !src.ends_with(".jpg") {
    return Err(Error::BadThumbSource { src: src.to_string() });
  }
  Ok(Some(absolutize(src)))
}

/// The first link in the page's reference list matching `prefix`.
pub(crate) fn reference_link(doc: &Html, prefix: &str) -> Option<String> {
  doc
    .select(&REFERENCE_LINK)
    .filter_map(|a| a.value().attr("href"))
    .map(absolutize)
    .find(|href| href.starts_with(prefix))
}

/// Resolve a site-relative href against the source origin.
pub(crate) fn absolutize(href: &str) -> String {
  if href.starts_with("http://") || href.starts_with("https://") {
    href.to_string()
  } else if href.starts_with('/') {
    format!("{}{href}", kpopnet_core::model::SOURCE_ORIGIN)
  } else {
    format!("{}/{href}", kpopnet_core::model::SOURCE_ORIGIN)
  }
}
