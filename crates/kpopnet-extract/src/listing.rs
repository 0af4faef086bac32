//! Search listing extraction: the crawl's entry page.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::table::absolutize;

static LISTING_LINK: Lazy<Selector> =
  Lazy::new(|| Selector::parse(".cell_line a").expect("static selector"));

/// All idol detail URLs linked from the search listing, absolutized, in
/// page order. Duplicate hrefs are left in; the crawl driver dedupes.
pub fn extract_listing(html: &str) -> Vec<String> {
  let doc = Html::parse_document(html);
  doc
    .select(&LISTING_LINK)
    .filter_map(|a| a.value().attr("href"))
    .filter(|href| href.starts_with("/noona/idol/"))
    .map(absolutize)
    .collect()
}
