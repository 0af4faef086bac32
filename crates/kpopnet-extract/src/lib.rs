//! HTML extraction for the kpopnet crawler.
//!
//! Turns the source site's detail pages into provisional records: loose
//! JSON objects plus side-channel data (membership descriptors, parent
//! link, thumbnail source) that the crawl driver consumes. Pure and
//! synchronous; no network dependencies.

pub mod error;
mod group;
mod idol;
mod listing;
mod table;

pub use error::{Error, Result};
pub use group::extract_group;
pub use idol::extract_idol;
pub use listing::extract_listing;

use kpopnet_core::MembershipRef;
use serde_json::{Map, Value};

// ─── Extraction results ──────────────────────────────────────────────────────

/// The yield of one idol detail page.
pub struct IdolPage {
  /// Provisional record fields, ready for normalization.
  pub fields:      Map<String, Value>,
  /// Group affiliations; each `group_url` needs an out-of-band fetch.
  pub memberships: Vec<MembershipRef>,
  /// Thumbnail source URL to side-load, if the page carries one.
  pub thumb_url:   Option<String>,
}

/// The yield of one group detail page.
pub struct GroupPage {
  pub fields:     Map<String, Value>,
  /// Sub-units only: the parent group's page URL, needing a fetch.
  pub parent_url: Option<String>,
  pub thumb_url:  Option<String>,
}
