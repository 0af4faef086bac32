//! Record types for the emitted dataset.
//!
//! `Idol` and `Group` are the two persisted record shapes. During the crawl
//! they exist first as loose JSON objects (so overrides can patch arbitrary
//! fields); [`crate::schema::finish`] converts a normalized object into the
//! typed form used by the resolution pass and the emitter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, ident};

// ─── Site constants ──────────────────────────────────────────────────────────

/// Origin of the source profile database.
pub const SOURCE_ORIGIN: &str = "https://selca.kastden.org";
/// Prefix of idol detail page URLs.
pub const IDOL_URL_PREFIX: &str = "https://selca.kastden.org/noona/idol/";
/// Prefix of group detail page URLs.
pub const GROUP_URL_PREFIX: &str = "https://selca.kastden.org/noona/group/";
/// Base of the canonical self URL synthesized into `urls[0]`.
pub const PROFILE_URL_BASE: &str = "https://net.kpop.re/?id=";
/// Prefix an optional third, supplementary reference URL must carry.
pub const REFERENCE_URL_PREFIX: &str = "https://namu.wiki/";

// ─── Records ─────────────────────────────────────────────────────────────────

/// A person profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idol {
  pub id:                 String,
  pub name:               String,
  pub name_original:      String,
  pub real_name:          String,
  pub real_name_original: String,
  /// `YYYY-MM-DD`, with `00` standing in for an unknown month or day.
  pub birth_date:         String,
  /// `[canonical self URL, source page URL, optional reference URL]`.
  pub urls:               Vec<String>,
  pub name_alias:         Option<String>,
  pub debut_date:         Option<String>,
  /// Centimetres.
  pub height:             Option<f64>,
  /// Kilograms.
  pub weight:             Option<f64>,
  pub thumb_url:          Option<String>,
  /// Group ids, ordered by global group recency. Populated by the
  /// resolution pass only.
  #[serde(default)]
  pub groups:             Vec<String>,
}

/// One membership edge as seen from the group side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
  pub idol_id: String,
  pub current: bool,
  pub roles:   Option<String>,
}

/// An act profile: a main group or a sub-unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub id:            String,
  pub name:          String,
  pub name_original: String,
  pub agency_name:   String,
  pub urls:          Vec<String>,
  pub name_alias:    Option<String>,
  pub debut_date:    Option<String>,
  pub disband_date:  Option<String>,
  pub thumb_url:     Option<String>,
  /// Sub-units only. Holds the parent's page URL until the resolution pass
  /// rewrites it to the parent's id.
  pub parent_id:     Option<String>,
  /// Populated by the resolution pass only.
  #[serde(default)]
  pub members:       Vec<GroupMember>,
}

/// The complete emitted dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profiles {
  pub groups: Vec<Group>,
  pub idols:  Vec<Idol>,
}

// ─── Transient membership descriptor ─────────────────────────────────────────

/// A group affiliation as scraped from an idol page, before the target group
/// exists as a record. Carried alongside the idol in a side channel; never
/// serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRef {
  /// Absolute URL of the group's detail page.
  pub group_url: String,
  pub current:   bool,
  pub roles:     Option<String>,
}

// ─── Record kinds ────────────────────────────────────────────────────────────

/// The two persisted record shapes, with their declared field sets.
///
/// Validation compares a record's serialized key set against these lists, so
/// the lists are the single source of truth for the dataset schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
  Idol,
  Group,
}

impl RecordKind {
  pub fn required(self) -> &'static [&'static str] {
    match self {
      Self::Idol => &[
        "name",
        "name_original",
        "real_name",
        "real_name_original",
        "birth_date",
        "urls",
      ],
      Self::Group => &["name", "name_original", "agency_name", "urls"],
    }
  }

  pub fn optional(self) -> &'static [&'static str] {
    match self {
      Self::Idol => &["name_alias", "debut_date", "height", "weight", "thumb_url"],
      Self::Group => &[
        "name_alias",
        "debut_date",
        "disband_date",
        "thumb_url",
        "parent_id",
      ],
    }
  }

  pub fn reference(self) -> &'static [&'static str] {
    match self {
      Self::Idol => &["groups"],
      Self::Group => &["members"],
    }
  }

  /// Fields that must be unique across all records of this kind.
  /// `id` is always checked; group names are load-bearing for consumers.
  pub fn unique(self) -> &'static [&'static str] {
    match self {
      Self::Idol => &["id"],
      Self::Group => &["id", "name", "name_original"],
    }
  }

  /// Prefix every record's source page URL (`urls[1]`) must carry.
  pub fn source_url_prefix(self) -> &'static str {
    match self {
      Self::Idol => IDOL_URL_PREFIX,
      Self::Group => GROUP_URL_PREFIX,
    }
  }

  /// Derive the record's stable id from its identifying fields.
  ///
  /// Idols bind to `(real_name_original, birth_date)`; groups to
  /// `name_original` alone. Everything else may change between crawls
  /// without the id moving.
  pub fn gen_id(self, fields: &Map<String, Value>) -> Result<String> {
    let key = match self {
      Self::Idol => {
        let mut key = field_str(fields, "real_name_original")?.to_string();
        key.push_str(field_str(fields, "birth_date")?);
        key
      }
      Self::Group => field_str(fields, "name_original")?.to_string(),
    };
    Ok(ident::short_hash(&key))
  }
}

fn field_str<'a>(
  fields: &'a Map<String, Value>,
  field: &'static str,
) -> Result<&'a str> {
  fields
    .get(field)
    .and_then(Value::as_str)
    .ok_or(crate::Error::MissingField { field })
}
