//! Error types for `kpopnet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A value scraped from the source site does not match its expected shape.
  /// Always indicates bad or changed source markup, never a user error.
  #[error("malformed {field} value: {value:?}")]
  MalformedField { field: &'static str, value: String },

  #[error("required field {field:?} still empty after overrides")]
  MissingField { field: &'static str },

  #[error("field set mismatch: unexpected {unexpected:?}, missing {missing:?}")]
  FieldSet {
    unexpected: Vec<String>,
    missing:    Vec<String>,
  },

  #[error("record is not a JSON object")]
  NotAnObject,

  #[error("duplicate {field} value {value:?} shared by {first} and {second}")]
  Duplicate {
    field:  String,
    value:  String,
    first:  String,
    second: String,
  },

  #[error("bad urls for record {id}: {detail}")]
  InvalidUrls { id: String, detail: String },

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
