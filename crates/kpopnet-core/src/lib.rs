//! Core types and record machinery for the kpopnet dataset builder.
//!
//! This crate is deliberately free of HTML and network dependencies.
//! All other crates depend on it; it depends on nothing heavier than
//! serde and a hash.

pub mod error;
pub mod ident;
pub mod model;
pub mod overrides;
pub mod schema;
pub mod text;
pub mod validate;

pub use error::{Error, Result};
pub use model::{Group, GroupMember, Idol, MembershipRef, Profiles, RecordKind};
