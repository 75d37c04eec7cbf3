//! Core types and services for the Texnikum ERP dashboard.
//!
//! Every collection (teachers, students, lessons, ...) is persisted as one
//! JSON document in a [`store::KeyValueStore`]. Services perform a full
//! read-modify-write cycle per call; callers re-list after every mutation.
//!
//! This crate is free of HTTP and database dependencies.

/// Implement `Serialize`/`Deserialize` through the enum's `strum` string form.
macro_rules! string_enum_serde {
  ($ty:ty) => {
    impl serde::Serialize for $ty {
      fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
      ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
      }
    }

    impl<'de> serde::Deserialize<'de> for $ty {
      fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
      ) -> std::result::Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
          serde::de::Error::custom(format!(
            "unknown {}: {raw:?}",
            stringify!($ty)
          ))
        })
      }
    }
  };
}

pub mod attendance;
pub mod auth;
pub mod error;
pub mod library;
pub mod schedule;
pub mod store;
pub mod students;
pub mod teachers;
pub mod username;

pub use error::{Error, Result};

/// Fresh identifier for a newly created record.
pub(crate) fn new_id() -> String { uuid::Uuid::new_v4().to_string() }

/// Trim `value`, returning `None` when nothing is left.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}
