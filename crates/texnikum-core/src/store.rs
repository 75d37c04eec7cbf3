//! The `KeyValueStore` trait and typed collection helpers.
//!
//! The trait is implemented by storage backends (e.g.
//! `texnikum-store-sqlite`). Services in this crate borrow a store for the
//! duration of a single read-modify-write cycle and never cache its contents.

use std::{collections::HashMap, convert::Infallible, str::FromStr, sync::Mutex};

use serde::{
  Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned, ser::SerializeSeq,
};
use serde_json::Value;

use crate::{Error, Result};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A string-keyed store of serialised documents.
///
/// Each collection lives under a single key and is always written back in
/// full; there are no partial updates.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the raw document stored under `key`, if any.
  fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Replace the document stored under `key`.
  fn set(&self, key: &str, value: String) -> Result<(), Self::Error>;
}

// ─── Typed reads ─────────────────────────────────────────────────────────────

/// Outcome of decoding a stored collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Read<T> {
  Found(T),
  /// Nothing (or an empty document) is stored under the key.
  Missing,
  /// The document exists but could not be read or decoded.
  Corrupt(String),
}

impl<T> Read<T> {
  /// Resolve to the decoded value, or to `fallback` when missing or corrupt.
  pub fn or_fallback(self, key: &str, fallback: impl FnOnce() -> T) -> T {
    match self {
      Self::Found(value) => value,
      Self::Missing => fallback(),
      Self::Corrupt(reason) => {
        tracing::warn!(key, %reason, "stored collection is unreadable, using fallback");
        fallback()
      }
    }
  }
}

/// Read and decode the JSON document under `key`.
///
/// Backend failures are reported as [`Read::Corrupt`] rather than propagated.
pub fn read_collection<S, T>(store: &S, key: &str) -> Read<T>
where
  S: KeyValueStore + ?Sized,
  T: DeserializeOwned,
{
  match store.get(key) {
    Ok(None) => Read::Missing,
    Ok(Some(raw)) if raw.is_empty() => Read::Missing,
    Ok(Some(raw)) => match serde_json::from_str(&raw) {
      Ok(value) => Read::Found(value),
      Err(e) => Read::Corrupt(e.to_string()),
    },
    Err(e) => Read::Corrupt(e.to_string()),
  }
}

/// Serialise `value` and store it under `key`.
pub fn write_collection<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
  S: KeyValueStore + ?Sized,
  T: Serialize + ?Sized,
{
  let raw = serde_json::to_string(value)?;
  store
    .set(key, raw)
    .map_err(|e| Error::Storage(Box::new(e)))
}

// ─── Record collections ──────────────────────────────────────────────────────

/// A decoded collection plus the stored elements that failed to decode.
///
/// Serialises as `items` followed by the unreadable elements verbatim, so a
/// write never loses a record this version cannot read.
#[derive(Debug, Clone, PartialEq)]
pub struct Records<T> {
  pub items:  Vec<T>,
  unreadable: Vec<Value>,
}

impl<T> Records<T> {
  pub fn new(items: Vec<T>) -> Self { Self { items, unreadable: Vec::new() } }

  /// Stored elements that were skipped on read.
  pub fn unreadable(&self) -> &[Value] { &self.unreadable }
}

impl<T> Default for Records<T> {
  fn default() -> Self { Self::new(Vec::new()) }
}

impl<T: DeserializeOwned> Records<T> {
  fn decode(key: &str, raw: Vec<Value>) -> Self {
    let mut records = Self::default();
    for element in raw {
      match T::deserialize(&element) {
        Ok(item) => records.items.push(item),
        Err(e) => {
          tracing::warn!(key, error = %e, "keeping unreadable record as-is");
          records.unreadable.push(element);
        }
      }
    }
    records
  }
}

impl<T: Serialize> Serialize for Records<T> {
  fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
    let mut seq = serializer.serialize_seq(Some(self.items.len() + self.unreadable.len()))?;
    for item in &self.items {
      seq.serialize_element(item)?;
    }
    for element in &self.unreadable {
      seq.serialize_element(element)?;
    }
    seq.end()
  }
}

/// Read the JSON array under `key`, decoding each element on its own.
///
/// Only a document that is not an array at all reads as [`Read::Corrupt`].
pub fn read_records<S, T>(store: &S, key: &str) -> Read<Records<T>>
where
  S: KeyValueStore + ?Sized,
  T: DeserializeOwned,
{
  match read_collection::<S, Vec<Value>>(store, key) {
    Read::Found(raw) => Read::Found(Records::decode(key, raw)),
    Read::Missing => Read::Missing,
    Read::Corrupt(reason) => Read::Corrupt(reason),
  }
}

/// Read the records under `key`; when nothing is stored yet, persist and
/// return `seed`. A corrupt document also yields the seed without writing.
pub fn read_or_seed<S, T>(
  store: &S,
  key: &str,
  seed: impl FnOnce() -> Vec<T>,
) -> Result<Records<T>>
where
  S: KeyValueStore + ?Sized,
  T: Serialize + DeserializeOwned,
{
  match read_records(store, key) {
    Read::Found(records) => Ok(records),
    Read::Missing => {
      let records = Records::new(seed());
      tracing::debug!(key, count = records.items.len(), "seeding collection");
      write_collection(store, key, &records)?;
      Ok(records)
    }
    corrupt @ Read::Corrupt(_) => Ok(corrupt.or_fallback(key, || Records::new(seed()))),
  }
}

/// Deserialise an optional enum field, mapping unknown or mistyped values to
/// `None` instead of failing the whole collection.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
{
  let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(
    raw
      .as_ref()
      .and_then(serde_json::Value::as_str)
      .and_then(|s| s.trim().parse().ok()),
  )
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local store, used in tests and when embedding without a disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    Ok(entries.get(key).cloned())
  }

  fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_owned(), value);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_key_reads_as_missing() {
    let store = MemoryStore::new();
    let read: Read<Vec<u32>> = read_collection(&store, "nothing");
    assert_eq!(read, Read::Missing);
  }

  #[test]
  fn empty_document_reads_as_missing() {
    let store = MemoryStore::new();
    store.set("k", String::new()).unwrap();
    let read: Read<Vec<u32>> = read_collection(&store, "k");
    assert_eq!(read, Read::Missing);
  }

  #[test]
  fn corrupt_document_is_distinct_from_missing() {
    let store = MemoryStore::new();
    store.set("k", "{not json".into()).unwrap();
    let read: Read<Vec<u32>> = read_collection(&store, "k");
    assert!(matches!(read, Read::Corrupt(_)));
    assert_eq!(read.or_fallback("k", || vec![7]), vec![7]);
  }

  #[test]
  fn write_then_read_finds_value() {
    let store = MemoryStore::new();
    write_collection(&store, "k", &[1u32, 2, 3]).unwrap();
    let read: Read<Vec<u32>> = read_collection(&store, "k");
    assert_eq!(read, Read::Found(vec![1, 2, 3]));
  }

  #[test]
  fn seed_is_persisted_only_when_missing() {
    let store = MemoryStore::new();
    let records = read_or_seed(&store, "k", || vec![1u32]).unwrap();
    assert_eq!(records.items, vec![1]);
    assert_eq!(store.get("k").unwrap().as_deref(), Some("[1]"));

    store.set("bad", "nope".into()).unwrap();
    let records = read_or_seed(&store, "bad", || vec![2u32]).unwrap();
    assert_eq!(records.items, vec![2]);
    assert_eq!(store.get("bad").unwrap().as_deref(), Some("nope"));
  }

  #[test]
  fn one_bad_element_does_not_spoil_the_rest() {
    let store = MemoryStore::new();
    store.set("k", r#"[1, "two", 3]"#.into()).unwrap();

    let Read::Found(mut records) = read_records::<_, u32>(&store, "k") else {
      panic!("array should decode");
    };
    assert_eq!(records.items, vec![1, 3]);
    assert_eq!(records.unreadable(), [Value::from("two")]);

    records.items.insert(0, 0);
    write_collection(&store, "k", &records).unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some(r#"[0,1,3,"two"]"#));
  }

  #[test]
  fn non_array_document_is_corrupt() {
    let store = MemoryStore::new();
    store.set("k", r#"{"a":1}"#.into()).unwrap();
    let read: Read<Records<u32>> = read_records(&store, "k");
    assert!(matches!(read, Read::Corrupt(_)));
  }
}
