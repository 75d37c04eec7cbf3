//! Library catalogue: a flat list of titles with optional links.

use serde::{Deserialize, Serialize};

use crate::{
  Result, new_id, non_blank,
  store::{KeyValueStore, Records, read_or_seed, write_collection},
};

/// Storage key of the library collection.
pub const LIBRARY_KEY: &str = "library-items";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
  pub id:     String,
  pub title:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url:    Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewLibraryItem {
  pub title:  String,
  pub author: Option<String>,
  pub url:    Option<String>,
}

fn seed() -> Vec<LibraryItem> {
  let item = |id: &str, title: &str, author: &str| LibraryItem {
    id:     id.to_owned(),
    title:  title.to_owned(),
    author: Some(author.to_owned()),
    url:    Some("#".to_owned()),
  };
  vec![
    item("l1", "Algoritmlar asoslari", "T. X"),
    item("l2", "Web dasturlash", "N. Y"),
  ]
}

pub struct Library<'s, S: ?Sized> {
  store: &'s S,
}

impl<'s, S> Library<'s, S>
where
  S: KeyValueStore + ?Sized,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  pub fn list(&self) -> Result<Vec<LibraryItem>> { Ok(self.load()?.items) }

  fn load(&self) -> Result<Records<LibraryItem>> { read_or_seed(self.store, LIBRARY_KEY, seed) }

  pub fn add(&self, input: NewLibraryItem) -> Result<LibraryItem> {
    let mut records = self.load()?;
    let created = LibraryItem {
      id:     new_id(),
      title:  input.title.trim().to_owned(),
      author: non_blank(input.author.as_deref()),
      url:    non_blank(input.url.as_deref()),
    };
    records.items.insert(0, created.clone());
    write_collection(self.store, LIBRARY_KEY, &records)?;
    Ok(created)
  }

  pub fn remove(&self, id: &str) -> Result<()> {
    let mut records = self.load()?;
    records.items.retain(|i| i.id != id);
    write_collection(self.store, LIBRARY_KEY, &records)
  }
}
