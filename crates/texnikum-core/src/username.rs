//! Login handle generation.
//!
//! Handles are derived from a person's name, reduced to ASCII `a-z`, and kept
//! to [`MAX_LEN`] characters. Collisions are resolved by replacing the tail
//! of the base with a counter (`ali`, `ali1`, `ali2`, ...). Non-Latin letters
//! are dropped, not transliterated.

use std::collections::HashSet;

/// Longest handle ever produced, suffix included.
pub const MAX_LEN: usize = 8;

const FALLBACK_BASE: &str = "user";

/// Lowercase `part` and keep only `a-z`.
fn normalize_part(part: &str) -> String {
  part
    .chars()
    .flat_map(char::to_lowercase)
    .filter(char::is_ascii_lowercase)
    .collect()
}

/// The collision-free handle candidate before any suffixing.
fn base_handle(first: &str, last: &str, middle: Option<&str>) -> String {
  let first = normalize_part(first);
  let last = normalize_part(last);
  let middle = middle.map(normalize_part).unwrap_or_default();

  let mut base = if first.len() > MAX_LEN {
    let initials: String = [&first, &middle, &last]
      .into_iter()
      .filter_map(|part| part.chars().next())
      .collect();
    if initials.is_empty() { first[..2].to_owned() } else { initials }
  } else {
    first
  };

  if base.is_empty() {
    base = FALLBACK_BASE.to_owned();
  }
  // Normalised parts are pure ASCII, so byte truncation is safe.
  base.truncate(MAX_LEN);
  base
}

/// Derive a handle for a person that is not yet taken.
///
/// `existing` is a snapshot of `(id, username)` pairs; comparison is
/// case-insensitive. The entry whose id equals `exclude_id` is ignored so a
/// record being edited does not collide with itself.
pub fn generate_username<'a, I>(
  first_name: &str,
  last_name: &str,
  middle_name: Option<&str>,
  existing: I,
  exclude_id: Option<&str>,
) -> String
where
  I: IntoIterator<Item = (&'a str, &'a str)>,
{
  let taken: HashSet<String> = existing
    .into_iter()
    .filter(|(id, _)| Some(*id) != exclude_id)
    .map(|(_, username)| username.to_lowercase())
    .collect();

  let base = base_handle(first_name, last_name, middle_name);
  let mut candidate = base.clone();
  let mut counter: u64 = 1;

  while taken.contains(&candidate) {
    let suffix = counter.to_string();
    let keep = MAX_LEN.saturating_sub(suffix.len()).max(1).min(base.len());
    candidate = format!("{}{suffix}", &base[..keep]);
    candidate.truncate(MAX_LEN);
    counter += 1;
  }

  candidate
}
