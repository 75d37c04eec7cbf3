//! Teacher directory.
//!
//! Each teacher gets a generated login handle (see [`crate::username`]) and a
//! random password that the administrator hands out.

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Result, new_id, non_blank,
  store::{KeyValueStore, Records, lenient, read_or_seed, write_collection},
  username::generate_username,
};

/// Storage key of the teacher collection.
pub const TEACHERS_KEY: &str = "teachers";

const PASSWORD_ALPHABET: &[u8] =
  b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
const PASSWORD_LEN: usize = 10;

// ─── Types ───────────────────────────────────────────────────────────────────

/// Subjects a teacher can be registered as specialising in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum Specialization {
  Matematika,
  Fizika,
  #[strum(serialize = "Kompyuter grafikasi va dizayn")]
  KompyuterGrafikasiVaDizayn,
  #[strum(serialize = "Kompyuter grafikasi va dizayn O'.A")]
  KompyuterGrafikasiVaDizaynOa,
  Tarix,
  #[strum(serialize = "Ona tili va adabiyot")]
  OnaTiliVaAdabiyot,
  #[strum(serialize = "Ingliz tili")]
  InglizTili,
  Biologiya,
  Kimyo,
  Geografiya,
  Dasturlash,
  #[strum(serialize = "Raqamli texnologiyalar")]
  RaqamliTexnologiyalar,
  #[strum(serialize = "Axborot xavfsizligi")]
  AxborotXavfsizligi,
  Tikuvchilik,
  Avtomobil,
  Elektromontyor,
  Oshpazlik,
  Melioratsiya,
}

string_enum_serde!(Specialization);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
  pub id:             String,
  #[serde(default)]
  pub full_name:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub first_name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub middle_name:    Option<String>,
  #[serde(default)]
  pub username:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub department:     Option<String>,
  /// Academic degree, free text.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub degree:         Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient",
    skip_serializing_if = "Option::is_none"
  )]
  pub specialization: Option<Specialization>,
  #[serde(default)]
  pub password:       String,
}

/// Input to [`Teachers::create`]. Full name, username, and password are
/// always derived by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub middle_name:    Option<String>,
  pub phone:          Option<String>,
  pub department:     Option<String>,
  pub degree:         Option<String>,
  pub specialization: Option<Specialization>,
}

/// Partial update for [`Teachers::update`].
///
/// Touching any name field recomputes the full name and regenerates the
/// username. A blank string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPatch {
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub middle_name:    Option<String>,
  pub phone:          Option<String>,
  pub department:     Option<String>,
  pub degree:         Option<String>,
  pub specialization: Option<Specialization>,
  pub password:       Option<String>,
}

impl TeacherPatch {
  fn touches_name(&self) -> bool {
    self.first_name.is_some() || self.last_name.is_some() || self.middle_name.is_some()
  }
}

/// `first last middle`, skipping empty parts.
fn build_full_name(
  first: Option<&str>,
  last: Option<&str>,
  middle: Option<&str>,
) -> String {
  [first, last, middle]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Ten characters from an alphabet without look-alike glyphs.
pub fn generate_password() -> String {
  let len = PASSWORD_ALPHABET.len() as u32;
  // Reject the top sliver of the range so every symbol is equally likely.
  let limit = u32::MAX - u32::MAX % len;
  let mut out = String::with_capacity(PASSWORD_LEN);
  while out.len() < PASSWORD_LEN {
    let n = OsRng.next_u32();
    if n < limit {
      out.push(char::from(PASSWORD_ALPHABET[(n % len) as usize]));
    }
  }
  out
}

fn seed() -> Vec<Teacher> {
  let teacher = |id: &str, full_name: &str, username: &str, phone: &str, department: &str| {
    Teacher {
      id:             id.to_owned(),
      full_name:      full_name.to_owned(),
      first_name:     None,
      last_name:      None,
      middle_name:    None,
      username:       username.to_owned(),
      phone:          Some(phone.to_owned()),
      department:     Some(department.to_owned()),
      degree:         None,
      specialization: None,
      password:       generate_password(),
    }
  };
  vec![
    teacher("t1", "Aliyev Anvar", "anvar", "+998 90 123 45 67", "Dasturiy injiniring"),
    teacher("t2", "Qodirova Mohira", "mohira", "+998 93 765 43 21", "Axborot xavfsizligi"),
  ]
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Teacher collection operations over a borrowed store.
pub struct Teachers<'s, S: ?Sized> {
  store: &'s S,
}

impl<'s, S> Teachers<'s, S>
where
  S: KeyValueStore + ?Sized,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  /// All teachers, seeding two demo accounts on first use.
  pub fn list(&self) -> Result<Vec<Teacher>> { Ok(self.load()?.items) }

  fn load(&self) -> Result<Records<Teacher>> { read_or_seed(self.store, TEACHERS_KEY, seed) }

  pub fn get(&self, id: &str) -> Result<Option<Teacher>> {
    Ok(self.list()?.into_iter().find(|t| t.id == id))
  }

  /// Register a teacher with a fresh username and password.
  pub fn create(&self, input: NewTeacher) -> Result<Teacher> {
    let mut records = self.load()?;
    let all = &mut records.items;

    let username = generate_username(
      input.first_name.as_deref().unwrap_or_default(),
      input.last_name.as_deref().unwrap_or_default(),
      input.middle_name.as_deref(),
      all.iter().map(|t| (t.id.as_str(), t.username.as_str())),
      None,
    );
    let full_name = build_full_name(
      input.first_name.as_deref(),
      input.last_name.as_deref(),
      input.middle_name.as_deref(),
    );

    let created = Teacher {
      id: new_id(),
      full_name: if full_name.is_empty() { username.clone() } else { full_name },
      first_name: non_blank(input.first_name.as_deref()),
      last_name: non_blank(input.last_name.as_deref()),
      middle_name: non_blank(input.middle_name.as_deref()),
      username,
      phone: non_blank(input.phone.as_deref()),
      department: non_blank(input.department.as_deref()),
      degree: non_blank(input.degree.as_deref()),
      specialization: input.specialization,
      password: generate_password(),
    };
    tracing::debug!(id = %created.id, username = %created.username, "created teacher");

    all.insert(0, created.clone());
    write_collection(self.store, TEACHERS_KEY, &records)?;
    Ok(created)
  }

  /// Apply `patch` to the teacher with `id`. Returns `None` when absent.
  pub fn update(&self, id: &str, patch: TeacherPatch) -> Result<Option<Teacher>> {
    let mut records = self.load()?;
    let all = &mut records.items;
    let Some(idx) = all.iter().position(|t| t.id == id) else {
      return Ok(None);
    };

    let renamed = patch.touches_name();
    let mut updated = all[idx].clone();
    let optional = [
      (patch.first_name, &mut updated.first_name),
      (patch.last_name, &mut updated.last_name),
      (patch.middle_name, &mut updated.middle_name),
      (patch.phone, &mut updated.phone),
      (patch.department, &mut updated.department),
      (patch.degree, &mut updated.degree),
    ];
    for (value, field) in optional {
      if let Some(value) = value {
        *field = non_blank(Some(value.as_str()));
      }
    }
    if let Some(specialization) = patch.specialization {
      updated.specialization = Some(specialization);
    }
    if let Some(password) = patch.password.filter(|p| !p.is_empty()) {
      updated.password = password;
    }

    if renamed {
      let full_name = build_full_name(
        updated.first_name.as_deref(),
        updated.last_name.as_deref(),
        updated.middle_name.as_deref(),
      );
      if !full_name.is_empty() {
        updated.full_name = full_name;
      }
      updated.username = generate_username(
        updated.first_name.as_deref().unwrap_or_default(),
        updated.last_name.as_deref().unwrap_or_default(),
        updated.middle_name.as_deref(),
        all.iter().map(|t| (t.id.as_str(), t.username.as_str())),
        Some(id),
      );
      tracing::debug!(id, username = %updated.username, "regenerated teacher username");
    }

    all[idx] = updated.clone();
    write_collection(self.store, TEACHERS_KEY, &records)?;
    Ok(Some(updated))
  }

  /// Remove the teacher with `id`; absent ids are ignored. Lessons that
  /// reference the teacher keep the dangling id.
  pub fn delete(&self, id: &str) -> Result<()> {
    let mut records = self.load()?;
    records.items.retain(|t| t.id != id);
    write_collection(self.store, TEACHERS_KEY, &records)
  }

  pub fn password(&self, id: &str) -> Result<Option<String>> {
    Ok(self.get(id)?.map(|t| t.password))
  }

  /// Find the teacher whose username matches (trimmed, case-insensitive)
  /// and whose password matches exactly.
  pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Teacher>> {
    let wanted = username.trim().to_lowercase();
    Ok(
      self
        .list()?
        .into_iter()
        .find(|t| t.username.trim().to_lowercase() == wanted)
        .filter(|t| t.password == password),
    )
  }
}
