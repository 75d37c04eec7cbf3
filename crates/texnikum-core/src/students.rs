//! Student roster.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Result, new_id, non_blank,
  store::{KeyValueStore, Records, lenient, read_or_seed, write_collection},
};

/// Storage key of the student collection.
pub const STUDENTS_KEY: &str = "students";

const GROUPS_PER_COURSE: u32 = 24;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum Course {
  #[strum(serialize = "1-kurs")]
  First,
  #[strum(serialize = "2-kurs")]
  Second,
}

string_enum_serde!(Course);

impl Course {
  /// Intake year suffix used in group codes (`5-26` is group 5 of 1-kurs).
  fn group_suffix(self) -> u32 {
    match self {
      Self::First => 26,
      Self::Second => 25,
    }
  }

  /// Every valid group code for this course, in order.
  pub fn groups(self) -> Vec<String> {
    (1..=GROUPS_PER_COURSE)
      .map(|n| format!("{n}-{}", self.group_suffix()))
      .collect()
  }

  pub fn has_group(self, group: &str) -> bool {
    self.groups().iter().any(|g| g == group)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum EducationForm {
  Kunduzgi,
  Dual,
}

string_enum_serde!(EducationForm);

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum Program {
  Tikuvchilik,
  #[strum(serialize = "Tikuv mahsulotlari dizayneri")]
  TikuvMahsulotlariDizayneri,
  #[strum(serialize = "Raqamli axborotlar")]
  RaqamliAxborotlar,
  #[strum(serialize = "Kompyuter grafikasi")]
  KompyuterGrafikasi,
  Melioratsiya,
  Avtomobil,
  Oshpazlik,
  #[strum(serialize = "Sotuv-nazorat kassiri")]
  SotuvNazoratKassiri,
  Elektromontyor,
}

string_enum_serde!(Program);

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub id:             String,
  #[serde(default)]
  pub full_name:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub first_name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name:      Option<String>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub course:         Option<Course>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub education_form: Option<EducationForm>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub program:        Option<Program>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group:          Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
  pub full_name:      String,
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub course:         Option<Course>,
  pub education_form: Option<EducationForm>,
  pub program:        Option<Program>,
  pub group:          Option<String>,
}

/// Partial update for [`Students::update`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
  pub full_name:      Option<String>,
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub course:         Option<Course>,
  pub education_form: Option<EducationForm>,
  pub program:        Option<Program>,
  pub group:          Option<String>,
}

fn seed() -> Vec<Student> {
  vec![
    Student {
      id:             "s1".into(),
      full_name:      "Mohira Qahhorova".into(),
      first_name:     None,
      last_name:      None,
      course:         Some(Course::First),
      education_form: Some(EducationForm::Kunduzgi),
      program:        Some(Program::KompyuterGrafikasi),
      group:          Some("5-26".into()),
    },
    Student {
      id:             "s2".into(),
      full_name:      "Jahongir Ismoilov".into(),
      first_name:     None,
      last_name:      None,
      course:         Some(Course::Second),
      education_form: Some(EducationForm::Dual),
      program:        Some(Program::Tikuvchilik),
      group:          Some("12-25".into()),
    },
  ]
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct Students<'s, S: ?Sized> {
  store: &'s S,
}

impl<'s, S> Students<'s, S>
where
  S: KeyValueStore + ?Sized,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  pub fn list(&self) -> Result<Vec<Student>> { Ok(self.load()?.items) }

  fn load(&self) -> Result<Records<Student>> { read_or_seed(self.store, STUDENTS_KEY, seed) }

  /// Students whose group is exactly `group`.
  pub fn in_group(&self, group: &str) -> Result<Vec<Student>> {
    let mut all = self.list()?;
    all.retain(|s| s.group.as_deref() == Some(group));
    Ok(all)
  }

  pub fn create(&self, input: NewStudent) -> Result<Student> {
    let mut records = self.load()?;
    let created = Student {
      id:             new_id(),
      full_name:      input.full_name.trim().to_owned(),
      first_name:     non_blank(input.first_name.as_deref()),
      last_name:      non_blank(input.last_name.as_deref()),
      course:         input.course,
      education_form: input.education_form,
      program:        input.program,
      group:          non_blank(input.group.as_deref()),
    };
    records.items.insert(0, created.clone());
    write_collection(self.store, STUDENTS_KEY, &records)?;
    Ok(created)
  }

  pub fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>> {
    let mut records = self.load()?;
    let Some(student) = records.items.iter_mut().find(|s| s.id == id) else {
      return Ok(None);
    };

    if let Some(full_name) = non_blank(patch.full_name.as_deref()) {
      student.full_name = full_name;
    }
    let optional = [
      (patch.first_name, &mut student.first_name),
      (patch.last_name, &mut student.last_name),
      (patch.group, &mut student.group),
    ];
    for (value, field) in optional {
      if let Some(value) = value {
        *field = non_blank(Some(value.as_str()));
      }
    }
    if patch.course.is_some() {
      student.course = patch.course;
    }
    if patch.education_form.is_some() {
      student.education_form = patch.education_form;
    }
    if patch.program.is_some() {
      student.program = patch.program;
    }

    let updated = student.clone();
    write_collection(self.store, STUDENTS_KEY, &records)?;
    Ok(Some(updated))
  }

  pub fn delete(&self, id: &str) -> Result<()> {
    let mut records = self.load()?;
    records.items.retain(|s| s.id != id);
    write_collection(self.store, STUDENTS_KEY, &records)
  }
}
