//! Row readers for CSV imports.
//!
//! The first row is the header. Columns are located by the exact titles the
//! exports write, so an exported file imports back unchanged; absent columns
//! read as empty cells.

use strum::IntoEnumIterator;
use texnikum_core::{
  students::{Course, EducationForm, NewStudent, Program},
  teachers::NewTeacher,
};

use crate::export::{STUDENT_HEADER, TEACHER_HEADER};

/// Inputs read from an import file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import<T> {
  pub inputs:  Vec<T>,
  /// Data rows that were not usable.
  pub skipped: usize,
}

fn column(header: &[String], title: &str) -> Option<usize> {
  header.iter().position(|h| h.trim() == title)
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
  idx.and_then(|i| row.get(i)).map_or("", |v| v.trim())
}

fn optional(value: &str) -> Option<String> { (!value.is_empty()).then(|| value.to_owned()) }

/// Case-insensitive lookup of an enum by its display name.
fn named<E: IntoEnumIterator + AsRef<str>>(value: &str) -> Option<E> {
  E::iter().find(|v| v.as_ref().eq_ignore_ascii_case(value))
}

fn collect<T>(data: &[Vec<String>], read: impl Fn(&[String]) -> Option<T>) -> Import<T> {
  let inputs: Vec<T> = data.iter().filter_map(|row| read(row)).collect();
  Import { skipped: data.len() - inputs.len(), inputs }
}

/// Teachers from a directory file. Rows with no name at all are skipped;
/// an unknown specialisation is dropped.
pub fn teacher_inputs(rows: &[Vec<String>]) -> Import<NewTeacher> {
  let Some((header, data)) = rows.split_first() else {
    return Import { inputs: Vec::new(), skipped: 0 };
  };
  let [first, last, middle, full, _username, phone, department, degree, specialization] =
    TEACHER_HEADER.map(|title| column(header, title));

  collect(data, |row| {
    let names = [cell(row, first), cell(row, last), cell(row, middle)];
    if cell(row, full).is_empty() && names.iter().all(|n| n.is_empty()) {
      return None;
    }
    Some(NewTeacher {
      first_name:     optional(names[0]),
      last_name:      optional(names[1]),
      middle_name:    optional(names[2]),
      phone:          optional(cell(row, phone)),
      department:     optional(cell(row, department)),
      degree:         optional(cell(row, degree)),
      specialization: cell(row, specialization).parse().ok(),
    })
  })
}

/// Students from a roster file. A row needs a name, a known course,
/// education form and programme, and a group offered in that course.
pub fn student_inputs(rows: &[Vec<String>]) -> Import<NewStudent> {
  let Some((header, data)) = rows.split_first() else {
    return Import { inputs: Vec::new(), skipped: 0 };
  };
  let [name_col, program_col, course_col, form_col, group_col] =
    STUDENT_HEADER.map(|title| column(header, title));

  collect(data, |row| {
    let full_name = cell(row, name_col);
    if full_name.is_empty() {
      return None;
    }
    let course: Course = named(cell(row, course_col))?;
    let group = cell(row, group_col);
    if !course.has_group(group) {
      return None;
    }
    Some(NewStudent {
      full_name:      full_name.to_owned(),
      first_name:     None,
      last_name:      None,
      course:         Some(course),
      education_form: Some(named::<EducationForm>(cell(row, form_col))?),
      program:        Some(named::<Program>(cell(row, program_col))?),
      group:          Some(group.to_owned()),
    })
  })
}
