//! Row builders for the dashboard's CSV exports.
//!
//! Each builder returns a header row followed by one row per record, ready
//! for [`crate::to_csv`]. Column titles are the ones staff see in the
//! dashboard.

use texnikum_core::{
  attendance::{AttendanceRecord, UNMARKED_LABEL},
  schedule::{Lesson, sort_for_display},
  students::Student,
  teachers::Teacher,
};

pub const TEACHER_HEADER: [&str; 9] = [
  "Ism",
  "Familiya",
  "Sharifi",
  "F.I.Sh",
  "Username",
  "Telefon",
  "Kafedra",
  "Daraja",
  "Mutaxasislik",
];

pub const STUDENT_HEADER: [&str; 5] =
  ["F.I.Sh", "Yo‘nalish", "Kurs", "Ta'lim shakli", "Guruh"];

pub const ATTENDANCE_HEADER: [&str; 4] = ["T/r", "F.I.Sh", "Guruh", "Holat"];

pub const LESSON_HEADER: [&str; 6] = ["Kun", "Para", "Vaqt", "Surat", "Maxraj", "Xona"];

fn header(titles: &[&str]) -> Vec<String> {
  titles.iter().map(|t| (*t).to_owned()).collect()
}

fn text(value: Option<&str>) -> String { value.unwrap_or_default().to_owned() }

fn label<T: AsRef<str>>(value: Option<T>) -> String {
  value.map(|v| v.as_ref().to_owned()).unwrap_or_default()
}

/// Teacher directory export. Passwords are never exported.
pub fn teacher_rows(teachers: &[Teacher]) -> Vec<Vec<String>> {
  let mut rows = vec![header(&TEACHER_HEADER)];
  rows.extend(teachers.iter().map(|t| {
    vec![
      text(t.first_name.as_deref()),
      text(t.last_name.as_deref()),
      text(t.middle_name.as_deref()),
      t.full_name.clone(),
      t.username.clone(),
      text(t.phone.as_deref()),
      text(t.department.as_deref()),
      text(t.degree.as_deref()),
      label(t.specialization),
    ]
  }));
  rows
}

pub fn student_rows(students: &[Student]) -> Vec<Vec<String>> {
  let mut rows = vec![header(&STUDENT_HEADER)];
  rows.extend(students.iter().map(|s| {
    vec![
      s.full_name.clone(),
      label(s.program),
      label(s.course),
      label(s.education_form),
      text(s.group.as_deref()),
    ]
  }));
  rows
}

/// Attendance register for one group on one day. Students are numbered in
/// the order given; unmarked students get a placeholder status.
pub fn attendance_rows(
  group: &str,
  students: &[Student],
  records: &[AttendanceRecord],
) -> Vec<Vec<String>> {
  let mut rows = vec![header(&ATTENDANCE_HEADER)];
  rows.extend(students.iter().enumerate().map(|(idx, s)| {
    let status = records
      .iter()
      .find(|r| r.student_id == s.id)
      .map_or(UNMARKED_LABEL, |r| r.status.label());
    vec![
      (idx + 1).to_string(),
      s.full_name.clone(),
      group.to_owned(),
      status.to_owned(),
    ]
  }));
  rows
}

/// Weekly timetable in display order.
pub fn lesson_rows(lessons: &[Lesson]) -> Vec<Vec<String>> {
  let mut sorted = lessons.to_vec();
  sort_for_display(&mut sorted);

  let mut rows = vec![header(&LESSON_HEADER)];
  rows.extend(sorted.iter().map(|l| {
    vec![
      l.day.to_string(),
      l.period.to_string(),
      l.period.time_range().to_owned(),
      l.surat_subject.clone(),
      text(l.maxraj_subject.as_deref()),
      text(l.room.as_deref()),
    ]
  }));
  rows
}
