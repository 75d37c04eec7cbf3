//! Per-day attendance marks.
//!
//! At most one record exists per `(date, student)`; marking again replaces
//! the status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Result, new_id,
  store::{KeyValueStore, Records, read_records, write_collection},
};

/// Storage key of the attendance collection.
pub const ATTENDANCE_KEY: &str = "attendance-records";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
  Present,
  Absent,
  Late,
}

string_enum_serde!(AttendanceStatus);

impl AttendanceStatus {
  /// Label shown in exported registers.
  pub fn label(self) -> &'static str {
    match self {
      Self::Present => "Keldi",
      Self::Absent => "Kelmedi",
      Self::Late => "Kechikdi",
    }
  }
}

/// Label for a student with no mark on the day.
pub const UNMARKED_LABEL: &str = "Belgilanmagan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
  pub id:         String,
  /// Serialised as `YYYY-MM-DD`.
  pub date:       NaiveDate,
  pub student_id: String,
  pub status:     AttendanceStatus,
}

pub struct Attendance<'s, S: ?Sized> {
  store: &'s S,
}

impl<'s, S> Attendance<'s, S>
where
  S: KeyValueStore + ?Sized,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  fn load(&self) -> Records<AttendanceRecord> {
    read_records(self.store, ATTENDANCE_KEY).or_fallback(ATTENDANCE_KEY, Records::default)
  }

  /// Records marked on `date`.
  pub fn list(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
    let mut all = self.load().items;
    all.retain(|r| r.date == date);
    all
  }

  /// Status of one student on `date`, if marked.
  pub fn status_of(&self, date: NaiveDate, student_id: &str) -> Option<AttendanceStatus> {
    self
      .load()
      .items
      .into_iter()
      .find(|r| r.date == date && r.student_id == student_id)
      .map(|r| r.status)
  }

  /// Mark a student for a day, replacing any earlier mark.
  pub fn set(
    &self,
    date: NaiveDate,
    student_id: &str,
    status: AttendanceStatus,
  ) -> Result<AttendanceRecord> {
    let mut records = self.load();
    let record = match records
      .items
      .iter_mut()
      .find(|r| r.date == date && r.student_id == student_id)
    {
      Some(existing) => {
        existing.status = status;
        existing.clone()
      }
      None => {
        let created = AttendanceRecord {
          id: new_id(),
          date,
          student_id: student_id.to_owned(),
          status,
        };
        records.items.push(created.clone());
        created
      }
    };
    write_collection(self.store, ATTENDANCE_KEY, &records)?;
    Ok(record)
  }
}
