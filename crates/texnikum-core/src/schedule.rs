//! Weekly lesson schedule.
//!
//! A lesson occupies one slot, a `(day, period)` pair. Stored records are
//! loosely typed (older dashboards wrote `subject` and `time` instead of
//! `suratSubject` and `period`), so every read passes each record through
//! [`normalize`] and writes the canonical form back.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
  Error, Result, new_id, non_blank,
  store::{KeyValueStore, read_collection, write_collection},
};

/// Storage key of the lesson collection.
pub const LESSONS_KEY: &str = "schedule-lessons";

// ─── Day ─────────────────────────────────────────────────────────────────────

/// Teaching day, in canonical order. Sunday is not a teaching day.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
pub enum Day {
  #[default]
  Dush,
  Sesh,
  Chor,
  Pay,
  Jum,
  Shan,
}

string_enum_serde!(Day);

impl Day {
  /// Position in the canonical day order, starting at 0.
  pub fn index(self) -> usize { self as usize }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// Bell times for periods 1 through 6.
const PERIOD_TIMES: [&str; 6] = [
  "08:30-09:50",
  "10:00-11:20",
  "11:30-12:50",
  "13:00-14:20",
  "14:30-15:50",
  "16:00-17:20",
];

/// A lesson period, 1 through 6.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Period(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("period must be between 1 and 6, got {0}")]
pub struct InvalidPeriod(pub u8);

impl Period {
  pub const FIRST: Self = Self(1);

  pub fn new(number: u8) -> Option<Self> {
    (1..=PERIOD_TIMES.len() as u8)
      .contains(&number)
      .then_some(Self(number))
  }

  pub fn number(self) -> u8 { self.0 }

  /// All periods in ascending order.
  pub fn all() -> impl Iterator<Item = Self> {
    (1..=PERIOD_TIMES.len() as u8).map(Self)
  }

  /// Bell time of this period, e.g. `"08:30-09:50"`.
  pub fn time_range(self) -> &'static str { PERIOD_TIMES[usize::from(self.0 - 1)] }

  /// Look up the period whose bell time is exactly `range`.
  pub fn from_time_range(range: &str) -> Option<Self> {
    PERIOD_TIMES
      .iter()
      .position(|t| *t == range)
      .and_then(|i| Self::new(i as u8 + 1))
  }
}

impl TryFrom<u8> for Period {
  type Error = InvalidPeriod;

  fn try_from(number: u8) -> Result<Self, InvalidPeriod> {
    Self::new(number).ok_or(InvalidPeriod(number))
  }
}

impl From<Period> for u8 {
  fn from(period: Period) -> u8 { period.0 }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// ─── Lesson ──────────────────────────────────────────────────────────────────

/// A canonical, stored lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  pub id:                String,
  pub day:               Day,
  pub period:            Period,
  /// Primary subject; never blank.
  pub surat_subject:     String,
  /// Alternating subject taught in the same slot on alternate weeks.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maxraj_subject:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub room:              Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub surat_teacher_id:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maxraj_teacher_id: Option<String>,
}

/// Input to [`Schedule::add_lesson`]: a lesson without its id. The subject
/// must not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
  pub day:               Day,
  pub period:            Period,
  pub surat_subject:     String,
  #[serde(default)]
  pub maxraj_subject:    Option<String>,
  #[serde(default)]
  pub room:              Option<String>,
  #[serde(default)]
  pub surat_teacher_id:  Option<String>,
  #[serde(default)]
  pub maxraj_teacher_id: Option<String>,
}

impl NewLesson {
  /// Convenience constructor with all optional fields unset.
  pub fn new(day: Day, period: Period, surat_subject: impl Into<String>) -> Self {
    Self {
      day,
      period,
      surat_subject: surat_subject.into(),
      maxraj_subject: None,
      room: None,
      surat_teacher_id: None,
      maxraj_teacher_id: None,
    }
  }

  fn into_lesson(self, id: String) -> Lesson {
    Lesson {
      id,
      day: self.day,
      period: self.period,
      surat_subject: self.surat_subject.trim().to_owned(),
      maxraj_subject: non_blank(self.maxraj_subject.as_deref()),
      room: non_blank(self.room.as_deref()),
      surat_teacher_id: non_blank(self.surat_teacher_id.as_deref()),
      maxraj_teacher_id: non_blank(self.maxraj_teacher_id.as_deref()),
    }
  }
}

/// Partial update for [`Schedule::update_lesson`].
///
/// `None` keeps the current value. For the optional text fields, a blank
/// string clears the value; a blank subject keeps the previous subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPatch {
  pub day:               Option<Day>,
  pub period:            Option<Period>,
  pub surat_subject:     Option<String>,
  pub maxraj_subject:    Option<String>,
  pub room:              Option<String>,
  pub surat_teacher_id:  Option<String>,
  pub maxraj_teacher_id: Option<String>,
}

impl LessonPatch {
  fn apply(self, lesson: &mut Lesson) {
    if let Some(day) = self.day {
      lesson.day = day;
    }
    if let Some(period) = self.period {
      lesson.period = period;
    }
    if let Some(subject) = non_blank(self.surat_subject.as_deref()) {
      lesson.surat_subject = subject;
    }
    let optional = [
      (self.maxraj_subject, &mut lesson.maxraj_subject),
      (self.room, &mut lesson.room),
      (self.surat_teacher_id, &mut lesson.surat_teacher_id),
      (self.maxraj_teacher_id, &mut lesson.maxraj_teacher_id),
    ];
    for (value, field) in optional {
      if let Some(value) = value {
        *field = non_blank(Some(value.as_str()));
      }
    }
  }
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Why a stored record could not become a [`Lesson`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
  #[error("record is not an object")]
  NotAnObject,
  #[error("record has no usable subject")]
  MissingSubject,
}

/// Result of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
  Valid(Lesson),
  Rejected(RejectReason),
}

impl Normalized {
  pub fn into_lesson(self) -> Option<Lesson> {
    match self {
      Self::Valid(lesson) => Some(lesson),
      Self::Rejected(_) => None,
    }
  }
}

/// Turn a loosely typed stored record into a canonical [`Lesson`].
///
/// Missing or unrecognised day and period fall back to the first day and the
/// first period; only a missing subject rejects the record.
pub fn normalize(raw: &Value) -> Normalized {
  let Some(obj) = raw.as_object() else {
    return Normalized::Rejected(RejectReason::NotAnObject);
  };

  // `subject` is only consulted when `suratSubject` is absent or null.
  let subject = obj
    .get("suratSubject")
    .filter(|v| !v.is_null())
    .or_else(|| obj.get("subject"));
  let Some(surat_subject) = trimmed_str(subject) else {
    return Normalized::Rejected(RejectReason::MissingSubject);
  };

  let id = obj
    .get("id")
    .and_then(Value::as_str)
    .filter(|s| !s.trim().is_empty())
    .map_or_else(new_id, str::to_owned);

  let day = obj
    .get("day")
    .and_then(Value::as_str)
    .and_then(|s| s.parse().ok())
    .unwrap_or_default();

  Normalized::Valid(Lesson {
    id,
    day,
    period: resolve_period(obj),
    surat_subject,
    maxraj_subject: trimmed_str(obj.get("maxrajSubject")),
    room: trimmed_str(obj.get("room")),
    surat_teacher_id: trimmed_str(obj.get("suratTeacherId")),
    maxraj_teacher_id: trimmed_str(obj.get("maxrajTeacherId")),
  })
}

fn trimmed_str(value: Option<&Value>) -> Option<String> {
  non_blank(value.and_then(Value::as_str))
}

/// `period` as a number (or numeric string), then the legacy `time` field,
/// then period 1.
fn resolve_period(obj: &Map<String, Value>) -> Period {
  let numeric = obj.get("period").and_then(|v| match v {
    Value::Number(n) => n.as_f64(),
    Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
    _ => None,
  });

  numeric
    .filter(|n| n.fract() == 0.0 && (1.0..=6.0).contains(n))
    .and_then(|n| Period::new(n as u8))
    .or_else(|| {
      obj
        .get("time")
        .and_then(Value::as_str)
        .and_then(Period::from_time_range)
    })
    .unwrap_or(Period::FIRST)
}

/// Stable sort by canonical day, then period.
pub fn sort_for_display(lessons: &mut [Lesson]) {
  lessons.sort_by_key(|l| (l.day, l.period));
}

fn seed() -> Vec<Value> {
  vec![
    json!({
      "id": "l1", "day": "Dush", "period": 1,
      "suratSubject": "Matematika", "maxrajSubject": "Tarix", "room": "A-101"
    }),
    json!({
      "id": "l2", "day": "Sesh", "period": 2,
      "suratSubject": "Dasturlash", "room": "B-203"
    }),
  ]
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Lesson collection operations over a borrowed store.
///
/// Every call re-reads the collection; nothing is cached between calls.
pub struct Schedule<'s, S: ?Sized> {
  store: &'s S,
}

impl<'s, S> Schedule<'s, S>
where
  S: KeyValueStore + ?Sized,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  /// Load, normalise, and write back every stored lesson.
  pub fn list_lessons(&self) -> Result<Vec<Lesson>> {
    let raw: Vec<Value> =
      read_collection(self.store, LESSONS_KEY).or_fallback(LESSONS_KEY, seed);

    let lessons: Vec<Lesson> = raw
      .iter()
      .filter_map(|record| match normalize(record) {
        Normalized::Valid(lesson) => Some(lesson),
        Normalized::Rejected(reason) => {
          tracing::debug!(%reason, "dropping stored lesson");
          None
        }
      })
      .collect();

    write_collection(self.store, LESSONS_KEY, &lessons)?;
    Ok(lessons)
  }

  /// Place a lesson in its slot. An occupied slot is overwritten in place,
  /// keeping the existing lesson's id; otherwise the lesson is prepended.
  pub fn add_lesson(&self, input: NewLesson) -> Result<Lesson> {
    if input.surat_subject.trim().is_empty() {
      return Err(Error::InvalidInput("suratSubject must not be blank"));
    }
    let mut all = self.list_lessons()?;

    let occupied = all
      .iter()
      .position(|l| l.day == input.day && l.period == input.period);

    let lesson = match occupied {
      Some(idx) => {
        let merged = input.into_lesson(all[idx].id.clone());
        tracing::debug!(
          id = %merged.id, day = %merged.day, period = %merged.period,
          "slot occupied, merging lesson"
        );
        all[idx] = merged.clone();
        merged
      }
      None => {
        let created = input.into_lesson(new_id());
        all.insert(0, created.clone());
        created
      }
    };

    write_collection(self.store, LESSONS_KEY, &all)?;
    Ok(lesson)
  }

  /// Apply `patch` to the lesson with `id`. Returns `None` when absent.
  ///
  /// Slot uniqueness is not re-checked here, so moving a lesson onto an
  /// occupied slot leaves two lessons in it.
  pub fn update_lesson(&self, id: &str, patch: LessonPatch) -> Result<Option<Lesson>> {
    let mut all = self.list_lessons()?;
    let Some(lesson) = all.iter_mut().find(|l| l.id == id) else {
      return Ok(None);
    };

    patch.apply(lesson);
    let updated = lesson.clone();
    write_collection(self.store, LESSONS_KEY, &all)?;
    Ok(Some(updated))
  }

  /// Remove the lesson with `id`; absent ids are ignored.
  pub fn remove_lesson(&self, id: &str) -> Result<()> {
    let mut all = self.list_lessons()?;
    all.retain(|l| l.id != id);
    write_collection(self.store, LESSONS_KEY, &all)
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;
  use crate::store::MemoryStore;

  fn valid(raw: Value) -> Lesson {
    match normalize(&raw) {
      Normalized::Valid(lesson) => lesson,
      Normalized::Rejected(reason) => panic!("unexpected rejection: {reason}"),
    }
  }

  fn empty_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.set(LESSONS_KEY, "[]".into()).unwrap();
    store
  }

  // ─── normalize ─────────────────────────────────────────────────────────────

  #[test]
  fn legacy_subject_and_string_period() {
    let lesson = valid(json!({ "subject": "Fizika", "period": "2" }));
    assert_eq!(lesson.surat_subject, "Fizika");
    assert_eq!(lesson.period.number(), 2);
    assert_eq!(lesson.day, Day::Dush);
    assert!(!lesson.id.is_empty());
  }

  #[test]
  fn blank_subject_is_rejected() {
    let result = normalize(&json!({ "suratSubject": "  ", "period": 1, "day": "Dush" }));
    assert_eq!(result, Normalized::Rejected(RejectReason::MissingSubject));
  }

  #[test]
  fn blank_surat_subject_does_not_fall_back_to_subject() {
    let result = normalize(&json!({ "suratSubject": "", "subject": "Tarix" }));
    assert_eq!(result, Normalized::Rejected(RejectReason::MissingSubject));
  }

  #[test]
  fn null_surat_subject_falls_back_to_subject() {
    let lesson = valid(json!({ "suratSubject": null, "subject": " Tarix " }));
    assert_eq!(lesson.surat_subject, "Tarix");
  }

  #[test]
  fn non_object_is_rejected() {
    assert_eq!(
      normalize(&json!("Matematika")),
      Normalized::Rejected(RejectReason::NotAnObject)
    );
    assert_eq!(normalize(&Value::Null), Normalized::Rejected(RejectReason::NotAnObject));
  }

  #[test]
  fn legacy_time_resolves_period() {
    let lesson = valid(json!({ "subject": "Kimyo", "time": "13:00-14:20" }));
    assert_eq!(lesson.period.number(), 4);
  }

  #[test]
  fn numeric_period_wins_over_time() {
    let lesson = valid(json!({ "subject": "Kimyo", "period": 6, "time": "08:30-09:50" }));
    assert_eq!(lesson.period.number(), 6);
  }

  #[test]
  fn out_of_range_period_falls_back() {
    let lesson = valid(json!({ "subject": "Kimyo", "period": 9, "time": "10:00-11:20" }));
    assert_eq!(lesson.period.number(), 2);

    let lesson = valid(json!({ "subject": "Kimyo", "period": 2.5 }));
    assert_eq!(lesson.period, Period::FIRST);

    let lesson = valid(json!({ "subject": "Kimyo", "period": "abc" }));
    assert_eq!(lesson.period, Period::FIRST);
  }

  #[test]
  fn unknown_day_defaults_to_first() {
    let lesson = valid(json!({ "subject": "Kimyo", "day": "Yak" }));
    assert_eq!(lesson.day, Day::Dush);
    let lesson = valid(json!({ "subject": "Kimyo", "day": "Jum" }));
    assert_eq!(lesson.day, Day::Jum);
  }

  #[test]
  fn optional_fields_are_trimmed_or_dropped() {
    let lesson = valid(json!({
      "id": "x1",
      "suratSubject": "Tarix",
      "maxrajSubject": "   ",
      "room": " A-1 ",
      "suratTeacherId": 42,
      "maxrajTeacherId": " t2 "
    }));
    assert_eq!(lesson.id, "x1");
    assert_eq!(lesson.maxraj_subject, None);
    assert_eq!(lesson.room.as_deref(), Some("A-1"));
    assert_eq!(lesson.surat_teacher_id, None);
    assert_eq!(lesson.maxraj_teacher_id.as_deref(), Some("t2"));
  }

  #[test]
  fn blank_id_is_replaced() {
    let lesson = valid(json!({ "id": "  ", "subject": "Tarix" }));
    assert_ne!(lesson.id.trim(), "");
  }

  #[test]
  fn period_table_round_trips() {
    for period in Period::all() {
      assert_eq!(Period::from_time_range(period.time_range()), Some(period));
    }
    assert_eq!(Period::FIRST.time_range(), "08:30-09:50");
    assert_eq!(Period::new(6).map(Period::time_range), Some("16:00-17:20"));
    assert_eq!(Period::new(0), None);
    assert_eq!(Period::new(7), None);
  }

  #[test]
  fn day_order_is_canonical() {
    let days: Vec<String> = Day::iter().map(|d| d.to_string()).collect();
    assert_eq!(days, ["Dush", "Sesh", "Chor", "Pay", "Jum", "Shan"]);
    assert_eq!(Day::Shan.index(), 5);
  }

  // ─── Schedule service ──────────────────────────────────────────────────────

  #[test]
  fn missing_collection_lists_seed() {
    let store = MemoryStore::new();
    let lessons = Schedule::new(&store).list_lessons().unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].surat_subject, "Matematika");
    assert_eq!(lessons[0].maxraj_subject.as_deref(), Some("Tarix"));
  }

  #[test]
  fn list_writes_normalised_form_back() {
    let store = MemoryStore::new();
    store
      .set(
        LESSONS_KEY,
        json!([
          { "id": "a", "subject": "Fizika", "time": "11:30-12:50" },
          { "id": "b", "subject": "" },
          42
        ])
        .to_string(),
      )
      .unwrap();

    let lessons = Schedule::new(&store).list_lessons().unwrap();
    assert_eq!(lessons.len(), 1);

    let stored: Vec<Value> =
      serde_json::from_str(&store.get(LESSONS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(
      stored,
      vec![json!({ "id": "a", "day": "Dush", "period": 3, "suratSubject": "Fizika" })]
    );
  }

  #[test]
  fn adding_to_occupied_slot_merges() {
    let store = empty_store();
    let schedule = Schedule::new(&store);

    let mut first = NewLesson::new(Day::Dush, Period::FIRST, "Matematika");
    first.maxraj_subject = Some("Tarix".into());
    let created = schedule.add_lesson(first).unwrap();

    let merged = schedule
      .add_lesson(NewLesson::new(Day::Dush, Period::FIRST, "Fizika"))
      .unwrap();

    assert_eq!(merged.id, created.id);
    assert_eq!(merged.surat_subject, "Fizika");
    assert_eq!(merged.maxraj_subject, None);

    let lessons = schedule.list_lessons().unwrap();
    let in_slot: Vec<_> = lessons
      .iter()
      .filter(|l| l.day == Day::Dush && l.period == Period::FIRST)
      .collect();
    assert_eq!(in_slot.len(), 1);
    assert_eq!(in_slot[0].surat_subject, "Fizika");
  }

  #[test]
  fn new_slot_is_prepended() {
    let store = empty_store();
    let schedule = Schedule::new(&store);
    let two = Period::new(2).unwrap();

    schedule
      .add_lesson(NewLesson::new(Day::Dush, Period::FIRST, "A"))
      .unwrap();
    let second = schedule.add_lesson(NewLesson::new(Day::Sesh, two, "B")).unwrap();

    let lessons = schedule.list_lessons().unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].id, second.id);
  }

  #[test]
  fn update_missing_returns_none_and_keeps_collection() {
    let store = MemoryStore::new();
    let schedule = Schedule::new(&store);
    let before = schedule.list_lessons().unwrap();

    let result = schedule
      .update_lesson("nope", LessonPatch { room: Some("X".into()), ..Default::default() })
      .unwrap();

    assert!(result.is_none());
    assert_eq!(schedule.list_lessons().unwrap(), before);
  }

  #[test]
  fn update_keeps_subject_when_patch_omits_it() {
    let store = MemoryStore::new();
    let schedule = Schedule::new(&store);

    let patch = LessonPatch {
      room: Some("C-7".into()),
      maxraj_subject: Some(String::new()),
      ..Default::default()
    };
    let updated = schedule.update_lesson("l1", patch).unwrap().unwrap();

    assert_eq!(updated.id, "l1");
    assert_eq!(updated.surat_subject, "Matematika");
    assert_eq!(updated.room.as_deref(), Some("C-7"));
    assert_eq!(updated.maxraj_subject, None);
  }

  #[test]
  fn blank_subject_cannot_overwrite_occupied_slot() {
    let store = MemoryStore::new();
    let schedule = Schedule::new(&store);

    let err = schedule
      .add_lesson(NewLesson::new(Day::Dush, Period::FIRST, "   "))
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let lessons = schedule.list_lessons().unwrap();
    let kept = lessons.iter().find(|l| l.id == "l1").expect("seeded lesson kept");
    assert_eq!(kept.surat_subject, "Matematika");
  }

  #[test]
  fn update_does_not_enforce_slot_uniqueness() {
    let store = MemoryStore::new();
    let schedule = Schedule::new(&store);

    let patch = LessonPatch {
      day: Some(Day::Dush),
      period: Some(Period::FIRST),
      ..Default::default()
    };
    schedule.update_lesson("l2", patch).unwrap().unwrap();

    let lessons = schedule.list_lessons().unwrap();
    let in_slot = lessons
      .iter()
      .filter(|l| l.day == Day::Dush && l.period == Period::FIRST)
      .count();
    assert_eq!(in_slot, 2);
  }

  #[test]
  fn remove_is_idempotent() {
    let store = MemoryStore::new();
    let schedule = Schedule::new(&store);

    schedule.remove_lesson("l1").unwrap();
    schedule.remove_lesson("l1").unwrap();

    let lessons = schedule.list_lessons().unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].id, "l2");
  }

  #[test]
  fn display_order_is_day_then_period() {
    let store = empty_store();
    let schedule = Schedule::new(&store);
    let p = |n| Period::new(n).unwrap();

    schedule.add_lesson(NewLesson::new(Day::Shan, p(1), "E")).unwrap();
    schedule.add_lesson(NewLesson::new(Day::Dush, p(3), "B")).unwrap();
    schedule.add_lesson(NewLesson::new(Day::Chor, p(2), "D")).unwrap();
    schedule.add_lesson(NewLesson::new(Day::Dush, p(1), "A")).unwrap();
    schedule.add_lesson(NewLesson::new(Day::Sesh, p(6), "C")).unwrap();

    let mut lessons = schedule.list_lessons().unwrap();
    sort_for_display(&mut lessons);
    let order: String = lessons.iter().map(|l| l.surat_subject.as_str()).collect();
    assert_eq!(order, "ABCDE");
  }

  #[test]
  fn corrupt_collection_falls_back_to_seed() {
    let store = MemoryStore::new();
    store.set(LESSONS_KEY, "{\"not\": \"an array\"}".into()).unwrap();

    let lessons = Schedule::new(&store).list_lessons().unwrap();
    assert_eq!(lessons.len(), 2);
  }
}
