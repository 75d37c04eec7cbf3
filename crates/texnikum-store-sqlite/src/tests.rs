//! Integration tests for `SqliteStore`.

use texnikum_core::{
  schedule::{Day, LESSONS_KEY, NewLesson, Period, Schedule},
  store::{KeyValueStore, Read, read_collection},
  teachers::{NewTeacher, Teachers},
};

use crate::SqliteStore;

fn store() -> SqliteStore { SqliteStore::open_in_memory().expect("in-memory store") }

// ─── Raw key/value ───────────────────────────────────────────────────────────

#[test]
fn get_missing_key_returns_none() {
  let s = store();
  assert_eq!(s.get("nothing").unwrap(), None);
}

#[test]
fn set_then_get() {
  let s = store();
  s.set("teachers", "[]".into()).unwrap();
  assert_eq!(s.get("teachers").unwrap().as_deref(), Some("[]"));
}

#[test]
fn set_overwrites_existing_value() {
  let s = store();
  s.set("k", "1".into()).unwrap();
  s.set("k", "2".into()).unwrap();
  assert_eq!(s.get("k").unwrap().as_deref(), Some("2"));
  assert_eq!(s.keys().unwrap(), vec!["k".to_string()]);
}

#[test]
fn keys_are_sorted() {
  let s = store();
  s.set("students", "[]".into()).unwrap();
  s.set("auth", "{}".into()).unwrap();
  s.set("library-items", "[]".into()).unwrap();
  assert_eq!(s.keys().unwrap(), ["auth", "library-items", "students"]);
}

// ─── Services over SQLite ────────────────────────────────────────────────────

#[test]
fn schedule_merge_holds_through_sqlite() {
  let s = store();
  s.set(LESSONS_KEY, "[]".into()).unwrap();
  let schedule = Schedule::new(&s);

  schedule
    .add_lesson(NewLesson::new(Day::Dush, Period::FIRST, "Matematika"))
    .unwrap();
  schedule
    .add_lesson(NewLesson::new(Day::Dush, Period::FIRST, "Fizika"))
    .unwrap();

  let lessons = schedule.list_lessons().unwrap();
  assert_eq!(lessons.len(), 1);
  assert_eq!(lessons[0].surat_subject, "Fizika");
}

#[test]
fn corrupt_row_is_reported_as_corrupt() {
  let s = store();
  s.set(LESSONS_KEY, "not json".into()).unwrap();
  let read: Read<Vec<serde_json::Value>> = read_collection(&s, LESSONS_KEY);
  assert!(matches!(read, Read::Corrupt(_)));
}

#[test]
fn data_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("texnikum.sqlite");

  let created = {
    let s = SqliteStore::open(&path).unwrap();
    Teachers::new(&s)
      .create(NewTeacher {
        first_name: Some("Ali".into()),
        last_name: Some("Valiyev".into()),
        ..Default::default()
      })
      .unwrap()
  };

  let s = SqliteStore::open(&path).unwrap();
  let teachers = Teachers::new(&s);
  let found = teachers.get(&created.id).unwrap().expect("teacher persisted");
  assert_eq!(found.username, "ali");
  assert_eq!(teachers.password(&created.id).unwrap(), Some(created.password));
}
