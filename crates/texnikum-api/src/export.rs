//! CSV downloads.
//!
//! | Path | Notes |
//! |------|-------|
//! | `/export/teachers.csv` | Directory, passwords omitted |
//! | `/export/students.csv` | Admin. Full roster |
//! | `/export/lessons.csv` | Timetable in display order |
//! | `/export/attendance/{date}.csv?group=` | One group's register for a day |

use axum::{
  extract::{Path, Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use texnikum_core::{
  attendance::Attendance,
  schedule::Schedule,
  store::KeyValueStore,
  students::Students,
  teachers::Teachers,
};
use texnikum_csv::{export, to_csv};

use crate::{ADMIN, AppState, BearerToken, error::ApiError};

fn csv_response(file_name: &str, rows: Vec<Vec<String>>) -> Response {
  (
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{file_name}\""),
      ),
    ],
    to_csv(rows),
  )
    .into_response()
}

/// Keep only characters that are safe inside a quoted header parameter.
fn file_name_part(value: &str) -> String {
  value
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
    .collect()
}

/// `GET /export/teachers.csv`
pub async fn teachers<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: KeyValueStore + 'static,
{
  let rows = state
    .run(|store, _| Ok(export::teacher_rows(&Teachers::new(store).list()?)))
    .await?;
  Ok(csv_response("teachers.csv", rows))
}

/// `GET /export/students.csv`
pub async fn students<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
) -> Result<Response, ApiError>
where
  S: KeyValueStore + 'static,
{
  let rows = state
    .run_as(token, ADMIN, |store, _| Ok(export::student_rows(&Students::new(store).list()?)))
    .await?;
  Ok(csv_response("students.csv", rows))
}

/// `GET /export/lessons.csv`
pub async fn lessons<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: KeyValueStore + 'static,
{
  let rows = state
    .run(|store, _| Ok(export::lesson_rows(&Schedule::new(store).list_lessons()?)))
    .await?;
  Ok(csv_response("lessons.csv", rows))
}

#[derive(Debug, Deserialize)]
pub struct AttendanceParams {
  pub group: String,
}

/// `GET /export/attendance/{date}.csv?group=...`
pub async fn attendance<S>(
  State(state): State<AppState<S>>,
  Path(file): Path<String>,
  Query(params): Query<AttendanceParams>,
) -> Result<Response, ApiError>
where
  S: KeyValueStore + 'static,
{
  let date = file
    .strip_suffix(".csv")
    .and_then(|d| d.parse::<NaiveDate>().ok())
    .ok_or_else(|| ApiError::BadRequest(format!("expected <YYYY-MM-DD>.csv, got {file}")))?;

  let file_name = format!("davomat-{}-{date}.csv", file_name_part(&params.group));
  let rows = state
    .run(move |store, _| {
      let students = Students::new(store).in_group(&params.group)?;
      let records = Attendance::new(store).list(date);
      Ok(export::attendance_rows(&params.group, &students, &records))
    })
    .await?;
  Ok(csv_response(&file_name, rows))
}
