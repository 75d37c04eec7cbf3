//! Handlers for `/attendance/{date}`.
//!
//! Dates are `YYYY-MM-DD`. Marking is open to admins and teachers.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use texnikum_core::{
  attendance::{Attendance, AttendanceRecord, AttendanceStatus},
  store::KeyValueStore,
  students::Students,
};

use crate::{AppState, BearerToken, STAFF, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
  pub student_id: String,
  pub status:     AttendanceStatus,
}

/// `GET /attendance/{date}`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let records = state.run(move |store, _| Ok(Attendance::new(store).list(date))).await?;
  Ok(Json(records))
}

/// `PUT /attendance/{date}`
pub async fn mark<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Path(date): Path<NaiveDate>,
  Json(body): Json<MarkBody>,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let record = state
    .run_as(token, STAFF, move |store, session| {
      let known = Students::new(store)
        .list()?
        .iter()
        .any(|s| s.id == body.student_id);
      if !known {
        return Err(ApiError::NotFound(format!("student {}", body.student_id)));
      }

      let record = Attendance::new(store).set(date, &body.student_id, body.status)?;
      tracing::debug!(
        %date,
        student_id = %record.student_id,
        status = %record.status,
        marked_by = session.user_name.as_deref().unwrap_or_default(),
        "attendance marked"
      );
      Ok(record)
    })
    .await?;
  Ok(Json(record))
}
