//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Optional `?group=` filter |
//! | `POST`   | `/students` | Admin. Body: [`NewStudent`]; returns 201 |
//! | `PATCH`  | `/students/{id}` | Admin. Body: [`StudentPatch`] |
//! | `DELETE` | `/students/{id}` | Admin |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use texnikum_core::{
  store::KeyValueStore,
  students::{NewStudent, Student, StudentPatch, Students},
};

use crate::{ADMIN, AppState, BearerToken, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to one group, e.g. `5-26`.
  pub group: Option<String>,
}

fn not_found(id: &str) -> ApiError { ApiError::NotFound(format!("student {id}")) }

/// `GET /students[?group=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let found = state
    .run(move |store, _| {
      let students = Students::new(store);
      Ok(match params.group.as_deref() {
        Some(group) => students.in_group(group)?,
        None => students.list()?,
      })
    })
    .await?;
  Ok(Json(found))
}

/// `POST /students`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore + 'static,
{
  let created = state
    .run_as(token, ADMIN, move |store, _| {
      if body.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("fullName must not be blank".into()));
      }
      if let (Some(course), Some(group)) = (body.course, body.group.as_deref())
        && !course.has_group(group)
      {
        return Err(ApiError::BadRequest(format!("group {group} is not offered in {course}")));
      }
      Ok(Students::new(store).create(body)?)
    })
    .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /students/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Path(id): Path<String>,
  Json(patch): Json<StudentPatch>,
) -> Result<Json<Student>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let updated = state
    .run_as(token, ADMIN, move |store, _| {
      Students::new(store)
        .update(&id, patch)?
        .ok_or_else(|| not_found(&id))
    })
    .await?;
  Ok(Json(updated))
}

/// `DELETE /students/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: KeyValueStore + 'static,
{
  state
    .run_as(token, ADMIN, move |store, _| {
      let students = Students::new(store);
      if !students.list()?.iter().any(|s| s.id == id) {
        return Err(not_found(&id));
      }
      Ok(students.delete(&id)?)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
