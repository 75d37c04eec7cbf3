//! Handlers for `/lessons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/lessons` | Canonical lessons in display order |
//! | `POST`   | `/lessons` | Admin. Body: [`NewLesson`]; merges into an occupied slot |
//! | `PATCH`  | `/lessons/{id}` | Admin. Body: [`LessonPatch`] |
//! | `DELETE` | `/lessons/{id}` | Admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use texnikum_core::{
  schedule::{Lesson, LessonPatch, NewLesson, Schedule, sort_for_display},
  store::KeyValueStore,
};

use crate::{ADMIN, AppState, BearerToken, error::ApiError};

fn not_found(id: &str) -> ApiError { ApiError::NotFound(format!("lesson {id}")) }

/// `GET /lessons`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Lesson>>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let mut lessons = state.run(|store, _| Ok(Schedule::new(store).list_lessons()?)).await?;
  sort_for_display(&mut lessons);
  Ok(Json(lessons))
}

/// `POST /lessons`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Json(body): Json<NewLesson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore + 'static,
{
  let lesson = state
    .run_as(token, ADMIN, move |store, _| Ok(Schedule::new(store).add_lesson(body)?))
    .await?;
  Ok((StatusCode::CREATED, Json(lesson)))
}

/// `PATCH /lessons/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Path(id): Path<String>,
  Json(patch): Json<LessonPatch>,
) -> Result<Json<Lesson>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let updated = state
    .run_as(token, ADMIN, move |store, _| {
      Schedule::new(store)
        .update_lesson(&id, patch)?
        .ok_or_else(|| not_found(&id))
    })
    .await?;
  Ok(Json(updated))
}

/// `DELETE /lessons/{id}`
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
      let schedule = Schedule::new(store);
      if !schedule.list_lessons()?.iter().any(|l| l.id == id) {
        return Err(not_found(&id));
      }
      Ok(schedule.remove_lesson(&id)?)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
