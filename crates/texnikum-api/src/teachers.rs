//! Handlers for `/teachers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/teachers` | Directory without passwords |
//! | `POST`   | `/teachers` | Admin. Body: [`NewTeacher`]; returns 201 + the full record, password included |
//! | `PATCH`  | `/teachers/{id}` | Admin. Body: [`TeacherPatch`] |
//! | `DELETE` | `/teachers/{id}` | Admin |
//! | `GET`    | `/teachers/{id}/password` | Admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use texnikum_core::{
  store::KeyValueStore,
  teachers::{NewTeacher, Specialization, Teacher, TeacherPatch, Teachers},
};

use crate::{ADMIN, AppState, BearerToken, error::ApiError};

/// A directory entry as shown to any visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherView {
  pub id:             String,
  pub full_name:      String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub middle_name:    Option<String>,
  pub username:       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub department:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub degree:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub specialization: Option<Specialization>,
}

impl From<Teacher> for TeacherView {
  fn from(t: Teacher) -> Self {
    Self {
      id:             t.id,
      full_name:      t.full_name,
      first_name:     t.first_name,
      last_name:      t.last_name,
      middle_name:    t.middle_name,
      username:       t.username,
      phone:          t.phone,
      department:     t.department,
      degree:         t.degree,
      specialization: t.specialization,
    }
  }
}

fn not_found(id: &str) -> ApiError { ApiError::NotFound(format!("teacher {id}")) }

/// `GET /teachers`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<TeacherView>>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let teachers = state.run(|store, _| Ok(Teachers::new(store).list()?)).await?;
  Ok(Json(teachers.into_iter().map(TeacherView::from).collect()))
}

/// `POST /teachers`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Json(body): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore + 'static,
{
  let created = state
    .run_as(token, ADMIN, move |store, _| Ok(Teachers::new(store).create(body)?))
    .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /teachers/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Path(id): Path<String>,
  Json(patch): Json<TeacherPatch>,
) -> Result<Json<TeacherView>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let updated = state
    .run_as(token, ADMIN, move |store, _| {
      Teachers::new(store)
        .update(&id, patch)?
        .ok_or_else(|| not_found(&id))
    })
    .await?;
  Ok(Json(updated.into()))
}

/// `DELETE /teachers/{id}`
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
      let teachers = Teachers::new(store);
      if teachers.get(&id)?.is_none() {
        return Err(not_found(&id));
      }
      Ok(teachers.delete(&id)?)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /teachers/{id}/password`
pub async fn password<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let password = state
    .run_as(token, ADMIN, move |store, _| {
      Teachers::new(store).password(&id)?.ok_or_else(|| not_found(&id))
    })
    .await?;
  Ok(Json(json!({ "password": password })))
}
