//! Handlers for `/library` endpoints.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use texnikum_core::{
  library::{Library, LibraryItem, NewLibraryItem},
  store::KeyValueStore,
};

use crate::{ADMIN, AppState, BearerToken, error::ApiError};

/// `GET /library`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<LibraryItem>>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let items = state.run(|store, _| Ok(Library::new(store).list()?)).await?;
  Ok(Json(items))
}

/// `POST /library` (admin)
pub async fn add<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  Json(body): Json<NewLibraryItem>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore + 'static,
{
  let created = state
    .run_as(token, ADMIN, move |store, _| {
      if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be blank".into()));
      }
      Ok(Library::new(store).add(body)?)
    })
    .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /library/{id}` (admin)
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
      let library = Library::new(store);
      if !library.list()?.iter().any(|i| i.id == id) {
        return Err(ApiError::NotFound(format!("library item {id}")));
      }
      Ok(library.remove(&id)?)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
