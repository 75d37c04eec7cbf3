//! CSV uploads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import/teachers` | Admin. Body: a directory file as exported; returns 201 |
//! | `POST` | `/import/students` | Admin. Body: a roster file as exported; returns 201 |
//!
//! Each usable row is created as a new record, so importing the same file
//! twice yields duplicates. Imported records keep the file's order at the
//! top of the list.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use texnikum_core::{
  store::KeyValueStore,
  students::{Student, Students},
  teachers::{Teacher, Teachers},
};
use texnikum_csv::{
  import::{Import, student_inputs, teacher_inputs},
  parse_csv,
};

use crate::{ADMIN, AppState, BearerToken, error::ApiError};

/// What an import created and how many rows it passed over.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary<T> {
  pub imported: Vec<T>,
  pub skipped:  usize,
}

/// Create every input, last first, since each create goes to the top of
/// the list.
fn create_all<I, T>(
  import: Import<I>,
  mut create: impl FnMut(I) -> texnikum_core::Result<T>,
) -> Result<ImportSummary<T>, ApiError> {
  let mut imported = import
    .inputs
    .into_iter()
    .rev()
    .map(&mut create)
    .collect::<texnikum_core::Result<Vec<_>>>()?;
  imported.reverse();
  Ok(ImportSummary { imported, skipped: import.skipped })
}

/// `POST /import/teachers`
pub async fn teachers<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  body: String,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore + 'static,
{
  let summary: ImportSummary<Teacher> = state
    .run_as(token, ADMIN, move |store, session| {
      let import = teacher_inputs(&parse_csv(&body));
      let teachers = Teachers::new(store);
      let summary = create_all(import, |input| teachers.create(input))?;
      tracing::info!(
        imported = summary.imported.len(),
        skipped = summary.skipped,
        by = session.user_name.as_deref().unwrap_or_default(),
        "imported teachers"
      );
      Ok(summary)
    })
    .await?;
  Ok((StatusCode::CREATED, Json(summary)))
}

/// `POST /import/students`
pub async fn students<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
  body: String,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore + 'static,
{
  let summary: ImportSummary<Student> = state
    .run_as(token, ADMIN, move |store, session| {
      let import = student_inputs(&parse_csv(&body));
      let students = Students::new(store);
      let summary = create_all(import, |input| students.create(input))?;
      tracing::info!(
        imported = summary.imported.len(),
        skipped = summary.skipped,
        by = session.user_name.as_deref().unwrap_or_default(),
        "imported students"
      );
      Ok(summary)
    })
    .await?;
  Ok((StatusCode::CREATED, Json(summary)))
}
