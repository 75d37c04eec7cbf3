//! JSON REST API for the Texnikum dashboard.
//!
//! Exposes an axum [`Router`] backed by any [`KeyValueStore`]. Callers sign
//! in at `/auth/login` and send the returned token as
//! `Authorization: Bearer <token>`; writes are gated on that session's role.
//! Store access runs on tokio's blocking pool. TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", texnikum_api::api_router(AppState::new(store, admin_password)))
//! ```

pub mod attendance;
pub mod auth;
pub mod error;
pub mod export;
pub mod import;
pub mod lessons;
pub mod library;
pub mod students;
pub mod teachers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use texnikum_core::{
  auth::{Role, Session, Sessions},
  store::KeyValueStore,
};

pub use auth::BearerToken;
pub use error::ApiError;

/// Roles allowed to change the directory, roster, library and timetable.
const ADMIN: &[Role] = &[Role::Admin];
/// Roles allowed to mark attendance.
const STAFF: &[Role] = &[Role::Admin, Role::Teacher];

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S: ?Sized> {
  pub store:          Arc<S>,
  pub admin_password: Arc<str>,
}

impl<S: ?Sized> AppState<S> {
  pub fn new(store: Arc<S>, admin_password: impl Into<Arc<str>>) -> Self {
    Self { store, admin_password: admin_password.into() }
  }
}

impl<S: ?Sized> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:          Arc::clone(&self.store),
      admin_password: Arc::clone(&self.admin_password),
    }
  }
}

impl<S> AppState<S>
where
  S: KeyValueStore + ?Sized + 'static,
{
  /// Run `f` against the store on the blocking pool.
  async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
  where
    T: Send + 'static,
    F: FnOnce(&S, &str) -> Result<T, ApiError> + Send + 'static,
  {
    let store = Arc::clone(&self.store);
    let admin_password = Arc::clone(&self.admin_password);
    tokio::task::spawn_blocking(move || f(&*store, &*admin_password))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
  }

  /// Like [`run`](Self::run), but first checks that the caller's role is in
  /// `allowed`. The check and `f` share one blocking task.
  async fn run_as<T, F>(
    &self,
    token: BearerToken,
    allowed: &'static [Role],
    f: F,
  ) -> Result<T, ApiError>
  where
    T: Send + 'static,
    F: FnOnce(&S, Session) -> Result<T, ApiError> + Send + 'static,
  {
    self
      .run(move |store, admin_password| {
        let session = Sessions::new(store, admin_password).require(token.as_deref(), allowed)?;
        f(store, session)
      })
      .await
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: KeyValueStore + 'static,
{
  Router::new()
    // Session
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/logout", post(auth::logout::<S>))
    .route("/auth/session", get(auth::session::<S>))
    // Teachers
    .route("/teachers", get(teachers::list::<S>).post(teachers::create::<S>))
    .route("/teachers/{id}", patch(teachers::update::<S>).delete(teachers::remove::<S>))
    .route("/teachers/{id}/password", get(teachers::password::<S>))
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route("/students/{id}", patch(students::update::<S>).delete(students::remove::<S>))
    // Library
    .route("/library", get(library::list::<S>).post(library::add::<S>))
    .route("/library/{id}", delete(library::remove::<S>))
    // Lessons
    .route("/lessons", get(lessons::list::<S>).post(lessons::add::<S>))
    .route("/lessons/{id}", patch(lessons::update::<S>).delete(lessons::remove::<S>))
    // Attendance
    .route("/attendance/{date}", get(attendance::list::<S>).put(attendance::mark::<S>))
    // CSV
    .route("/export/teachers.csv", get(export::teachers::<S>))
    .route("/export/students.csv", get(export::students::<S>))
    .route("/export/lessons.csv", get(export::lessons::<S>))
    .route("/export/attendance/{file}", get(export::attendance::<S>))
    .route("/import/teachers", post(import::teachers::<S>))
    .route("/import/students", post(import::students::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use texnikum_core::store::MemoryStore;
  use tower::ServiceExt as _;

  use super::*;

  const ADMIN_PASSWORD: &str = "admin-secret";

  fn make_state() -> AppState<MemoryStore> {
    AppState::new(Arc::new(MemoryStore::new()), ADMIN_PASSWORD)
  }

  enum Payload {
    None,
    Json(Value),
    Csv(String),
  }

  async fn call(
    state: &AppState<MemoryStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: Payload,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match payload {
      Payload::None => Body::empty(),
      Payload::Json(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      Payload::Csv(text) => {
        builder = builder.header(header::CONTENT_TYPE, "text/csv");
        Body::from(text)
      }
    };
    api_router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  async fn login(state: &AppState<MemoryStore>, credentials: Value) -> String {
    let resp = call(state, "POST", "/auth/login", None, Payload::Json(credentials)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"].as_str().unwrap().to_owned()
  }

  async fn login_admin(state: &AppState<MemoryStore>) -> String {
    login(
      state,
      json!({ "userName": "admin", "password": ADMIN_PASSWORD, "role": "admin" }),
    )
    .await
  }

  // ── Session ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn session_defaults_to_guest() {
    let state = make_state();
    let resp = call(&state, "GET", "/auth/session", None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["role"], "guest");
  }

  #[tokio::test]
  async fn session_follows_the_token() {
    let state = make_state();
    let token = login_admin(&state).await;

    let resp = call(&state, "GET", "/auth/session", Some(&token), Payload::None).await;
    let session = body_json(resp).await;
    assert_eq!(session["role"], "admin");
    assert_eq!(session["userName"], "admin");

    let resp = call(&state, "POST", "/auth/logout", Some(&token), Payload::None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = call(&state, "GET", "/auth/session", Some(&token), Payload::None).await;
    assert_eq!(body_json(resp).await["role"], "guest");
  }

  #[tokio::test]
  async fn wrong_admin_password_is_unauthorized() {
    let state = make_state();
    let resp = call(
      &state,
      "POST",
      "/auth/login",
      None,
      Payload::Json(json!({ "userName": "admin", "password": "nope", "role": "admin" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(resp).await["error"].is_string());
  }

  // ── Role gating ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn guest_cannot_create_lessons() {
    let state = make_state();
    let resp = call(
      &state,
      "POST",
      "/lessons",
      None,
      Payload::Json(json!({ "day": "Dush", "period": 1, "suratSubject": "Fizika" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn admin_login_does_not_authorise_other_callers() {
    let state = make_state();
    let admin = login_admin(&state).await;

    let resp = call(&state, "DELETE", "/teachers/t1", None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = call(&state, "DELETE", "/teachers/t1", Some("forged"), Payload::None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    login(&state, json!({ "userName": "x", "role": "student" })).await;
    let resp = call(&state, "DELETE", "/teachers/t2", Some(&admin), Payload::None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn teacher_may_mark_attendance_but_not_edit_roster() {
    let state = make_state();
    let password = texnikum_core::teachers::Teachers::new(&*state.store)
      .password("t1")
      .unwrap()
      .unwrap();
    let token = login(
      &state,
      json!({ "userName": "anvar", "password": password, "role": "teacher" }),
    )
    .await;

    let resp = call(
      &state,
      "PUT",
      "/attendance/2025-09-01",
      Some(&token),
      Payload::Json(json!({ "studentId": "s1", "status": "late" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "late");

    let resp = call(&state, "DELETE", "/students/s1", Some(&token), Payload::None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Lessons ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_adds_lesson_into_occupied_slot() {
    let state = make_state();
    let token = login_admin(&state).await;

    let lesson = json!({ "day": "Sesh", "period": 3, "suratSubject": "Kimyo" });
    let first = call(&state, "POST", "/lessons", Some(&token), Payload::Json(lesson)).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;

    let again = json!({ "day": "Sesh", "period": 3, "suratSubject": "Biologiya" });
    let second = call(&state, "POST", "/lessons", Some(&token), Payload::Json(again)).await;
    assert_eq!(body_json(second).await["id"], first["id"]);

    let all = body_json(call(&state, "GET", "/lessons", None, Payload::None).await).await;
    let in_slot: Vec<_> = all
      .as_array()
      .unwrap()
      .iter()
      .filter(|l| l["day"] == "Sesh" && l["period"] == 3)
      .collect();
    assert_eq!(in_slot.len(), 1);
    assert_eq!(in_slot[0]["suratSubject"], "Biologiya");
  }

  #[tokio::test]
  async fn blank_subject_is_bad_request() {
    let state = make_state();
    let token = login_admin(&state).await;
    let resp = call(
      &state,
      "POST",
      "/lessons",
      Some(&token),
      Payload::Json(json!({ "day": "Dush", "period": 1, "suratSubject": "   " })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn unknown_ids_are_not_found() {
    let state = make_state();
    let token = login_admin(&state).await;
    let token = Some(token.as_str());

    let patch = Payload::Json(json!({ "room": "101" }));
    let resp = call(&state, "PATCH", "/lessons/missing", token, patch).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = call(&state, "DELETE", "/teachers/missing", token, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = call(&state, "GET", "/teachers/missing/password", token, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = call(&state, "DELETE", "/library/missing", token, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Teachers ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn teacher_listing_hides_passwords() {
    let state = make_state();
    let all = body_json(call(&state, "GET", "/teachers", None, Payload::None).await).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|t| t.get("password").is_none()));
  }

  #[tokio::test]
  async fn admin_creates_teacher_and_reads_password() {
    let state = make_state();
    let token = login_admin(&state).await;

    let resp = call(
      &state,
      "POST",
      "/teachers",
      Some(&token),
      Payload::Json(json!({ "firstName": "Ali", "lastName": "Valiyev" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["username"], "ali");

    let id = created["id"].as_str().unwrap();
    let uri = format!("/teachers/{id}/password");
    let resp = call(&state, "GET", &uri, Some(&token), Payload::None).await;
    assert_eq!(body_json(resp).await["password"], created["password"]);
  }

  // ── Export / import ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn lesson_export_is_csv() {
    let state = make_state();
    let resp = call(&state, "GET", "/export/lessons.csv", None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/csv"), "content type: {content_type}");
    let csv = body_text(resp).await;
    assert!(csv.starts_with("Kun,Para,Vaqt,Surat,Maxraj,Xona"), "csv: {csv}");
  }

  #[tokio::test]
  async fn student_export_is_admin_only() {
    let state = make_state();
    let resp = call(&state, "GET", "/export/students.csv", None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let token = login_admin(&state).await;
    let resp = call(&state, "GET", "/export/students.csv", Some(&token), Payload::None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn attendance_export_lists_group() {
    let state = make_state();
    let token = login_admin(&state).await;
    call(
      &state,
      "PUT",
      "/attendance/2025-09-01",
      Some(&token),
      Payload::Json(json!({ "studentId": "s1", "status": "present" })),
    )
    .await;

    let uri = "/export/attendance/2025-09-01.csv?group=5-26";
    let resp = call(&state, "GET", uri, None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert_eq!(
      disposition.to_str().unwrap(),
      "attachment; filename=\"davomat-5-26-2025-09-01.csv\""
    );
    let csv = body_text(resp).await;
    assert_eq!(csv, "T/r,F.I.Sh,Guruh,Holat\n1,Mohira Qahhorova,5-26,Keldi");
  }

  #[tokio::test]
  async fn attendance_export_file_name_is_sanitised() {
    let state = make_state();
    let uri = "/export/attendance/2025-09-01.csv?group=a%22%3B%20b";
    let resp = call(&state, "GET", uri, None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert_eq!(
      disposition.to_str().unwrap(),
      "attachment; filename=\"davomat-ab-2025-09-01.csv\""
    );
  }

  #[tokio::test]
  async fn attendance_export_rejects_bad_file_name() {
    let state = make_state();
    let uri = "/export/attendance/yesterday.csv?group=5-26";
    let resp = call(&state, "GET", uri, None, Payload::None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn exported_roster_imports_back() {
    let state = make_state();
    let token = login_admin(&state).await;

    let resp = call(&state, "GET", "/export/students.csv", Some(&token), Payload::None).await;
    let csv = body_text(resp).await;

    let resp = call(&state, "POST", "/import/students", None, Payload::Csv(csv.clone())).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call(&state, "POST", "/import/students", Some(&token), Payload::Csv(csv)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let summary = body_json(resp).await;
    assert_eq!(summary["skipped"], 0);
    let imported = summary["imported"].as_array().unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(imported[0]["fullName"], "Mohira Qahhorova");
    assert_eq!(imported[0]["group"], "5-26");

    let all = body_json(call(&state, "GET", "/students", None, Payload::None).await).await;
    let names: Vec<_> = all
      .as_array()
      .unwrap()
      .iter()
      .map(|s| s["fullName"].as_str().unwrap())
      .collect();
    assert_eq!(
      names,
      ["Mohira Qahhorova", "Jahongir Ismoilov", "Mohira Qahhorova", "Jahongir Ismoilov"]
    );
  }

  #[tokio::test]
  async fn teacher_import_generates_accounts() {
    let state = make_state();
    let token = login_admin(&state).await;
    let csv = "Ism,Familiya,Sharifi,F.I.Sh,Username,Telefon,Kafedra,Daraja,Mutaxasislik\n\
               Ali,Valiyev,,,,,IT,,Fizika\n\
               ,,,,,,,,";

    let resp = call(&state, "POST", "/import/teachers", Some(&token), Payload::Csv(csv.into())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let summary = body_json(resp).await;
    assert_eq!(summary["skipped"], 1);
    let imported = &summary["imported"][0];
    assert_eq!(imported["username"], "ali");
    assert_eq!(imported["fullName"], "Ali Valiyev");
    assert_eq!(imported["specialization"], "Fizika");
    assert!(imported["password"].as_str().is_some_and(|p| p.len() == 10));
  }
}
