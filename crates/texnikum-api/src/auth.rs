//! Handlers for `/auth` endpoints and the caller's token.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: [`Credentials`]; returns the session and its token |
//! | `POST` | `/auth/logout` | Ends the caller's session; 204 |
//! | `GET`  | `/auth/session` | The caller's session, guest without a token |

use std::convert::Infallible;

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{StatusCode, header, request::Parts},
};
use texnikum_core::{
  auth::{Credentials, Session, Sessions, SignedIn},
  store::KeyValueStore,
};

use crate::{AppState, error::ApiError};

/// The token from an `Authorization: Bearer <token>` header, if any.
///
/// A missing or malformed header is not an error; the caller is simply a
/// guest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
  pub fn as_deref(&self) -> Option<&str> { self.0.as_deref() }
}

impl<St> FromRequestParts<St> for BearerToken
where
  St: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    let token = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.strip_prefix("Bearer "))
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(str::to_owned);
    Ok(Self(token))
  }
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(credentials): Json<Credentials>,
) -> Result<Json<SignedIn>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let signed_in = state
    .run(move |store, admin_password| {
      Ok(Sessions::new(store, admin_password).login(credentials)?)
    })
    .await?;
  Ok(Json(signed_in))
}

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
) -> Result<StatusCode, ApiError>
where
  S: KeyValueStore + 'static,
{
  if let BearerToken(Some(token)) = token {
    state
      .run(move |store, admin_password| {
        Ok(Sessions::new(store, admin_password).logout(&token)?)
      })
      .await?;
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/session`
pub async fn session<S>(
  State(state): State<AppState<S>>,
  token: BearerToken,
) -> Result<Json<Session>, ApiError>
where
  S: KeyValueStore + 'static,
{
  let session = state
    .run(move |store, admin_password| {
      Ok(Sessions::new(store, admin_password).current(token.as_deref()))
    })
    .await?;
  Ok(Json(session))
}
