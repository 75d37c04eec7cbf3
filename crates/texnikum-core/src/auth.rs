//! Signed-in sessions and role checks.
//!
//! Each login issues an opaque token and stores the session under it. Role
//! checks look the caller's token up; an absent or unknown token is a guest.

use std::collections::BTreeMap;

use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  store::{KeyValueStore, read_collection, write_collection},
  teachers::Teachers,
};

/// Storage key of the token → session map.
pub const SESSIONS_KEY: &str = "auth-sessions";

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Student,
  #[default]
  Guest,
}

string_enum_serde!(Role);

impl Role {
  pub fn is_allowed(self, allowed: &[Role]) -> bool { allowed.contains(&self) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub role:      Role,
  pub user_name: Option<String>,
}

/// A fresh session and the token that identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIn {
  pub token:   String,
  #[serde(flatten)]
  pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
  pub user_name: String,
  #[serde(default)]
  pub password:  String,
  pub role:      Role,
}

type SessionMap = BTreeMap<String, Session>;

/// 256 random bits, hex encoded.
fn new_token() -> String {
  (0..4).map(|_| format!("{:016x}", OsRng.next_u64())).collect()
}

pub struct Sessions<'s, S: ?Sized> {
  store:          &'s S,
  admin_password: &'s str,
}

impl<'s, S> Sessions<'s, S>
where
  S: KeyValueStore + ?Sized,
{
  pub fn new(store: &'s S, admin_password: &'s str) -> Self {
    Self { store, admin_password }
  }

  fn all(&self) -> SessionMap {
    read_collection(self.store, SESSIONS_KEY).or_fallback(SESSIONS_KEY, SessionMap::new)
  }

  /// The session behind `token`; a guest when the token is absent or
  /// unknown.
  pub fn current(&self, token: Option<&str>) -> Session {
    token
      .and_then(|t| self.all().remove(t))
      .unwrap_or_default()
  }

  /// Fail with [`Error::Forbidden`] unless the role behind `token` is in
  /// `allowed`.
  pub fn require(&self, token: Option<&str>, allowed: &[Role]) -> Result<Session> {
    let session = self.current(token);
    if session.role.is_allowed(allowed) {
      Ok(session)
    } else {
      Err(Error::Forbidden(session.role))
    }
  }

  /// Verify `credentials` and open a new session for them.
  ///
  /// Admins need the configured admin password and teachers their own
  /// password; students and guests are accepted by name alone. Other
  /// callers' sessions are unaffected.
  pub fn login(&self, credentials: Credentials) -> Result<SignedIn> {
    let user_name = credentials.user_name.trim();
    if user_name.is_empty() {
      return Err(Error::InvalidCredentials);
    }

    let accepted = match credentials.role {
      Role::Admin => credentials.password == self.admin_password,
      Role::Teacher => Teachers::new(self.store)
        .authenticate(user_name, &credentials.password)?
        .is_some(),
      Role::Student | Role::Guest => true,
    };
    if !accepted {
      tracing::info!(user_name, role = %credentials.role, "login rejected");
      return Err(Error::InvalidCredentials);
    }

    let signed_in = SignedIn {
      token:   new_token(),
      session: Session {
        role:      credentials.role,
        user_name: Some(user_name.to_owned()),
      },
    };
    let mut all = self.all();
    all.insert(signed_in.token.clone(), signed_in.session.clone());
    write_collection(self.store, SESSIONS_KEY, &all)?;
    tracing::info!(user_name, role = %signed_in.session.role, "logged in");
    Ok(signed_in)
  }

  /// End the session behind `token`, if any.
  pub fn logout(&self, token: &str) -> Result<()> {
    let mut all = self.all();
    if all.remove(token).is_some() {
      write_collection(self.store, SESSIONS_KEY, &all)?;
    }
    Ok(())
  }
}
