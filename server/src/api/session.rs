use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    SignedCookieJar,
    cookie::{Cookie, SameSite},
};
use tracing::debug;

use crate::{
    api::{AppState, ApiError},
    db::interface::{DatabaseClient, DatabaseError},
    i18n::{Language, resolve_language},
    models::{Session, SessionData, SessionId, User},
};

pub const SESSION_COOKIE: &str = "chcemvediet_session";

/// The visitor's session, loaded from the database through the signed session cookie.
///
/// Handlers modify [`CurrentSession::data`] and then [`commit()`](CurrentSession::commit) it,
/// returning the resulting cookie jar as part of the response. Sessions which hold nothing
/// are never stored.
pub struct CurrentSession {
    jar: SignedCookieJar,
    id: Option<SessionId>,
    secure: bool,
    pub data: SessionData,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let Ok(jar) = SignedCookieJar::from_request_parts(parts, state).await;
        let mut session = Self {
            jar,
            id: None,
            secure: state.secure_cookies,
            data: SessionData::default(),
        };

        let Some(id) = session
            .jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| SessionId::decode(cookie.value()))
        else {
            return Ok(session);
        };
        match state.db.get_session_by_id_hash(&id.hash()).await {
            Ok(stored) if stored.is_expired() => {
                debug!("session expired");
                state.db.delete_session_by_id_hash(&id.hash()).await?;
            }
            Ok(stored) => {
                session.id = Some(id);
                session.data = stored.data.into_inner();
            }
            Err(DatabaseError::NotFound) => debug!("unknown session"),
            Err(e) => return Err(e.into()),
        }
        Ok(session)
    }
}

impl CurrentSession {
    pub fn user(&self) -> Option<&User> {
        self.data.user.as_ref()
    }

    /// Active language of the request.
    pub fn language(&self) -> Language {
        resolve_language(self.data.user.as_ref(), self.data.language)
    }

    /// Returns the cookie jar unchanged, without storing anything.
    pub fn into_jar(self) -> SignedCookieJar {
        self.jar
    }

    /// Discards the current session ID so the next commit issues a fresh one.
    ///
    /// Called whenever the session changes privilege level.
    pub async fn rotate(&mut self, db: &dyn DatabaseClient) -> Result<(), DatabaseError> {
        if let Some(id) = self.id.take() {
            db.delete_session_by_id_hash(&id.hash()).await?;
        }
        Ok(())
    }

    /// Persists the session data and returns the cookie jar to send back.
    pub async fn commit(self, db: &dyn DatabaseClient) -> Result<SignedCookieJar, DatabaseError> {
        let Self {
            jar,
            id,
            secure,
            data,
        } = self;

        if data.is_empty() {
            if let Some(id) = id {
                db.delete_session_by_id_hash(&id.hash()).await?;
            }
            if jar.get(SESSION_COOKIE).is_none() {
                return Ok(jar);
            }
            return Ok(jar.remove(Cookie::build(SESSION_COOKIE).path("/")));
        }

        if let Some(id) = id {
            match db.update_session_data(&id.hash(), &data).await {
                Ok(()) => return Ok(jar),
                // deleted in the meantime, e.g. by the expiry task
                Err(DatabaseError::NotFound) => (),
                Err(e) => return Err(e),
            }
        }

        let id = SessionId::generate();
        db.create_session(&Session::new(&id, data)).await?;
        let cookie = Cookie::build((SESSION_COOKIE, id.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure);
        Ok(jar.add(cookie))
    }
}
