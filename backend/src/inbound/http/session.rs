//! Cookie-session access for the enrollment API.
//!
//! Every enrollment and payment handler requires a logged-in user. This
//! wrapper keeps the actix-session plumbing out of those handlers: `POST
//! /api/v1/login` stores the verified user id here, and the rest of the
//! surface reads it back through [`SessionContext::require_user_id`].

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const SESSION_USER_KEY: &str = "user_id";

/// Handler-facing view of the session cookie.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record a freshly authenticated user id.
    ///
    /// Rotates the session first so a cookie captured before login cannot be
    /// promoted to an authenticated one.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(SESSION_USER_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Read the logged-in user id, if any.
    ///
    /// A cookie carrying an id that no longer parses reads as anonymous
    /// rather than an error; the cookie is signed, so this only happens to
    /// sessions issued before a change in the id format.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(SESSION_USER_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match UserId::new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(error) => {
                tracing::warn!("discarding session with unparseable user id: {error}");
                Ok(None)
            }
        }
    }

    /// Resolve the logged-in user id or fail with `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
