//! Request guards resolving the `X-Authorization` session token to a caller
//! identity.
//!
//! Identity resolution is fail-open: a missing header, an unknown token, or
//! a store failure all resolve to [`Identity::Anonymous`] rather than an
//! error. Endpoints that require authentication take [`AuthenticatedUser`]
//! instead, which rejects anonymous callers with 401.

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::models::User;
use crate::orm::DbConn;
use crate::orm::user::get_user_by_session_token;

/// The caller's resolved identity, threaded explicitly into operations.
pub enum Identity {
    Anonymous,
    Authenticated(User),
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Identity {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = match req.headers().get_one("X-Authorization") {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Outcome::Success(Identity::Anonymous),
        };

        let db = match req.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Success(Identity::Anonymous),
        };

        match db
            .run(move |conn| get_user_by_session_token(conn, &token))
            .await
        {
            Ok(Some(user)) => Outcome::Success(Identity::Authenticated(user)),
            _ => Outcome::Success(Identity::Anonymous),
        }
    }
}

/// Guard for endpoints that require a valid session. Fails the request with
/// 401 when the caller is anonymous.
pub struct AuthenticatedUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.guard::<Identity>().await {
            Outcome::Success(Identity::Authenticated(user)) => {
                Outcome::Success(AuthenticatedUser { user })
            }
            _ => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
