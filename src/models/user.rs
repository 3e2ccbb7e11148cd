use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;

use crate::schema::users;

/// A full user row. Never serialized directly: `password_hash` and
/// `session_token` must not leave the server.
#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = users, primary_key(user_id))]
pub struct User {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String, // Will be unique
    pub password_hash: String,
    pub session_token: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Identity fields that are safe to echo in responses, e.g. in an event's
/// attendee list.
#[derive(Queryable, Serialize, Debug)]
pub struct UserSummary {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}
