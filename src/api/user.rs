//! Account registration endpoint.

use std::sync::LazyLock;

use regex::Regex;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, post, routes};
use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiError, api_error, internal_error};
use crate::models::NewUser;
use crate::orm::DbConn;
use crate::orm::auth::hash_password;
use crate::orm::user::{get_user_by_email, insert_user};

/// Basic `local@domain.tld` shape check; anything stricter is out of scope.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

const ALLOWED_FIELDS: [&str; 4] = ["first_name", "last_name", "email", "password"];

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: i32,
}

/// Pulls a required non-blank string field out of the request body.
fn required_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Register endpoint.
///
/// - **URL:** `/users`
/// - **Method:** `POST`
/// - **Authentication:** None required
///
/// The body must carry exactly `first_name`, `last_name`, `email`, and
/// `password`; extra fields are rejected rather than ignored. The password
/// is stored as a salted Argon2 hash and never echoed back.
///
/// The body is taken as a raw JSON value so the allowed-field check and all
/// validation failures report 400 with an explicit message, rather than the
/// framework's generic parse error.
#[post("/users", data = "<body>")]
pub async fn register(
    db: DbConn,
    body: Json<Value>,
) -> Result<status::Created<Json<RegisterResponse>>, ApiError> {
    let body = body.into_inner();

    let extra_fields: Vec<String> = body
        .as_object()
        .map(|obj| {
            obj.keys()
                .filter(|k| !ALLOWED_FIELDS.contains(&k.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    if !extra_fields.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            format!("Unexpected field(s): {}", extra_fields.join(", ")),
        ));
    }

    let (first_name, last_name, email, password) = match (
        required_field(&body, "first_name"),
        required_field(&body, "last_name"),
        required_field(&body, "email"),
        required_field(&body, "password"),
    ) {
        (Some(f), Some(l), Some(e), Some(p)) => (f, l, e, p),
        _ => return Err(api_error(Status::BadRequest, "All fields are required")),
    };

    if !EMAIL_RE.is_match(email) {
        return Err(api_error(Status::BadRequest, "Invalid email format"));
    }

    let new_user = NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password),
    };

    db.run(move |conn| {
        // Pre-check for a friendlier error; the UNIQUE constraint below is
        // the source of truth under concurrent registrations.
        match get_user_by_email(conn, &new_user.email) {
            Ok(Some(_)) => return Err(api_error(Status::BadRequest, "Email already taken")),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error checking for existing user: {:?}", e);
                return Err(internal_error());
            }
        }

        match insert_user(conn, new_user) {
            Ok(user) => Ok(status::Created::new("/").body(Json(RegisterResponse {
                user_id: user.user_id,
            }))),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(api_error(Status::BadRequest, "Email already taken")),
            Err(e) => {
                eprintln!("Database error during registration: {:?}", e);
                Err(internal_error())
            }
        }
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![register]
}
