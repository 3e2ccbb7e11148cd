//! Login endpoint: verifies credentials and issues a fresh session token.

use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Route, post, routes};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, api_error, internal_error};
use crate::orm::DbConn;
use crate::orm::auth::{AuthConfig, mint_session_token, verify_password};
use crate::orm::user::{get_user_by_email, set_session_token};

/// Fields are optional so a missing one reports 400 with a message instead
/// of the framework's parse error.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: i32,
    pub session_token: String,
}

/// Login endpoint.
///
/// - **URL:** `/login`
/// - **Method:** `POST`
/// - **Authentication:** None required
///
/// Failure is a uniform "Invalid email or password" whether the email is
/// unknown or the password wrong, so callers cannot enumerate accounts. On
/// success the freshly minted token replaces any earlier one for the user:
/// one live session per account.
#[post("/login", data = "<body>")]
pub async fn login(
    db: DbConn,
    auth_config: &State<AuthConfig>,
    body: Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = match (&body.email, &body.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.trim().is_empty() => {
            (e.clone(), p.clone())
        }
        _ => {
            return Err(api_error(
                Status::BadRequest,
                "Email and password are required",
            ));
        }
    };

    let user = db
        .run(move |conn| get_user_by_email(conn, &email))
        .await
        .map_err(|e| {
            eprintln!("Error during login lookup: {:?}", e);
            internal_error()
        })?
        .ok_or_else(|| api_error(Status::BadRequest, "Invalid email or password"))?;

    if !verify_password(&password, &user.password_hash) {
        return Err(api_error(Status::BadRequest, "Invalid email or password"));
    }

    let session_token = mint_session_token(auth_config, user.user_id, &user.email).map_err(|e| {
        eprintln!("Error minting session token: {:?}", e);
        internal_error()
    })?;

    let user_id = user.user_id;
    let token_to_store = session_token.clone();
    db.run(move |conn| set_session_token(conn, user_id, Some(&token_to_store)))
        .await
        .map_err(|e| {
            eprintln!("Error storing session token: {:?}", e);
            internal_error()
        })?;

    Ok(Json(LoginResponse {
        user_id,
        session_token,
    }))
}

pub fn routes() -> Vec<Route> {
    routes![login]
}
