//! Logout endpoint: clears the caller's live session token.

use rocket::serde::json::{Json, Value, json};
use rocket::{Route, post, routes};

use crate::api::{ApiError, internal_error};
use crate::orm::DbConn;
use crate::orm::user::set_session_token;
use crate::session_guards::AuthenticatedUser;

/// Logout endpoint.
///
/// - **URL:** `/logout`
/// - **Method:** `POST`
/// - **Authentication:** Required
#[post("/logout")]
pub async fn logout(db: DbConn, auth_user: AuthenticatedUser) -> Result<Json<Value>, ApiError> {
    let user_id = auth_user.user.user_id;
    db.run(move |conn| set_session_token(conn, user_id, None))
        .await
        .map_err(|e| {
            eprintln!("Error during logout: {:?}", e);
            internal_error()
        })?;

    Ok(Json(json!({ "message": "Logout successful" })))
}

pub fn routes() -> Vec<Route> {
    routes![logout]
}
