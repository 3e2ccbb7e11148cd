//! HTTP endpoints, one module per resource. Each module exposes a
//! `routes()` collection; [`routes`] concatenates them for mounting.

pub mod event;
pub mod login;
pub mod logout;
pub mod question;
pub mod status;
pub mod user;

use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serialize;

/// Error body shape shared by every failing response.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error_message: String,
}

pub type ApiError = Custom<Json<ErrorResponse>>;

pub(crate) fn api_error(code: Status, message: impl Into<String>) -> ApiError {
    Custom(
        code,
        Json(ErrorResponse {
            error_message: message.into(),
        }),
    )
}

pub(crate) fn internal_error() -> ApiError {
    api_error(Status::InternalServerError, "Internal server error")
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(status::routes());
    routes.extend(user::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(event::routes());
    routes.extend(question::routes());
    routes
}
