//! Liveness endpoint.

use rocket::{Route, get, routes, serde::json::Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthStatus {
    status: &'static str,
}

/// Health Status endpoint.
///
/// - **URL:** `/`
/// - **Method:** `GET`
/// - **Authentication:** None required
#[get("/")]
pub fn health_status() -> Json<HealthStatus> {
    Json(HealthStatus { status: "Alive" })
}

pub fn routes() -> Vec<Route> {
    routes![health_status]
}
