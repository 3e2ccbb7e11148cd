#[macro_use]
extern crate rocket;

use rocket::figment::value::Map;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::request::Request;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};

pub mod api;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod schema;
pub mod session_guards;

use crate::orm::auth::AuthConfig;

#[catch(400)]
fn bad_request(_req: &Request) -> Json<Value> {
    Json(json!({ "error_message": "Bad request" }))
}

#[catch(401)]
fn unauthorized(_req: &Request) -> Json<Value> {
    Json(json!({ "error_message": "Unauthorized: Session token is required or invalid" }))
}

#[catch(403)]
fn forbidden(_req: &Request) -> Json<Value> {
    Json(json!({ "error_message": "Forbidden" }))
}

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({ "error_message": "Not found" }))
}

#[catch(422)]
fn unprocessable_entity(_req: &Request) -> Json<Value> {
    Json(json!({ "error_message": "Malformed request body" }))
}

#[catch(500)]
fn internal_server_error(_req: &Request) -> Json<Value> {
    Json(json!({ "error_message": "Internal server error" }))
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, _req: &Request) -> Json<Value> {
    Json(json!({ "error_message": status.reason().unwrap_or("Unknown error") }))
}

/// Mounts the API routes and the JSON error catchers. Shared by the
/// production instance and the test instances so both speak the same error
/// body shape.
pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable_entity,
                internal_server_error,
                default_catcher
            ],
        )
        .mount("/", api::routes())
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Listening at: {}", address);
    }
    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// Builds the production Rocket instance. Tests use
/// `orm::testing::test_rocket()` with an in-memory database instead, so
/// this function itself is exercised only by a real launch.
pub fn rocket() -> Rocket<Build> {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");

    let figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(("databases.sqlite_db.url", database_url));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::set_foreign_keys_fairing())
        .attach(orm::run_migrations_fairing())
        .manage(AuthConfig::new(jwt_secret));

    log_rocket_info(&rocket);

    mount_api_routes(rocket)
}
