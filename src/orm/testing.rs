//! Test support: in-memory SQLite databases and a fully wired Rocket
//! instance for local-client tests.

use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use rocket::fairing::AdHoc;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket};
use rocket_sync_db_pools::diesel;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::orm::auth::AuthConfig;

/// Fixed signing secret for tests; production reads `JWT_SECRET` from the
/// environment instead.
pub const TEST_JWT_SECRET: &str = "test-signing-secret";

/// Configures SQLite with performance-optimized settings for testing.
///
/// Disables synchronous writes and the rollback journal. Faster but less
/// durable - only use for testing.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
    .expect("Failed to set SQLite PRAGMAs");
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for pragmas");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates and configures a Rocket instance for testing with an in-memory
/// SQLite database.
///
/// The returned Rocket instance will have:
/// - A unique shared-cache in-memory SQLite database per test
/// - Database connection pool attached
/// - Foreign keys enabled and testing pragmas set
/// - All migrations run
/// - A fixed-secret [`AuthConfig`] as managed state
/// - All API routes mounted
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    // Generate a unique database name for this test instance
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };
    let databases = map!["sqlite_db" => db_config];

    let figment = rocket::Config::figment().merge(("databases", databases));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .manage(AuthConfig::new(TEST_JWT_SECRET));

    crate::mount_api_routes(rocket)
}

/// Registers a user through the API and returns the new user id.
///
/// Intended for tests; panics on any failure, since a failure here means
/// the test fixture itself is broken.
pub async fn register_user_by_api(
    client: &rocket::local::asynchronous::Client,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> i32 {
    let response = client
        .post("/users")
        .json(&serde_json::json!({
            "first_name": first_name,
            "last_name": last_name,
            "email": email,
            "password": password,
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), rocket::http::Status::Created);

    let body: serde_json::Value = response.into_json().await.expect("valid JSON response");
    body["user_id"].as_i64().expect("user_id in response") as i32
}

/// Logs a user in through the API and returns their session token.
pub async fn login_by_api(
    client: &rocket::local::asynchronous::Client,
    email: &str,
    password: &str,
) -> String {
    let response = client
        .post("/login")
        .json(&serde_json::json!({ "email": email, "password": password }))
        .dispatch()
        .await;
    assert_eq!(response.status(), rocket::http::Status::Ok);

    let body: serde_json::Value = response.into_json().await.expect("valid JSON response");
    body["session_token"]
        .as_str()
        .expect("session_token in response")
        .to_string()
}

/// Registers and logs in a fresh user, returning their session token.
pub async fn signup_and_login(
    client: &rocket::local::asynchronous::Client,
    first_name: &str,
    email: &str,
) -> String {
    register_user_by_api(client, first_name, "Tester", email, "correct horse").await;
    login_by_api(client, email, "correct horse").await
}

/// Creates an event through the API and returns the new event id.
pub async fn create_event_by_api(
    client: &rocket::local::asynchronous::Client,
    session_token: &str,
    name: &str,
    max_attendees: i64,
) -> i32 {
    let start = future_ms(48);
    let response = client
        .post("/events")
        .header(rocket::http::Header::new(
            "X-Authorization",
            session_token.to_string(),
        ))
        .json(&serde_json::json!({
            "name": name,
            "description": "Test event",
            "location": "Test hall",
            "start": start,
            "close_registration": start - 3_600_000,
            "max_attendees": max_attendees,
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), rocket::http::Status::Created);

    let body: serde_json::Value = response.into_json().await.expect("valid JSON response");
    body["event_id"].as_i64().expect("event_id in response") as i32
}

/// An epoch-millisecond timestamp the given number of hours from now.
pub fn future_ms(hours: i64) -> i64 {
    (chrono::Utc::now() + chrono::Duration::hours(hours)).timestamp_millis()
}

/// Creates a synchronous in-memory SQLite connection for unit tests, with
/// migrations run and foreign keys enabled.
///
/// Each call returns a new, independent in-memory database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    conn
}
