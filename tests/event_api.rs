#[macro_use]
extern crate time_test;

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use gather_api::orm::testing::{
    create_event_by_api, future_ms, signup_and_login, test_rocket,
};

fn auth(token: &str) -> Header<'static> {
    Header::new("X-Authorization", token.to_string())
}

#[tokio::test]
async fn test_create_event_requires_auth() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .post("/events")
        .json(&json!({
            "name": "RustConf",
            "description": "Annual",
            "location": "Hall A",
            "start": future_ms(48),
            "close_registration": future_ms(24),
            "max_attendees": 100,
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_create_event_validation() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_create_event_validation");

    let token = signup_and_login(&client, "Host", "host@example.com").await;

    // Blank name counts as missing.
    let missing = client
        .post("/events")
        .header(auth(&token))
        .json(&json!({
            "name": "  ",
            "description": "Annual",
            "location": "Hall A",
            "start": future_ms(48),
            "close_registration": future_ms(24),
            "max_attendees": 100,
        }))
        .dispatch()
        .await;
    assert_eq!(missing.status(), Status::BadRequest);
    let body: serde_json::Value = missing.into_json().await.unwrap();
    assert_eq!(body["error_message"], "Missing or blank field(s): name");

    // Start in the past.
    let past = client
        .post("/events")
        .header(auth(&token))
        .json(&json!({
            "name": "RustConf",
            "description": "Annual",
            "location": "Hall A",
            "start": 1_000,
            "close_registration": 500,
            "max_attendees": 100,
        }))
        .dispatch()
        .await;
    assert_eq!(past.status(), Status::BadRequest);

    // close_registration equal to start is rejected: strictly before.
    let start = future_ms(48);
    let equal = client
        .post("/events")
        .header(auth(&token))
        .json(&json!({
            "name": "RustConf",
            "description": "Annual",
            "location": "Hall A",
            "start": start,
            "close_registration": start,
            "max_attendees": 100,
        }))
        .dispatch()
        .await;
    assert_eq!(equal.status(), Status::BadRequest);
    let body: serde_json::Value = equal.into_json().await.unwrap();
    assert_eq!(
        body["error_message"],
        "Close registration must be before the start date"
    );

    // Zero capacity.
    let zero = client
        .post("/events")
        .header(auth(&token))
        .json(&json!({
            "name": "RustConf",
            "description": "Annual",
            "location": "Hall A",
            "start": future_ms(48),
            "close_registration": future_ms(24),
            "max_attendees": 0,
        }))
        .dispatch()
        .await;
    assert_eq!(zero.status(), Status::BadRequest);
    let body: serde_json::Value = zero.into_json().await.unwrap();
    assert_eq!(body["error_message"], "Max attendees must be a positive integer");
}

#[tokio::test]
async fn test_get_event_public_and_owner_views() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_get_event_public_and_owner_views");

    let host = signup_and_login(&client, "Host", "host@example.com").await;
    let guest = signup_and_login(&client, "Guest", "guest@example.com").await;
    let event_id = create_event_by_api(&client, &host, "RustConf", 10).await;

    let register = client
        .post(format!("/event/{}", event_id))
        .header(auth(&guest))
        .dispatch()
        .await;
    assert_eq!(register.status(), Status::Ok);

    // Anonymous caller: summary without the attendee roster.
    let anon = client.get(format!("/event/{}", event_id)).dispatch().await;
    assert_eq!(anon.status(), Status::Ok);
    let body: serde_json::Value = anon.into_json().await.unwrap();
    assert_eq!(body["name"], "RustConf");
    assert_eq!(body["number_attending"].as_i64(), Some(1));
    assert_eq!(body["creator"]["email"], "host@example.com");
    assert!(body.get("attendees").is_none());

    // A non-creator attendee gets the same view.
    let guest_view = client
        .get(format!("/event/{}", event_id))
        .header(auth(&guest))
        .dispatch()
        .await;
    let body: serde_json::Value = guest_view.into_json().await.unwrap();
    assert!(body.get("attendees").is_none());

    // The creator additionally sees the roster with identity fields.
    let owner_view = client
        .get(format!("/event/{}", event_id))
        .header(auth(&host))
        .dispatch()
        .await;
    let body: serde_json::Value = owner_view.into_json().await.unwrap();
    let attendees = body["attendees"].as_array().expect("owner sees attendees");
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0]["email"], "guest@example.com");
    assert_eq!(attendees[0]["first_name"], "Guest");
}

#[tokio::test]
async fn test_get_event_not_found() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client.get("/event/9999").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error_message"], "Event not found");
}

#[tokio::test]
async fn test_update_event_ownership_and_patching() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_update_event_ownership_and_patching");

    let host = signup_and_login(&client, "Host", "host@example.com").await;
    let other = signup_and_login(&client, "Other", "other@example.com").await;
    let event_id = create_event_by_api(&client, &host, "RustConf", 10).await;

    // Non-owner: 403.
    let forbidden = client
        .patch(format!("/event/{}", event_id))
        .header(auth(&other))
        .json(&json!({ "name": "Hijacked" }))
        .dispatch()
        .await;
    assert_eq!(forbidden.status(), Status::Forbidden);

    // Anonymous: 401.
    let anon = client
        .patch(format!("/event/{}", event_id))
        .json(&json!({ "name": "Hijacked" }))
        .dispatch()
        .await;
    assert_eq!(anon.status(), Status::Unauthorized);

    // Empty-string fields are "leave alone"; an all-blank patch is a 400.
    let empty = client
        .patch(format!("/event/{}", event_id))
        .header(auth(&host))
        .json(&json!({ "name": "", "location": "" }))
        .dispatch()
        .await;
    assert_eq!(empty.status(), Status::BadRequest);
    let body: serde_json::Value = empty.into_json().await.unwrap();
    assert_eq!(body["error_message"], "No valid fields to update");

    // Partial update touches only the supplied fields.
    let patched = client
        .patch(format!("/event/{}", event_id))
        .header(auth(&host))
        .json(&json!({ "location": "Hall B", "name": "", "max_attendees": 25 }))
        .dispatch()
        .await;
    assert_eq!(patched.status(), Status::Ok);

    let view = client.get(format!("/event/{}", event_id)).dispatch().await;
    let body: serde_json::Value = view.into_json().await.unwrap();
    assert_eq!(body["name"], "RustConf");
    assert_eq!(body["location"], "Hall B");
    assert_eq!(body["max_attendees"].as_i64(), Some(25));

    // Unknown event id.
    let missing = client
        .patch("/event/9999")
        .header(auth(&host))
        .json(&json!({ "name": "Ghost" }))
        .dispatch()
        .await;
    assert_eq!(missing.status(), Status::NotFound);
}

#[tokio::test]
async fn test_registration_rules() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_registration_rules");

    let host = signup_and_login(&client, "Host", "host@example.com").await;
    let guest = signup_and_login(&client, "Guest", "guest@example.com").await;
    let event_id = create_event_by_api(&client, &host, "Meetup", 10).await;

    // Creator cannot register for their own event.
    let own = client
        .post(format!("/event/{}", event_id))
        .header(auth(&host))
        .dispatch()
        .await;
    assert_eq!(own.status(), Status::Forbidden);
    let body: serde_json::Value = own.into_json().await.unwrap();
    assert_eq!(body["error_message"], "You cannot register for an event you created");

    // First registration succeeds, repeat is rejected.
    let first = client
        .post(format!("/event/{}", event_id))
        .header(auth(&guest))
        .dispatch()
        .await;
    assert_eq!(first.status(), Status::Ok);

    let repeat = client
        .post(format!("/event/{}", event_id))
        .header(auth(&guest))
        .dispatch()
        .await;
    assert_eq!(repeat.status(), Status::Forbidden);
    let body: serde_json::Value = repeat.into_json().await.unwrap();
    assert_eq!(body["error_message"], "You are already registered");

    // Unknown event.
    let missing = client
        .post("/event/9999")
        .header(auth(&guest))
        .dispatch()
        .await;
    assert_eq!(missing.status(), Status::NotFound);

    // Anonymous.
    let anon = client.post(format!("/event/{}", event_id)).dispatch().await;
    assert_eq!(anon.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_registration_capacity_boundary() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_registration_capacity_boundary");

    let host = signup_and_login(&client, "Host", "host@example.com").await;
    let event_id = create_event_by_api(&client, &host, "Tiny", 1).await;

    // The max_attendees-th registration fills the event.
    let first = signup_and_login(&client, "First", "first@example.com").await;
    let ok = client
        .post(format!("/event/{}", event_id))
        .header(auth(&first))
        .dispatch()
        .await;
    assert_eq!(ok.status(), Status::Ok);

    // The next one bounces off capacity.
    let second = signup_and_login(&client, "Second", "second@example.com").await;
    let full = client
        .post(format!("/event/{}", event_id))
        .header(auth(&second))
        .dispatch()
        .await;
    assert_eq!(full.status(), Status::Forbidden);
    let body: serde_json::Value = full.into_json().await.unwrap();
    assert_eq!(body["error_message"], "Event is at capacity");
}

#[tokio::test]
async fn test_archive_blocks_registration_but_stays_readable() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_archive_blocks_registration_but_stays_readable");

    let host = signup_and_login(&client, "Host", "host@example.com").await;
    let guest = signup_and_login(&client, "Guest", "guest@example.com").await;
    let event_id = create_event_by_api(&client, &host, "Doomed", 10).await;

    // Only the creator may archive.
    let forbidden = client
        .delete(format!("/event/{}", event_id))
        .header(auth(&guest))
        .dispatch()
        .await;
    assert_eq!(forbidden.status(), Status::Forbidden);

    let archived = client
        .delete(format!("/event/{}", event_id))
        .header(auth(&host))
        .dispatch()
        .await;
    assert_eq!(archived.status(), Status::Ok);

    // Soft delete: the event is still readable, with the sentinel visible.
    let view = client.get(format!("/event/{}", event_id)).dispatch().await;
    assert_eq!(view.status(), Status::Ok);
    let body: serde_json::Value = view.into_json().await.unwrap();
    assert_eq!(body["close_registration"].as_i64(), Some(-1));

    // But registration is closed for good.
    let register = client
        .post(format!("/event/{}", event_id))
        .header(auth(&guest))
        .dispatch()
        .await;
    assert_eq!(register.status(), Status::Forbidden);
    let body: serde_json::Value = register.into_json().await.unwrap();
    assert_eq!(body["error_message"], "Registration is closed");
}

#[tokio::test]
async fn test_event_listings() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_event_listings");

    let alice = signup_and_login(&client, "Alice", "alice@example.com").await;
    let bob = signup_and_login(&client, "Bob", "bob@example.com").await;

    let hosted = create_event_by_api(&client, &alice, "Hosted", 10).await;
    let other = create_event_by_api(&client, &bob, "Other", 10).await;

    let register = client
        .post(format!("/event/{}", other))
        .header(auth(&alice))
        .dispatch()
        .await;
    assert_eq!(register.status(), Status::Ok);

    // Public listing needs no auth and shows everything.
    let all = client.get("/events").dispatch().await;
    assert_eq!(all.status(), Status::Ok);
    let body: serde_json::Value = all.into_json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Owned events only.
    let owned = client
        .get("/user/events")
        .header(auth(&alice))
        .dispatch()
        .await;
    assert_eq!(owned.status(), Status::Ok);
    let body: serde_json::Value = owned.into_json().await.unwrap();
    let owned_ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_id"].as_i64().unwrap())
        .collect();
    assert_eq!(owned_ids, vec![hosted as i64]);

    // Registered-for events only.
    let attended = client
        .get("/user/attended-events")
        .header(auth(&alice))
        .dispatch()
        .await;
    assert_eq!(attended.status(), Status::Ok);
    let body: serde_json::Value = attended.into_json().await.unwrap();
    let attended_ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_id"].as_i64().unwrap())
        .collect();
    assert_eq!(attended_ids, vec![other as i64]);

    // Both personal listings require auth.
    assert_eq!(
        client.get("/user/events").dispatch().await.status(),
        Status::Unauthorized
    );
    assert_eq!(
        client.get("/user/attended-events").dispatch().await.status(),
        Status::Unauthorized
    );
}
