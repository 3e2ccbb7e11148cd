//! Event lifecycle and attendee-registration endpoints.

use chrono::Utc;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use rocket::{Route, delete, get, patch, post, routes};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, api_error, internal_error};
use crate::models::{Event, EventPatch, NewEvent, UserSummary};
use crate::orm::DbConn;
use crate::orm::event::{
    archive_event, count_attendees, get_event, get_registration, insert_attendee, insert_event,
    list_all_events, list_attended_events, list_event_attendees, list_events_by_creator,
    update_event,
};
use crate::orm::user::get_user;
use crate::session_guards::{AuthenticatedUser, Identity};

/// Fields are optional so presence can be validated with a 400 listing the
/// missing names, matching the error contract.
#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Start as epoch milliseconds.
    pub start: Option<i64>,
    /// Registration close as epoch milliseconds; must precede `start`.
    pub close_registration: Option<i64>,
    pub max_attendees: Option<i64>,
}

#[derive(Serialize)]
pub struct CreateEventResponse {
    pub event_id: i32,
}

#[derive(Serialize)]
pub struct CreatorSummary {
    pub creator_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Detail view of a single event. The attendee roster is present only when
/// the caller is the event's creator.
#[derive(Serialize)]
pub struct EventDetails {
    pub event_id: i32,
    pub creator: CreatorSummary,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: i64,
    pub close_registration: i64,
    pub max_attendees: i32,
    pub number_attending: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<UserSummary>>,
}

/// Create Event endpoint.
///
/// - **URL:** `/events`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// All fields are required and non-blank; `start` must lie strictly in the
/// future and `close_registration` strictly before it; `max_attendees` must
/// be a positive integer. The caller becomes the immutable creator.
#[post("/events", data = "<body>")]
pub async fn create_event(
    db: DbConn,
    auth_user: AuthenticatedUser,
    body: Json<CreateEventRequest>,
) -> Result<status::Created<Json<CreateEventResponse>>, ApiError> {
    let body = body.into_inner();

    let mut missing: Vec<&str> = Vec::new();
    let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
    if blank(&body.name) {
        missing.push("name");
    }
    if blank(&body.description) {
        missing.push("description");
    }
    if blank(&body.location) {
        missing.push("location");
    }
    if body.start.is_none() {
        missing.push("start");
    }
    if body.close_registration.is_none() {
        missing.push("close_registration");
    }
    if body.max_attendees.is_none() {
        missing.push("max_attendees");
    }
    if !missing.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            format!("Missing or blank field(s): {}", missing.join(", ")),
        ));
    }

    let start = body.start.unwrap_or_default();
    let close_registration = body.close_registration.unwrap_or_default();
    let max_attendees = body.max_attendees.unwrap_or_default();

    let now_ms = Utc::now().timestamp_millis();
    if start <= now_ms {
        return Err(api_error(
            Status::BadRequest,
            "Start date must be a valid future date",
        ));
    }
    if close_registration >= start {
        return Err(api_error(
            Status::BadRequest,
            "Close registration must be before the start date",
        ));
    }
    if max_attendees <= 0 || max_attendees > i32::MAX as i64 {
        return Err(api_error(
            Status::BadRequest,
            "Max attendees must be a positive integer",
        ));
    }

    let new_event = NewEvent {
        creator_id: auth_user.user.user_id,
        name: body.name.unwrap_or_default(),
        description: body.description.unwrap_or_default(),
        location: body.location.unwrap_or_default(),
        start_date: start,
        close_registration,
        max_attendees: max_attendees as i32,
    };

    db.run(move |conn| match insert_event(conn, new_event) {
        Ok(event) => Ok(status::Created::new("/").body(Json(CreateEventResponse {
            event_id: event.event_id,
        }))),
        Err(e) => {
            eprintln!("Database error during event creation: {:?}", e);
            Err(internal_error())
        }
    })
    .await
}

/// Get Event endpoint.
///
/// - **URL:** `/event/<event_id>`
/// - **Method:** `GET`
/// - **Authentication:** Optional
///
/// Anyone, including anonymous callers, sees the event summary; the full
/// attendee roster is included only when the caller is authenticated as
/// the event's creator. Archived events remain readable.
#[get("/event/<event_id>")]
pub async fn get_event_by_id(
    db: DbConn,
    identity: Identity,
    event_id: i32,
) -> Result<Json<EventDetails>, ApiError> {
    let caller_id = identity.user().map(|u| u.user_id);

    db.run(move |conn| {
        let event = match get_event(conn, event_id) {
            Ok(Some(event)) => event,
            Ok(None) => return Err(api_error(Status::NotFound, "Event not found")),
            Err(e) => {
                eprintln!("Error fetching event {}: {:?}", event_id, e);
                return Err(internal_error());
            }
        };

        let creator = match get_user(conn, event.creator_id) {
            Ok(Some(user)) => user,
            Ok(None) => {
                eprintln!("Event {} has no creator row", event_id);
                return Err(internal_error());
            }
            Err(e) => {
                eprintln!("Error fetching creator for event {}: {:?}", event_id, e);
                return Err(internal_error());
            }
        };

        let number_attending = count_attendees(conn, event_id).map_err(|e| {
            eprintln!("Error counting attendees for event {}: {:?}", event_id, e);
            internal_error()
        })?;

        let attendees = if caller_id == Some(event.creator_id) {
            Some(list_event_attendees(conn, event_id).map_err(|e| {
                eprintln!("Error listing attendees for event {}: {:?}", event_id, e);
                internal_error()
            })?)
        } else {
            None
        };

        Ok(Json(EventDetails {
            event_id: event.event_id,
            creator: CreatorSummary {
                creator_id: creator.user_id,
                first_name: creator.first_name,
                last_name: creator.last_name,
                email: creator.email,
            },
            name: event.name,
            description: event.description,
            location: event.location,
            start: event.start_date,
            close_registration: event.close_registration,
            max_attendees: event.max_attendees,
            number_attending,
            attendees,
        }))
    })
    .await
}

/// Update Event endpoint.
///
/// - **URL:** `/event/<event_id>`
/// - **Method:** `PATCH`
/// - **Authentication:** Required; creator only
///
/// Accepts a partial set of the mutable columns; text fields supplied as
/// empty strings are ignored. A patch with nothing left to apply is a 400.
#[patch("/event/<event_id>", data = "<body>")]
pub async fn update_event_by_id(
    db: DbConn,
    auth_user: AuthenticatedUser,
    event_id: i32,
    body: Json<EventPatch>,
) -> Result<Json<Value>, ApiError> {
    let patch = body.into_inner().normalized();
    if patch.is_empty() {
        return Err(api_error(Status::BadRequest, "No valid fields to update"));
    }

    let caller_id = auth_user.user.user_id;
    db.run(move |conn| {
        let event = match get_event(conn, event_id) {
            Ok(Some(event)) => event,
            Ok(None) => return Err(api_error(Status::NotFound, "Event not found")),
            Err(e) => {
                eprintln!("Error fetching event {}: {:?}", event_id, e);
                return Err(internal_error());
            }
        };

        if event.creator_id != caller_id {
            return Err(api_error(
                Status::Forbidden,
                "Forbidden: You do not have permission to update this event",
            ));
        }

        update_event(conn, event_id, &patch).map_err(|e| {
            eprintln!("Error updating event {}: {:?}", event_id, e);
            internal_error()
        })?;

        Ok(Json(json!({ "message": "Event updated successfully" })))
    })
    .await
}

/// Register For Event endpoint.
///
/// - **URL:** `/event/<event_id>`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// Rejected when the caller created the event, already holds a
/// registration, the event is archived, or the event is at capacity. Only
/// the archive sentinel closes registration; an elapsed close date does
/// not.
#[post("/event/<event_id>")]
pub async fn register_for_event(
    db: DbConn,
    auth_user: AuthenticatedUser,
    event_id: i32,
) -> Result<Json<Value>, ApiError> {
    let caller_id = auth_user.user.user_id;

    db.run(move |conn| {
        let event = match get_event(conn, event_id) {
            Ok(Some(event)) => event,
            Ok(None) => return Err(api_error(Status::NotFound, "Event not found")),
            Err(e) => {
                eprintln!("Error fetching event {}: {:?}", event_id, e);
                return Err(internal_error());
            }
        };

        if event.creator_id == caller_id {
            return Err(api_error(
                Status::Forbidden,
                "You cannot register for an event you created",
            ));
        }

        match get_registration(conn, event_id, caller_id) {
            Ok(Some(_)) => {
                return Err(api_error(Status::Forbidden, "You are already registered"));
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error checking registration: {:?}", e);
                return Err(internal_error());
            }
        }

        if event.is_archived() {
            return Err(api_error(Status::Forbidden, "Registration is closed"));
        }

        let attending = count_attendees(conn, event_id).map_err(|e| {
            eprintln!("Error counting attendees for event {}: {:?}", event_id, e);
            internal_error()
        })?;
        if attending >= event.max_attendees as i64 {
            return Err(api_error(Status::Forbidden, "Event is at capacity"));
        }

        match insert_attendee(conn, event_id, caller_id) {
            Ok(_) => Ok(Json(json!({ "message": "Registration successful" }))),
            // The composite primary key backstops the pre-check under races.
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(api_error(Status::Forbidden, "You are already registered")),
            Err(e) => {
                eprintln!("Error inserting registration: {:?}", e);
                Err(internal_error())
            }
        }
    })
    .await
}

/// Delete Event endpoint (archive).
///
/// - **URL:** `/event/<event_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Required; creator only
///
/// Soft delete: sets the close-registration sentinel. The event stays
/// readable and its attendees, questions, and votes are untouched.
#[delete("/event/<event_id>")]
pub async fn delete_event(
    db: DbConn,
    auth_user: AuthenticatedUser,
    event_id: i32,
) -> Result<Json<Value>, ApiError> {
    let caller_id = auth_user.user.user_id;

    db.run(move |conn| {
        let event = match get_event(conn, event_id) {
            Ok(Some(event)) => event,
            Ok(None) => return Err(api_error(Status::NotFound, "Event not found")),
            Err(e) => {
                eprintln!("Error fetching event {}: {:?}", event_id, e);
                return Err(internal_error());
            }
        };

        if event.creator_id != caller_id {
            return Err(api_error(
                Status::Forbidden,
                "Forbidden: You do not have permission to delete this event",
            ));
        }

        archive_event(conn, event_id).map_err(|e| {
            eprintln!("Error archiving event {}: {:?}", event_id, e);
            internal_error()
        })?;

        Ok(Json(json!({ "message": "Event archived successfully" })))
    })
    .await
}

/// List All Events endpoint.
///
/// - **URL:** `/events`
/// - **Method:** `GET`
/// - **Authentication:** None required
#[get("/events")]
pub async fn get_all_events(db: DbConn) -> Result<Json<Vec<Event>>, ApiError> {
    db.run(|conn| {
        list_all_events(conn).map(Json).map_err(|e| {
            eprintln!("Error fetching all events: {:?}", e);
            internal_error()
        })
    })
    .await
}

/// List Own Events endpoint.
///
/// - **URL:** `/user/events`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Events created by the caller.
#[get("/user/events")]
pub async fn get_author_events(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    let caller_id = auth_user.user.user_id;
    db.run(move |conn| {
        list_events_by_creator(conn, caller_id).map(Json).map_err(|e| {
            eprintln!("Error fetching events for creator {}: {:?}", caller_id, e);
            internal_error()
        })
    })
    .await
}

/// List Attended Events endpoint.
///
/// - **URL:** `/user/attended-events`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Events the caller holds a registration for.
#[get("/user/attended-events")]
pub async fn get_attended_events(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    let caller_id = auth_user.user.user_id;
    db.run(move |conn| {
        list_attended_events(conn, caller_id).map(Json).map_err(|e| {
            eprintln!("Error fetching attended events for {}: {:?}", caller_id, e);
            internal_error()
        })
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_event,
        get_event_by_id,
        update_event_by_id,
        register_for_event,
        delete_event,
        get_all_events,
        get_author_events,
        get_attended_events,
    ]
}
