use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::schema::{attendees, events};

/// Sentinel value for `close_registration` marking an archived event.
/// Archived events stay readable but accept no further registrations.
pub const REGISTRATION_CLOSED: i64 = -1;

#[derive(Queryable, Identifiable, Serialize, Debug, Clone)]
#[diesel(table_name = events, primary_key(event_id))]
pub struct Event {
    pub event_id: i32,
    pub creator_id: i32,
    pub name: String,
    pub description: String,
    pub location: String,
    /// Epoch milliseconds.
    pub start_date: i64,
    /// Epoch milliseconds, or [`REGISTRATION_CLOSED`].
    pub close_registration: i64,
    pub max_attendees: i32,
}

impl Event {
    pub fn is_archived(&self) -> bool {
        self.close_registration == REGISTRATION_CLOSED
    }
}

#[derive(Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub creator_id: i32,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: i64,
    pub close_registration: i64,
    pub max_attendees: i32,
}

/// Partial update for an event: one optional slot per mutable column,
/// applied as a fixed Diesel changeset. `creator_id` is immutable and
/// deliberately has no slot here.
#[derive(AsChangeset, Deserialize, Default, Debug)]
#[diesel(table_name = events)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<i64>,
    pub close_registration: Option<i64>,
    pub max_attendees: Option<i32>,
}

impl EventPatch {
    /// Drops text fields supplied as empty strings; clients use `""` to mean
    /// "leave this field alone".
    pub fn normalized(self) -> Self {
        fn non_blank(field: Option<String>) -> Option<String> {
            field.filter(|s| !s.trim().is_empty())
        }
        EventPatch {
            name: non_blank(self.name),
            description: non_blank(self.description),
            location: non_blank(self.location),
            start_date: self.start_date,
            close_registration: self.close_registration,
            max_attendees: self.max_attendees,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start_date.is_none()
            && self.close_registration.is_none()
            && self.max_attendees.is_none()
    }
}

/// A registration record; one row per (event, user) pair, enforced by the
/// composite primary key.
#[derive(Queryable, Debug)]
pub struct Attendee {
    pub event_id: i32,
    pub user_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = attendees)]
pub struct NewAttendee {
    pub event_id: i32,
    pub user_id: i32,
}
