//! Database operations for events and attendee registrations.

use diesel::prelude::*;

use crate::models::{Attendee, Event, EventPatch, NewAttendee, NewEvent, REGISTRATION_CLOSED};
use crate::models::UserSummary;
use crate::orm::db::last_insert_rowid;
use crate::schema::{attendees, events, users};

/// Inserts a new event and returns the stored row.
pub fn insert_event(
    conn: &mut SqliteConnection,
    new_event: NewEvent,
) -> Result<Event, diesel::result::Error> {
    diesel::insert_into(events::table)
        .values(&new_event)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    events::table.find(last_id).first::<Event>(conn)
}

pub fn get_event(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Option<Event>, diesel::result::Error> {
    events::table.find(event_id).first::<Event>(conn).optional()
}

/// Applies a partial update. Callers must reject an all-`None` patch first;
/// Diesel refuses to build an empty changeset.
pub fn update_event(
    conn: &mut SqliteConnection,
    event_id: i32,
    patch: &EventPatch,
) -> Result<usize, diesel::result::Error> {
    diesel::update(events::table.find(event_id))
        .set(patch)
        .execute(conn)
}

/// Soft delete: marks the event archived by setting the close-registration
/// sentinel. Attendees, questions, and votes are left in place.
pub fn archive_event(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::update(events::table.find(event_id))
        .set(events::close_registration.eq(REGISTRATION_CLOSED))
        .execute(conn)
}

pub fn list_all_events(conn: &mut SqliteConnection) -> Result<Vec<Event>, diesel::result::Error> {
    events::table.order(events::event_id.asc()).load::<Event>(conn)
}

/// Events created by the given user.
pub fn list_events_by_creator(
    conn: &mut SqliteConnection,
    creator_id: i32,
) -> Result<Vec<Event>, diesel::result::Error> {
    events::table
        .filter(events::creator_id.eq(creator_id))
        .order(events::event_id.asc())
        .load::<Event>(conn)
}

/// Events the given user holds a registration for.
pub fn list_attended_events(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<Vec<Event>, diesel::result::Error> {
    attendees::table
        .inner_join(events::table)
        .filter(attendees::user_id.eq(user_id))
        .select(events::all_columns)
        .order(events::event_id.asc())
        .load::<Event>(conn)
}

pub fn get_registration(
    conn: &mut SqliteConnection,
    event_id: i32,
    user_id: i32,
) -> Result<Option<Attendee>, diesel::result::Error> {
    attendees::table
        .find((event_id, user_id))
        .first::<Attendee>(conn)
        .optional()
}

pub fn insert_attendee(
    conn: &mut SqliteConnection,
    event_id: i32,
    user_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(attendees::table)
        .values(&NewAttendee { event_id, user_id })
        .execute(conn)
}

pub fn count_attendees(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<i64, diesel::result::Error> {
    attendees::table
        .filter(attendees::event_id.eq(event_id))
        .count()
        .get_result(conn)
}

/// The registered attendees of an event, with their identity fields. Only
/// surfaced to the event's creator.
pub fn list_event_attendees(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<UserSummary>, diesel::result::Error> {
    attendees::table
        .inner_join(users::table)
        .filter(attendees::event_id.eq(event_id))
        .select((
            users::user_id,
            users::first_name,
            users::last_name,
            users::email,
        ))
        .order(users::user_id.asc())
        .load::<UserSummary>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::orm::auth::hash_password;
    use crate::orm::testing::setup_test_db;
    use crate::orm::user::insert_user;

    fn insert_dummy_user(conn: &mut SqliteConnection, email: &str) -> crate::models::User {
        insert_user(
            conn,
            NewUser {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: email.to_string(),
                password_hash: hash_password("secret"),
            },
        )
        .expect("insert dummy user")
    }

    fn sample_event(creator_id: i32, name: &str) -> NewEvent {
        NewEvent {
            creator_id,
            name: name.to_string(),
            description: "A conference".to_string(),
            location: "Main hall".to_string(),
            start_date: 4_102_444_800_000,
            close_registration: 4_102_358_400_000,
            max_attendees: 100,
        }
    }

    #[test]
    fn test_insert_get_and_patch_event() {
        let mut conn = setup_test_db();
        let creator = insert_dummy_user(&mut conn, "host@example.com");

        let event = insert_event(&mut conn, sample_event(creator.user_id, "RustConf")).unwrap();
        assert_eq!(event.name, "RustConf");
        assert!(!event.is_archived());

        let patch = EventPatch {
            location: Some("Second floor".to_string()),
            max_attendees: Some(50),
            ..Default::default()
        };
        assert_eq!(update_event(&mut conn, event.event_id, &patch).unwrap(), 1);

        let updated = get_event(&mut conn, event.event_id).unwrap().unwrap();
        assert_eq!(updated.location, "Second floor");
        assert_eq!(updated.max_attendees, 50);
        // Untouched columns survive the patch.
        assert_eq!(updated.name, "RustConf");
        assert_eq!(updated.creator_id, creator.user_id);
    }

    #[test]
    fn test_archive_event_sets_sentinel_only() {
        let mut conn = setup_test_db();
        let creator = insert_dummy_user(&mut conn, "host@example.com");
        let guest = insert_dummy_user(&mut conn, "guest@example.com");

        let event = insert_event(&mut conn, sample_event(creator.user_id, "Meetup")).unwrap();
        insert_attendee(&mut conn, event.event_id, guest.user_id).unwrap();

        archive_event(&mut conn, event.event_id).unwrap();

        let archived = get_event(&mut conn, event.event_id).unwrap().unwrap();
        assert!(archived.is_archived());
        assert_eq!(archived.close_registration, REGISTRATION_CLOSED);
        // The registration record is untouched by archiving.
        assert_eq!(count_attendees(&mut conn, event.event_id).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected_by_storage() {
        let mut conn = setup_test_db();
        let creator = insert_dummy_user(&mut conn, "host@example.com");
        let guest = insert_dummy_user(&mut conn, "guest@example.com");
        let event = insert_event(&mut conn, sample_event(creator.user_id, "Meetup")).unwrap();

        insert_attendee(&mut conn, event.event_id, guest.user_id).unwrap();
        let err = insert_attendee(&mut conn, event.event_id, guest.user_id).unwrap_err();
        assert!(matches!(
            err,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            )
        ));
        assert_eq!(count_attendees(&mut conn, event.event_id).unwrap(), 1);
    }

    #[test]
    fn test_listings_by_creator_and_attendance() {
        let mut conn = setup_test_db();
        let alice = insert_dummy_user(&mut conn, "alice@example.com");
        let bob = insert_dummy_user(&mut conn, "bob@example.com");

        let hosted = insert_event(&mut conn, sample_event(alice.user_id, "Hosted")).unwrap();
        let other = insert_event(&mut conn, sample_event(bob.user_id, "Other")).unwrap();
        insert_attendee(&mut conn, other.event_id, alice.user_id).unwrap();

        let created = list_events_by_creator(&mut conn, alice.user_id).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].event_id, hosted.event_id);

        let attended = list_attended_events(&mut conn, alice.user_id).unwrap();
        assert_eq!(attended.len(), 1);
        assert_eq!(attended[0].event_id, other.event_id);

        let everyone = list_all_events(&mut conn).unwrap();
        assert_eq!(everyone.len(), 2);

        let roster = list_event_attendees(&mut conn, other.event_id).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].email, "alice@example.com");
    }
}
