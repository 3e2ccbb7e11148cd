//! Database operations for user accounts and their live session tokens.

use diesel::prelude::*;

use crate::models::{NewUser, User};
use crate::orm::db::last_insert_rowid;
use crate::schema::users;

/// Inserts a new user and returns the stored row.
pub fn insert_user(
    conn: &mut SqliteConnection,
    new_user: NewUser,
) -> Result<User, diesel::result::Error> {
    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    users::table.find(last_id).first::<User>(conn)
}

pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<Option<User>, diesel::result::Error> {
    users::table.find(user_id).first::<User>(conn).optional()
}

pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    users::table
        .filter(users::email.eq(email))
        .first::<User>(conn)
        .optional()
}

/// Resolves a presented session token to its user, if any user currently
/// holds that token.
pub fn get_user_by_session_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<User>, diesel::result::Error> {
    users::table
        .filter(users::session_token.eq(token))
        .first::<User>(conn)
        .optional()
}

/// Replaces (or clears, with `None`) the user's live session token. Each
/// user holds at most one token at a time, so a fresh login invalidates any
/// earlier session.
pub fn set_session_token(
    conn: &mut SqliteConnection,
    user_id: i32,
    token: Option<&str>,
) -> Result<usize, diesel::result::Error> {
    diesel::update(users::table.find(user_id))
        .set(users::session_token.eq(token))
        .execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::auth::hash_password;
    use crate::orm::testing::setup_test_db;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: hash_password("letmein"),
        }
    }

    #[test]
    fn test_insert_and_lookup_user() {
        let mut conn = setup_test_db();

        let user = insert_user(&mut conn, sample_user("ada@example.com")).unwrap();
        assert!(user.user_id > 0);
        assert!(user.session_token.is_none());

        let by_email = get_user_by_email(&mut conn, "ada@example.com")
            .unwrap()
            .expect("user should be found by email");
        assert_eq!(by_email.user_id, user.user_id);

        assert!(get_user_by_email(&mut conn, "nobody@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_email_uniqueness_enforced_by_storage() {
        let mut conn = setup_test_db();

        insert_user(&mut conn, sample_user("dup@example.com")).unwrap();
        let err = insert_user(&mut conn, sample_user("dup@example.com")).unwrap_err();
        assert!(matches!(
            err,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            )
        ));
    }

    #[test]
    fn test_session_token_set_replace_clear() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, sample_user("ada@example.com")).unwrap();

        set_session_token(&mut conn, user.user_id, Some("token-one")).unwrap();
        assert!(get_user_by_session_token(&mut conn, "token-one")
            .unwrap()
            .is_some());

        // A second login replaces the first token outright.
        set_session_token(&mut conn, user.user_id, Some("token-two")).unwrap();
        assert!(get_user_by_session_token(&mut conn, "token-one")
            .unwrap()
            .is_none());
        assert!(get_user_by_session_token(&mut conn, "token-two")
            .unwrap()
            .is_some());

        set_session_token(&mut conn, user.user_id, None).unwrap();
        assert!(get_user_by_session_token(&mut conn, "token-two")
            .unwrap()
            .is_none());
    }
}
