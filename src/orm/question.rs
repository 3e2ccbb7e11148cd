//! Database operations for questions and the vote protocol.
//!
//! The vote-row insert and the counter bump always run inside one
//! transaction so the two cannot drift apart on a crash.

use diesel::prelude::*;

use crate::models::{NewQuestion, NewVote, Question, Vote};
use crate::orm::db::last_insert_rowid;
use crate::schema::{questions, users, votes};

/// A question as listed for an event, with the asker's public identity.
#[derive(Queryable, Debug)]
pub struct QuestionWithAsker {
    pub question_id: i32,
    pub question: String,
    pub votes: i32,
    pub asked_by_user_id: i32,
    pub asked_by_first_name: String,
}

/// Inserts a new question and returns the stored row.
pub fn insert_question(
    conn: &mut SqliteConnection,
    new_question: NewQuestion,
) -> Result<Question, diesel::result::Error> {
    diesel::insert_into(questions::table)
        .values(&new_question)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    questions::table.find(last_id).first::<Question>(conn)
}

pub fn get_question(
    conn: &mut SqliteConnection,
    question_id: i32,
) -> Result<Option<Question>, diesel::result::Error> {
    questions::table
        .find(question_id)
        .first::<Question>(conn)
        .optional()
}

/// Removes the question row. Any vote rows pointing at it are left behind;
/// they are harmless orphans once the question is gone.
pub fn delete_question(
    conn: &mut SqliteConnection,
    question_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(questions::table.find(question_id)).execute(conn)
}

pub fn get_vote(
    conn: &mut SqliteConnection,
    question_id: i32,
    voter_id: i32,
) -> Result<Option<Vote>, diesel::result::Error> {
    votes::table
        .find((question_id, voter_id))
        .first::<Vote>(conn)
        .optional()
}

/// Records an upvote: one vote row plus a counter increment, atomically.
/// The caller checks for a prior vote first; the composite primary key on
/// `votes` backstops the check under races.
pub fn record_upvote(
    conn: &mut SqliteConnection,
    question_id: i32,
    voter_id: i32,
) -> Result<(), diesel::result::Error> {
    conn.transaction(|conn| {
        diesel::insert_into(votes::table)
            .values(&NewVote {
                question_id,
                voter_id,
            })
            .execute(conn)?;
        diesel::update(questions::table.find(question_id))
            .set(questions::votes.eq(questions::votes + 1))
            .execute(conn)?;
        Ok(())
    })
}

/// Records a downvote. If the voter has no vote row yet one is created, but
/// unlike the upvote path an existing row does not block the operation: the
/// counter is decremented every time. That asymmetry is the product's
/// current contract (see DESIGN.md).
pub fn record_downvote(
    conn: &mut SqliteConnection,
    question_id: i32,
    voter_id: i32,
) -> Result<(), diesel::result::Error> {
    conn.transaction(|conn| {
        let existing = get_vote(conn, question_id, voter_id)?;
        if existing.is_none() {
            diesel::insert_into(votes::table)
                .values(&NewVote {
                    question_id,
                    voter_id,
                })
                .execute(conn)?;
        }
        diesel::update(questions::table.find(question_id))
            .set(questions::votes.eq(questions::votes - 1))
            .execute(conn)?;
        Ok(())
    })
}

/// Questions for an event, highest score first, newest first among equal
/// scores, each with the asker's id and first name.
pub fn list_questions_for_event(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<QuestionWithAsker>, diesel::result::Error> {
    questions::table
        .inner_join(users::table)
        .filter(questions::event_id.eq(event_id))
        .order((questions::votes.desc(), questions::question_id.desc()))
        .select((
            questions::question_id,
            questions::question,
            questions::votes,
            users::user_id,
            users::first_name,
        ))
        .load::<QuestionWithAsker>(conn)
}
