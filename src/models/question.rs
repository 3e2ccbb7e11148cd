use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;

use crate::schema::{questions, votes};

#[derive(Queryable, Identifiable, Serialize, Debug, Clone)]
#[diesel(table_name = questions, primary_key(question_id))]
pub struct Question {
    pub question_id: i32,
    pub question: String,
    pub asked_by: i32,
    pub event_id: i32,
    /// Running score; mutated only through the vote operations. May go
    /// negative.
    pub votes: i32,
}

#[derive(Insertable)]
#[diesel(table_name = questions)]
pub struct NewQuestion {
    pub question: String,
    pub asked_by: i32,
    pub event_id: i32,
    pub votes: i32,
}

/// Records that a user has voted on a question, in either direction. The
/// composite primary key allows at most one row per (question, voter) pair.
#[derive(Queryable, Debug)]
pub struct Vote {
    pub question_id: i32,
    pub voter_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = votes)]
pub struct NewVote {
    pub question_id: i32,
    pub voter_id: i32,
}
