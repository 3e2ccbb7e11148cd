//! Question and vote endpoints for an event's Q&A.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use rocket::{Route, delete, get, post, routes};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, api_error, internal_error};
use crate::models::NewQuestion;
use crate::orm::DbConn;
use crate::orm::event::{get_event, get_registration};
use crate::orm::question::{
    delete_question as delete_question_row, get_question, get_vote, insert_question,
    list_questions_for_event, record_downvote, record_upvote,
};
use crate::session_guards::AuthenticatedUser;

#[derive(Deserialize)]
pub struct AskQuestionRequest {
    pub question: Option<String>,
}

#[derive(Serialize)]
pub struct AskQuestionResponse {
    pub question_id: i32,
}

#[derive(Serialize)]
pub struct AskedBy {
    pub user_id: i32,
    pub first_name: String,
}

#[derive(Serialize)]
pub struct QuestionEntry {
    pub question_id: i32,
    pub question: String,
    pub votes: i32,
    pub asked_by: AskedBy,
}

/// List Questions endpoint.
///
/// - **URL:** `/event/<event_id>/questions`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Ordered by score descending, newest first among equal scores. Each entry
/// carries only the asker's id and first name, not their full identity.
#[get("/event/<event_id>/questions")]
pub async fn get_all_questions(
    db: DbConn,
    _auth_user: AuthenticatedUser,
    event_id: i32,
) -> Result<Json<Vec<QuestionEntry>>, ApiError> {
    db.run(move |conn| {
        let questions = list_questions_for_event(conn, event_id).map_err(|e| {
            eprintln!("Error fetching questions for event {}: {:?}", event_id, e);
            internal_error()
        })?;

        Ok(Json(
            questions
                .into_iter()
                .map(|q| QuestionEntry {
                    question_id: q.question_id,
                    question: q.question,
                    votes: q.votes,
                    asked_by: AskedBy {
                        user_id: q.asked_by_user_id,
                        first_name: q.asked_by_first_name,
                    },
                })
                .collect(),
        ))
    })
    .await
}

/// Ask Question endpoint.
///
/// - **URL:** `/event/<event_id>/question`
/// - **Method:** `POST`
/// - **Authentication:** Required; registered attendees only
///
/// Creators cannot ask questions on their own events (they also cannot
/// register for them, so the attendee check already excludes them).
#[post("/event/<event_id>/question", data = "<body>")]
pub async fn ask_question(
    db: DbConn,
    auth_user: AuthenticatedUser,
    event_id: i32,
    body: Json<AskQuestionRequest>,
) -> Result<status::Created<Json<AskQuestionResponse>>, ApiError> {
    let question = match body.into_inner().question {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return Err(api_error(
                Status::BadRequest,
                "Invalid question: Question cannot be blank",
            ));
        }
    };

    let caller_id = auth_user.user.user_id;
    db.run(move |conn| {
        match get_registration(conn, event_id, caller_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(api_error(
                    Status::Forbidden,
                    "You must be registered for the event to ask a question",
                ));
            }
            Err(e) => {
                eprintln!("Error checking registration: {:?}", e);
                return Err(internal_error());
            }
        }

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
                "Event creators cannot ask questions on their own events",
            ));
        }

        match insert_question(
            conn,
            NewQuestion {
                question,
                asked_by: caller_id,
                event_id,
                votes: 0,
            },
        ) {
            Ok(created) => Ok(status::Created::new("/").body(Json(AskQuestionResponse {
                question_id: created.question_id,
            }))),
            Err(e) => {
                eprintln!("Error inserting question: {:?}", e);
                Err(internal_error())
            }
        }
    })
    .await
}

/// Delete Question endpoint.
///
/// - **URL:** `/question/<question_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Required; the question's author or the hosting
///   event's creator only
#[delete("/question/<question_id>")]
pub async fn delete_question(
    db: DbConn,
    auth_user: AuthenticatedUser,
    question_id: i32,
) -> Result<Json<Value>, ApiError> {
    let caller_id = auth_user.user.user_id;

    db.run(move |conn| {
        let question = match get_question(conn, question_id) {
            Ok(Some(question)) => question,
            Ok(None) => return Err(api_error(Status::NotFound, "Question not found")),
            Err(e) => {
                eprintln!("Error fetching question {}: {:?}", question_id, e);
                return Err(internal_error());
            }
        };

        let is_author = question.asked_by == caller_id;
        let is_event_creator = match get_event(conn, question.event_id) {
            Ok(Some(event)) => event.creator_id == caller_id,
            Ok(None) => false,
            Err(e) => {
                eprintln!("Error fetching event {}: {:?}", question.event_id, e);
                return Err(internal_error());
            }
        };

        if !is_author && !is_event_creator {
            return Err(api_error(
                Status::Forbidden,
                "You do not have permission to delete this question",
            ));
        }

        delete_question_row(conn, question_id).map_err(|e| {
            eprintln!("Error deleting question {}: {:?}", question_id, e);
            internal_error()
        })?;

        Ok(Json(json!({ "message": "Question deleted successfully" })))
    })
    .await
}

/// Upvote Question endpoint.
///
/// - **URL:** `/question/<question_id>/vote`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// One shot per user: any existing vote row for the pair, in either
/// direction, makes this a 403.
#[post("/question/<question_id>/vote")]
pub async fn upvote_question(
    db: DbConn,
    auth_user: AuthenticatedUser,
    question_id: i32,
) -> Result<Json<Value>, ApiError> {
    let caller_id = auth_user.user.user_id;

    db.run(move |conn| {
        if get_question(conn, question_id)
            .map_err(|e| {
                eprintln!("Error fetching question {}: {:?}", question_id, e);
                internal_error()
            })?
            .is_none()
        {
            return Err(api_error(Status::NotFound, "Question not found"));
        }

        match get_vote(conn, question_id, caller_id) {
            Ok(Some(_)) => {
                return Err(api_error(
                    Status::Forbidden,
                    "You have already voted on this question",
                ));
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error checking vote: {:?}", e);
                return Err(internal_error());
            }
        }

        match record_upvote(conn, question_id, caller_id) {
            Ok(()) => Ok(Json(json!({ "message": "Question upvoted successfully" }))),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(api_error(
                Status::Forbidden,
                "You have already voted on this question",
            )),
            Err(e) => {
                eprintln!("Error recording upvote: {:?}", e);
                Err(internal_error())
            }
        }
    })
    .await
}

/// Downvote Question endpoint.
///
/// - **URL:** `/question/<question_id>/vote`
/// - **Method:** `DELETE`
/// - **Authentication:** Required
///
/// Unlike the upvote path, an existing vote row does not block this
/// operation: the score is decremented every call, and a vote row is only
/// created when the caller had none. Deliberate fidelity to the current
/// product contract; see DESIGN.md before changing.
#[delete("/question/<question_id>/vote")]
pub async fn downvote_question(
    db: DbConn,
    auth_user: AuthenticatedUser,
    question_id: i32,
) -> Result<Json<Value>, ApiError> {
    let caller_id = auth_user.user.user_id;

    db.run(move |conn| {
        if get_question(conn, question_id)
            .map_err(|e| {
                eprintln!("Error fetching question {}: {:?}", question_id, e);
                internal_error()
            })?
            .is_none()
        {
            return Err(api_error(Status::NotFound, "Question not found"));
        }

        record_downvote(conn, question_id, caller_id).map_err(|e| {
            eprintln!("Error recording downvote: {:?}", e);
            internal_error()
        })?;

        Ok(Json(json!({ "message": "Question downvoted successfully" })))
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        get_all_questions,
        ask_question,
        delete_question,
        upvote_question,
        downvote_question,
    ]
}
