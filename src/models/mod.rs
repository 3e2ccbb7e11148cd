pub mod event;
pub mod question;
pub mod user;

pub use event::{Attendee, Event, EventPatch, NewAttendee, NewEvent, REGISTRATION_CLOSED};
pub use question::{NewQuestion, NewVote, Question, Vote};
pub use user::{NewUser, User, UserSummary};
