pub mod auth;
mod db;
pub mod event;
pub mod question;
pub mod testing;
pub mod user;

pub use db::*;
