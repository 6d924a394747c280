//! Core types and trait definitions for the campus reputation engine.
//!
//! No runtime or database dependencies: the SQLite backend and the engine
//! both build on these types and on [`store::CampusStore`].

pub mod content;
pub mod conversation;
pub mod document;
pub mod error;
pub mod event;
pub mod notification;
pub mod reaction;
pub mod store;
pub mod user;
pub mod vote;

pub use error::{Entity, Error, Result};
