//! SQLite backend for the campus engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every call that touches more than one
//! row runs inside a single rusqlite transaction on that thread, which is
//! what makes awards and version uploads atomic.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
