//! Error taxonomy shared by every layer of the engine.

use thiserror::Error;
use uuid::Uuid;

use crate::{content::TargetKind, store::StoreError};

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Entity {
  User,
  Post,
  Comment,
  Question,
  Answer,
  Document,
}

impl From<TargetKind> for Entity {
  fn from(kind: TargetKind) -> Self {
    match kind {
      TargetKind::Post => Self::Post,
      TargetKind::Comment => Self::Comment,
      TargetKind::Question => Self::Question,
      TargetKind::Answer => Self::Answer,
      TargetKind::Document => Self::Document,
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// The referenced record does not exist. Never retried.
  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: Uuid },

  /// An ownership or role check failed.
  #[error("forbidden: {0}")]
  Forbidden(String),

  /// A uniqueness or compare-and-swap check lost a race.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Input rejected before any write happened.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: impl Into<Entity>, id: Uuid) -> Self {
    Self::NotFound { entity: entity.into(), id }
  }

  /// Wrap a backend error, keeping conflicts distinguishable.
  pub fn store<E: StoreError>(err: E) -> Self {
    if err.is_conflict() {
      Self::Conflict(err.to_string())
    } else {
      Self::Store(Box::new(err))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
