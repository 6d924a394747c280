//! Signed votes and the accepted-answer outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, content::TargetRef};

/// A vote's value: `-1` or `+1`, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum VoteValue {
  Down,
  Up,
}

impl VoteValue {
  pub fn as_i8(self) -> i8 {
    match self {
      Self::Down => -1,
      Self::Up => 1,
    }
  }
}

impl TryFrom<i8> for VoteValue {
  type Error = Error;

  fn try_from(value: i8) -> Result<Self> {
    match value {
      -1 => Ok(Self::Down),
      1 => Ok(Self::Up),
      other => Err(Error::Validation(format!(
        "vote value must be -1 or +1, got {other}"
      ))),
    }
  }
}

impl TryFrom<i64> for VoteValue {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    i8::try_from(value)
      .map_err(|_| {
        Error::Validation(format!("vote value must be -1 or +1, got {value}"))
      })
      .and_then(Self::try_from)
  }
}

impl From<VoteValue> for i8 {
  fn from(value: VoteValue) -> Self { value.as_i8() }
}

/// The unique key of a vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteKey {
  pub actor_id: Uuid,
  pub target:   TargetRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
  #[serde(flatten)]
  pub key:        VoteKey,
  pub value:      VoteValue,
  pub updated_at: DateTime<Utc>,
}

/// What a vote returns to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
  pub value:    VoteValue,
  /// The actor's vote on the target before this one, if any.
  pub previous: Option<VoteValue>,
  /// The target's score after the vote.
  pub score:    i64,
}

/// The result of accepting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acceptance {
  pub question_id: Uuid,
  pub answer_id:   Uuid,
  /// The answer that was accepted before, if this call replaced one.
  pub replaced:    Option<Uuid>,
}
