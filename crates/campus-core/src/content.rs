//! User-authored content: posts, comments, questions and answers.
//!
//! These rows are the primary writes of the action handlers and the targets
//! of reactions and votes. Documents are content too, but live in their own
//! versioned table (see [`crate::document`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything a user can react to or vote on.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetKind {
  Post,
  Comment,
  Question,
  Answer,
  Document,
}

/// A typed pointer at a reaction or vote target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
  pub kind: TargetKind,
  pub id:   Uuid,
}

impl TargetRef {
  pub fn new(kind: TargetKind, id: Uuid) -> Self { Self { kind, id } }

  /// In-app path used as the deep link of notifications about this target.
  pub fn link(&self) -> String {
    match self.kind {
      TargetKind::Post => format!("/feed/{}", self.id),
      TargetKind::Comment => format!("/feed/comments/{}", self.id),
      TargetKind::Question => format!("/questions/{}", self.id),
      TargetKind::Answer => format!("/questions/answers/{}", self.id),
      TargetKind::Document => format!("/documents/{}", self.id),
    }
  }
}

/// The kinds stored in the shared `contents` table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
  Post,
  Comment,
  Question,
  Answer,
}

impl From<ContentKind> for TargetKind {
  fn from(kind: ContentKind) -> Self {
    match kind {
      ContentKind::Post => Self::Post,
      ContentKind::Comment => Self::Comment,
      ContentKind::Question => Self::Question,
      ContentKind::Answer => Self::Answer,
    }
  }
}

impl TryFrom<TargetKind> for ContentKind {
  type Error = TargetKind;

  fn try_from(kind: TargetKind) -> Result<Self, Self::Error> {
    match kind {
      TargetKind::Post => Ok(Self::Post),
      TargetKind::Comment => Ok(Self::Comment),
      TargetKind::Question => Ok(Self::Question),
      TargetKind::Answer => Ok(Self::Answer),
      TargetKind::Document => Err(kind),
    }
  }
}

/// A post, comment, question or answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
  pub content_id:         Uuid,
  pub kind:               ContentKind,
  pub owner_id:           Uuid,
  /// Comment → post, answer → question; `None` for top-level content.
  pub parent_id:          Option<Uuid>,
  pub body:               String,
  /// Only ever set on questions.
  pub accepted_answer_id: Option<Uuid>,
  pub created_at:         DateTime<Utc>,
}

impl Content {
  pub fn target(&self) -> TargetRef {
    TargetRef::new(self.kind.into(), self.content_id)
  }
}

/// Input to [`crate::store::CampusStore::add_content`].
#[derive(Debug, Clone)]
pub struct NewContent {
  pub kind:      ContentKind,
  pub owner_id:  Uuid,
  pub parent_id: Option<Uuid>,
  pub body:      String,
}
