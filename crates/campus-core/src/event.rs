//! Domain events published by action handlers.
//!
//! Events are immutable and never persisted. Each payload variant names what
//! happened; [`EventKind`] is the bare discriminant listeners subscribe to.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants};
use uuid::Uuid;

use crate::content::TargetRef;

/// What happened, with the ids listeners need to react without re-reading
/// the primary rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, Display))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
  PostCreated {
    post_id: Uuid,
    user_id: Uuid,
  },
  CommentAdded {
    comment_id:    Uuid,
    post_id:       Uuid,
    post_owner_id: Uuid,
    user_id:       Uuid,
  },
  QuestionCreated {
    question_id: Uuid,
    user_id:     Uuid,
  },
  AnswerPosted {
    answer_id:          Uuid,
    question_id:        Uuid,
    question_author_id: Uuid,
    user_id:            Uuid,
  },
  AnswerAccepted {
    question_id:      Uuid,
    answer_id:        Uuid,
    answer_author_id: Uuid,
    /// The question author or an elevated user.
    user_id:          Uuid,
  },
  DocumentCreated {
    document_id: Uuid,
    user_id:     Uuid,
  },
  LikeAdded {
    target:          TargetRef,
    target_owner_id: Uuid,
    user_id:         Uuid,
  },
  BookmarkAdded {
    target:          TargetRef,
    target_owner_id: Uuid,
    user_id:         Uuid,
  },
  DailyVisit {
    user_id: Uuid,
    day:     NaiveDate,
  },
}

impl EventPayload {
  /// The user whose action produced this event.
  pub fn actor_id(&self) -> Uuid {
    match self {
      Self::PostCreated { user_id, .. }
      | Self::CommentAdded { user_id, .. }
      | Self::QuestionCreated { user_id, .. }
      | Self::AnswerPosted { user_id, .. }
      | Self::AnswerAccepted { user_id, .. }
      | Self::DocumentCreated { user_id, .. }
      | Self::LikeAdded { user_id, .. }
      | Self::BookmarkAdded { user_id, .. }
      | Self::DailyVisit { user_id, .. } => *user_id,
    }
  }

  /// A stable key for the thing the event is about. Two deliveries of the
  /// same event produce the same key.
  pub fn subject_key(&self) -> String {
    match self {
      Self::PostCreated { post_id, .. } => format!("post:{post_id}"),
      Self::CommentAdded { comment_id, .. } => format!("comment:{comment_id}"),
      Self::QuestionCreated { question_id, .. } => {
        format!("question:{question_id}")
      }
      Self::AnswerPosted { answer_id, .. } => format!("answer:{answer_id}"),
      Self::AnswerAccepted { question_id, answer_id, .. } => {
        format!("acceptance:{question_id}:{answer_id}")
      }
      Self::DocumentCreated { document_id, .. } => {
        format!("document:{document_id}")
      }
      Self::LikeAdded { target, .. } => format!("like:{}:{}", target.kind, target.id),
      Self::BookmarkAdded { target, .. } => {
        format!("bookmark:{}:{}", target.kind, target.id)
      }
      Self::DailyVisit { day, .. } => format!("daily:{day}"),
    }
  }
}

/// An envelope around a payload: identity and time of the occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    Uuid,
  pub occurred_at: DateTime<Utc>,
  pub payload:     EventPayload,
}

impl Event {
  pub fn new(payload: EventPayload) -> Self {
    Self { event_id: Uuid::new_v4(), occurred_at: Utc::now(), payload }
  }

  pub fn kind(&self) -> EventKind { EventKind::from(&self.payload) }
}
