//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order is chronological order.
//! UUIDs are stored as hyphenated lowercase strings; enums as their strum
//! names.

use std::str::FromStr;

use campus_core::{
  content::{Content, ContentKind, TargetKind, TargetRef},
  conversation::Conversation,
  document::{Document, DocumentPayload, QualityStatus},
  notification::{Notification, NotificationKind},
  reaction::{Reaction, ReactionKey, ReactionKind},
  user::{Role, User},
  vote::{Vote, VoteKey, VoteValue},
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counts ───────────────────────────────────────────────────────────────────

pub fn encode_count(column: &'static str, value: u64) -> Result<i64> {
  i64::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

fn decode_target(kind: &str, id: &str) -> Result<TargetRef> {
  Ok(TargetRef::new(
    decode_enum::<TargetKind>("target_kind", kind)?,
    decode_uuid(id)?,
  ))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "user_id, display_name, role, points, level, created_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub display_name: String,
  pub role:         String,
  pub points:       i64,
  pub level:        i64,
  pub created_at:   String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      display_name: row.get(1)?,
      role:         row.get(2)?,
      points:       row.get(3)?,
      level:        row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      display_name: self.display_name,
      role:         decode_enum::<Role>("role", &self.role)?,
      points:       self.points.max(0) as u64,
      level:        self.level.max(1) as u32,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawContent::from_row`].
pub const CONTENT_COLUMNS: &str =
  "content_id, kind, owner_id, parent_id, body, accepted_answer_id, created_at";

/// Raw strings read directly from a `contents` row.
pub struct RawContent {
  pub content_id:         String,
  pub kind:               String,
  pub owner_id:           String,
  pub parent_id:          Option<String>,
  pub body:               String,
  pub accepted_answer_id: Option<String>,
  pub created_at:         String,
}

impl RawContent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      content_id:         row.get(0)?,
      kind:               row.get(1)?,
      owner_id:           row.get(2)?,
      parent_id:          row.get(3)?,
      body:               row.get(4)?,
      accepted_answer_id: row.get(5)?,
      created_at:         row.get(6)?,
    })
  }

  pub fn into_content(self) -> Result<Content> {
    Ok(Content {
      content_id:         decode_uuid(&self.content_id)?,
      kind:               decode_enum::<ContentKind>("kind", &self.kind)?,
      owner_id:           decode_uuid(&self.owner_id)?,
      parent_id:          decode_opt_uuid(self.parent_id)?,
      body:               self.body,
      accepted_answer_id: decode_opt_uuid(self.accepted_answer_id)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawDocument::from_row`].
pub const DOCUMENT_COLUMNS: &str = "document_id, owner_id, title, description, \
   file_url, file_type, file_size, version, parent_id, head_id, \
   quality_status, created_at, updated_at";

/// Raw values read directly from a `documents` row.
pub struct RawDocument {
  pub document_id:    String,
  pub owner_id:       String,
  pub title:          String,
  pub description:    Option<String>,
  pub file_url:       String,
  pub file_type:      String,
  pub file_size:      i64,
  pub version:        i64,
  pub parent_id:      Option<String>,
  pub head_id:        Option<String>,
  pub quality_status: String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawDocument {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:    row.get(0)?,
      owner_id:       row.get(1)?,
      title:          row.get(2)?,
      description:    row.get(3)?,
      file_url:       row.get(4)?,
      file_type:      row.get(5)?,
      file_size:      row.get(6)?,
      version:        row.get(7)?,
      parent_id:      row.get(8)?,
      head_id:        row.get(9)?,
      quality_status: row.get(10)?,
      created_at:     row.get(11)?,
      updated_at:     row.get(12)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      document_id:    decode_uuid(&self.document_id)?,
      owner_id:       decode_uuid(&self.owner_id)?,
      payload:        DocumentPayload {
        title:       self.title,
        description: self.description,
        file_url:    self.file_url,
        file_type:   self.file_type,
        file_size:   self.file_size.max(0) as u64,
      },
      version:        self.version.max(1) as u32,
      parent_id:      decode_opt_uuid(self.parent_id)?,
      head_id:        decode_opt_uuid(self.head_id)?,
      quality_status: decode_enum::<QualityStatus>(
        "quality_status",
        &self.quality_status,
      )?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawNotification::from_row`].
pub const NOTIFICATION_COLUMNS: &str =
  "notification_id, owner_id, kind, content, link, is_read, created_at";

/// Raw values read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub owner_id:        String,
  pub kind:            String,
  pub content:         String,
  pub link:            Option<String>,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      owner_id:        row.get(1)?,
      kind:            row.get(2)?,
      content:         row.get(3)?,
      link:            row.get(4)?,
      is_read:         row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      owner_id:        decode_uuid(&self.owner_id)?,
      kind:            decode_enum::<NotificationKind>("kind", &self.kind)?,
      content:         self.content,
      link:            self.link,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reactions` row.
pub struct RawReaction {
  pub reaction:    String,
  pub actor_id:    String,
  pub target_kind: String,
  pub target_id:   String,
  pub created_at:  String,
}

impl RawReaction {
  pub fn into_reaction(self) -> Result<Reaction> {
    Ok(Reaction {
      key:        ReactionKey {
        reaction: decode_enum::<ReactionKind>("reaction", &self.reaction)?,
        actor_id: decode_uuid(&self.actor_id)?,
        target:   decode_target(&self.target_kind, &self.target_id)?,
      },
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `votes` row.
pub struct RawVote {
  pub actor_id:    String,
  pub target_kind: String,
  pub target_id:   String,
  pub value:       i64,
  pub updated_at:  String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    let value = VoteValue::try_from(self.value).map_err(|_| Error::UnknownValue {
      column: "value",
      value:  self.value.to_string(),
    })?;
    Ok(Vote {
      key: VoteKey {
        actor_id: decode_uuid(&self.actor_id)?,
        target:   decode_target(&self.target_kind, &self.target_id)?,
      },
      value,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawConversation::from_row`].
pub const CONVERSATION_COLUMNS: &str =
  "conversation_id, user_a, user_b, created_at";

/// Raw strings read directly from a `conversations` row.
pub struct RawConversation {
  pub conversation_id: String,
  pub user_a:          String,
  pub user_b:          String,
  pub created_at:      String,
}

impl RawConversation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      conversation_id: row.get(0)?,
      user_a:          row.get(1)?,
      user_b:          row.get(2)?,
      created_at:      row.get(3)?,
    })
  }

  pub fn into_conversation(self) -> Result<Conversation> {
    Ok(Conversation {
      conversation_id: decode_uuid(&self.conversation_id)?,
      user_a:          decode_uuid(&self.user_a)?,
      user_b:          decode_uuid(&self.user_b)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&ea).unwrap(), a);
  }

  #[test]
  fn unknown_enum_value_is_reported_with_column() {
    let err = decode_enum::<Role>("role", "wizard").unwrap_err();
    assert!(matches!(err, Error::UnknownValue { column: "role", .. }));
  }
}
