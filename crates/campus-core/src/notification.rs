//! Per-user notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
  System,
  Daily,
  Like,
  Comment,
  Follow,
}

/// A notification row. Only `is_read` ever changes after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub owner_id:        Uuid,
  pub kind:            NotificationKind,
  pub content:         String,
  /// In-app deep link, e.g. `/profile/<uuid>`.
  pub link:            Option<String>,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::CampusStore::add_notification`].
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub owner_id: Uuid,
  pub kind:     NotificationKind,
  pub content:  String,
  pub link:     Option<String>,
}
