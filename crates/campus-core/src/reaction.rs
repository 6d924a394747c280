//! On/off reaction memberships (likes and bookmarks).
//!
//! There is no "active" flag: the presence of a row is the reacted state and
//! its absence the un-reacted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::TargetRef;

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
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReactionKind {
  Like,
  Bookmark,
}

/// The unique key of a membership: at most one row per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactionKey {
  pub reaction: ReactionKind,
  pub actor_id: Uuid,
  pub target:   TargetRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
  #[serde(flatten)]
  pub key:        ReactionKey,
  pub created_at: DateTime<Utc>,
}

/// What a toggle returns to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
  /// Whether the actor's membership exists after the toggle.
  pub active: bool,
  /// Number of memberships on the target after the toggle.
  pub count:  u64,
}
