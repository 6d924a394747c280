//! Users, roles and the point/level arithmetic of the gamification engine.
//!
//! `points` only ever grows through [`crate::store::CampusStore::apply_award`];
//! `level` is never written on its own; it is recomputed from the new point
//! total inside the same store transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Moderator,
  Admin,
}

impl Role {
  /// Moderators and admins may review documents and accept answers on
  /// behalf of question authors.
  pub fn is_elevated(self) -> bool { matches!(self, Self::Moderator | Self::Admin) }
}

// ─── Levels ──────────────────────────────────────────────────────────────────

/// `floor(sqrt(points) / 10) + 1`, computed in integers.
///
/// `floor(x / 10) == floor(floor(x) / 10)` for non-negative `x`, so the
/// integer square root gives the same result as the real-valued formula
/// without any float rounding at perfect squares.
pub fn level_for_points(points: u64) -> u32 {
  (points.isqrt() / 10 + 1) as u32
}

/// A user's reputation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
  pub points: u64,
  pub level:  u32,
}

impl UserStats {
  pub fn from_points(points: u64) -> Self {
    Self { points, level: level_for_points(points) }
  }

  /// The stats after adding `delta` points.
  pub fn with_delta(self, delta: u64) -> Self {
    Self::from_points(self.points.saturating_add(delta))
  }
}

// ─── Action kinds ────────────────────────────────────────────────────────────

/// A category of user activity that earns points.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
  Post,
  Reply,
  Upload,
  Question,
  DailyVisit,
}

impl ActionKind {
  /// The fixed point value of this action.
  pub fn points(self) -> u64 {
    match self {
      Self::Post => 10,
      Self::Reply => 20,
      Self::Upload => 50,
      Self::Question => 30,
      Self::DailyVisit => 5,
    }
  }
}

/// Input to [`crate::store::CampusStore::apply_award`].
///
/// `(user_id, action, subject_key)` identifies the award: the store applies it
/// at most once, so redelivered events cannot double-award.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointAward {
  pub user_id:     Uuid,
  pub action:      ActionKind,
  /// What the action was about, e.g. `document:<uuid>` or `daily:2024-09-01`.
  pub subject_key: String,
}

/// The result of applying a [`PointAward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
  Applied { before: UserStats, after: UserStats },
  /// The same award was already applied earlier; nothing changed.
  AlreadyAwarded,
  UserNotFound,
}

impl AwardOutcome {
  /// `Some(new_level)` if this award moved the user to a higher level.
  pub fn level_up(&self) -> Option<u32> {
    match self {
      Self::Applied { before, after } if after.level > before.level => {
        Some(after.level)
      }
      _ => None,
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  pub display_name: String,
  pub role:         Role,
  pub points:       u64,
  pub level:        u32,
  pub created_at:   DateTime<Utc>,
}

impl User {
  pub fn stats(&self) -> UserStats {
    UserStats { points: self.points, level: self.level }
  }
}

/// Input to [`crate::store::CampusStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub display_name: String,
  pub role:         Role,
  /// Opening balance; the level is derived from it.
  pub points:       u64,
}

impl NewUser {
  pub fn new(display_name: impl Into<String>) -> Self {
    Self { display_name: display_name.into(), role: Role::default(), points: 0 }
  }

  pub fn with_role(mut self, role: Role) -> Self {
    self.role = role;
    self
  }

  pub fn with_points(mut self, points: u64) -> Self {
    self.points = points;
    self
  }
}
