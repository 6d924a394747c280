//! Direct-message conversations between exactly two users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation row. The pair is unordered in meaning but stored as an
/// ordered tuple so the store can enforce one row per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
  pub conversation_id: Uuid,
  pub user_a:          Uuid,
  pub user_b:          Uuid,
  pub created_at:      DateTime<Utc>,
}

/// The storage ordering of a pair: lower UUID first.
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
  if a <= b { (a, b) } else { (b, a) }
}
