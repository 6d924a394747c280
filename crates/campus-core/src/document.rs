//! Documents and their version chain.
//!
//! All versions of a document live in one table. The live row keeps the
//! document's id for its whole life and is updated in place on every new
//! version; before that update the old attributes are copied into an
//! immutable archived row. Archived rows carry `head_id` (the live document
//! they were archived from); the live row is the one without it.
//!
//! ```text
//!   live (v3, parent ─┐)
//!                     └─▶ archived (v2, parent ─┐)
//!                                               └─▶ archived (v1, parent: None)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Quality review ──────────────────────────────────────────────────────────

/// Moderation state of the current version of a document.
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
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityStatus {
  #[default]
  Pending,
  Verified,
  Flagged,
  Rejected,
}

impl QualityStatus {
  /// A review outcome. Every review outcome is reachable directly from
  /// `Pending`; only a new upload moves a document back to `Pending`.
  pub fn is_review_outcome(self) -> bool { !matches!(self, Self::Pending) }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The user-supplied attributes of one version. The file itself is stored
/// elsewhere; only its metadata lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
  pub title:       String,
  pub description: Option<String>,
  pub file_url:    String,
  pub file_type:   String,
  pub file_size:   u64,
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub document_id:    Uuid,
  pub owner_id:       Uuid,
  #[serde(flatten)]
  pub payload:        DocumentPayload,
  /// Starts at 1; grows by exactly one per new version.
  pub version:        u32,
  /// The archived row holding the previous version, if any.
  pub parent_id:      Option<Uuid>,
  /// Set on archived rows only: the live document this snapshot belongs to.
  pub head_id:        Option<Uuid>,
  pub quality_status: QualityStatus,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Document {
  pub fn is_live(&self) -> bool { self.head_id.is_none() }
}

/// Input to [`crate::store::CampusStore::add_document`].
#[derive(Debug, Clone)]
pub struct NewDocument {
  pub owner_id: Uuid,
  pub payload:  DocumentPayload,
}

/// The result of a successful version upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
  /// The live row after the update.
  pub head:     Document,
  /// The immutable snapshot of the row as it was before the update.
  pub archived: Document,
}
