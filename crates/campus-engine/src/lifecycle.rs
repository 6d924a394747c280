//! Document versioning and quality review.
//!
//! A new version archives the live row and updates it in place; see
//! [`campus_core::document`] for the layout. Version uploads race through a
//! compare-and-swap on the observed version number, so two concurrent
//! uploads never both become version `n + 1`.

use std::sync::Arc;

use campus_core::{
  Entity, Error, Result,
  document::{Document, DocumentPayload, QualityStatus, Revision},
  store::{CampusStore, StoreError as _},
  user::Role,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct Lifecycle<S> {
  store:          Arc<S>,
  retry_attempts: u32,
}

impl<S> Clone for Lifecycle<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), retry_attempts: self.retry_attempts }
  }
}

impl<S: CampusStore> Lifecycle<S> {
  pub fn new(store: Arc<S>, retry_attempts: u32) -> Self {
    Self { store, retry_attempts: retry_attempts.max(1) }
  }

  /// The live document, or an archived snapshot when given a snapshot id.
  pub async fn get(&self, document_id: Uuid) -> Result<Document> {
    self
      .store
      .get_document(document_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Document, document_id))
  }

  /// Archived versions of a live document, newest first.
  pub async fn history(&self, document_id: Uuid) -> Result<Vec<Document>> {
    let live = self.live(document_id).await?;
    self
      .store
      .document_history(live.document_id)
      .await
      .map_err(Error::store)
  }

  /// Upload a new version of `document_id` on behalf of its owner.
  ///
  /// The previous version is kept as an immutable snapshot and the live
  /// document goes back to `PENDING` review.
  pub async fn create_version(
    &self,
    owner_id: Uuid,
    document_id: Uuid,
    payload: DocumentPayload,
  ) -> Result<Revision> {
    for attempt in 1..=self.retry_attempts {
      let live = self.live(document_id).await?;
      if live.owner_id != owner_id {
        return Err(Error::Forbidden(format!(
          "user {owner_id} does not own document {document_id}"
        )));
      }

      match self
        .store
        .revise_document(document_id, live.version, payload.clone())
        .await
      {
        Ok(revision) => {
          debug!(
            document = %document_id,
            version = revision.head.version,
            snapshot = %revision.archived.document_id,
            "document revised"
          );
          return Ok(revision);
        }
        Err(e) if e.is_conflict() => {
          debug!(document = %document_id, attempt, observed = live.version, "version race, retrying");
        }
        Err(e) => return Err(Error::store(e)),
      }
    }

    warn!(document = %document_id, attempts = self.retry_attempts, "gave up revising document");
    Err(Error::Conflict(format!(
      "document {document_id} kept changing during upload"
    )))
  }

  /// Record a review outcome for the current version of a document.
  pub async fn update_status(
    &self,
    document_id: Uuid,
    status: QualityStatus,
    requester_role: Role,
  ) -> Result<Document> {
    if !requester_role.is_elevated() {
      return Err(Error::Forbidden(format!(
        "role {} may not review documents",
        requester_role.as_ref()
      )));
    }
    if !status.is_review_outcome() {
      return Err(Error::Validation(
        "PENDING is set by uploads, not by review".into(),
      ));
    }

    let document = self
      .store
      .set_quality_status(document_id, status)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Document, document_id))?;
    debug!(document = %document_id, status = status.as_ref(), "document reviewed");
    Ok(document)
  }

  async fn live(&self, document_id: Uuid) -> Result<Document> {
    self
      .store
      .get_document(document_id)
      .await
      .map_err(Error::store)?
      .filter(Document::is_live)
      .ok_or_else(|| Error::not_found(Entity::Document, document_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{engine, user};

  fn payload(title: &str) -> DocumentPayload {
    DocumentPayload {
      title:       title.into(),
      description: Some("lecture notes".into()),
      file_url:    format!("https://files.example/{title}.pdf"),
      file_type:   "application/pdf".into(),
      file_size:   2048,
    }
  }

  #[tokio::test]
  async fn new_version_archives_the_previous_one() {
    let e = engine().await;
    let owner = user(&e, "Owner").await;
    let doc = e.actions.upload_document(owner.user_id, payload("v1")).await.unwrap();
    e.lifecycle
      .update_status(doc.document_id, QualityStatus::Verified, Role::Admin)
      .await
      .unwrap();

    let revision = e
      .lifecycle
      .create_version(owner.user_id, doc.document_id, payload("v2"))
      .await
      .unwrap();

    assert_eq!(revision.head.document_id, doc.document_id);
    assert_eq!(revision.head.version, 2);
    assert_eq!(revision.head.quality_status, QualityStatus::Pending);
    assert_eq!(revision.head.payload, payload("v2"));
    assert_eq!(revision.head.parent_id, Some(revision.archived.document_id));

    assert_eq!(revision.archived.version, 1);
    assert_eq!(revision.archived.payload, payload("v1"));
    assert_eq!(revision.archived.quality_status, QualityStatus::Verified);
    assert_eq!(revision.archived.head_id, Some(doc.document_id));

    let history = e.lifecycle.history(doc.document_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].document_id, revision.archived.document_id);
  }

  #[tokio::test]
  async fn only_the_owner_may_upload_versions() {
    let e = engine().await;
    let owner = user(&e, "Owner").await;
    let other = user(&e, "Other").await;
    let doc = e.actions.upload_document(owner.user_id, payload("v1")).await.unwrap();

    let err = e
      .lifecycle
      .create_version(other.user_id, doc.document_id, payload("v2"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(e.lifecycle.get(doc.document_id).await.unwrap().version, 1);
  }

  #[tokio::test]
  async fn concurrent_uploads_get_distinct_versions() {
    let e = engine().await;
    let owner = user(&e, "Owner").await;
    let doc = e.actions.upload_document(owner.user_id, payload("v1")).await.unwrap();

    let (a, b) = tokio::join!(
      e.lifecycle.create_version(owner.user_id, doc.document_id, payload("a")),
      e.lifecycle.create_version(owner.user_id, doc.document_id, payload("b")),
    );
    let mut versions = vec![a.unwrap().head.version, b.unwrap().head.version];
    versions.sort();
    assert_eq!(versions, vec![2, 3]);
    assert_eq!(e.lifecycle.history(doc.document_id).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn review_requires_elevated_role_and_a_terminal_state() {
    let e = engine().await;
    let owner = user(&e, "Owner").await;
    let doc = e.actions.upload_document(owner.user_id, payload("v1")).await.unwrap();

    let err = e
      .lifecycle
      .update_status(doc.document_id, QualityStatus::Verified, Role::User)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let err = e
      .lifecycle
      .update_status(doc.document_id, QualityStatus::Pending, Role::Moderator)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    for status in [QualityStatus::Flagged, QualityStatus::Rejected, QualityStatus::Verified] {
      let reviewed = e
        .lifecycle
        .update_status(doc.document_id, status, Role::Moderator)
        .await
        .unwrap();
      assert_eq!(reviewed.quality_status, status);
    }
  }

  #[tokio::test]
  async fn snapshots_cannot_be_reviewed_or_revised() {
    let e = engine().await;
    let owner = user(&e, "Owner").await;
    let doc = e.actions.upload_document(owner.user_id, payload("v1")).await.unwrap();
    let revision = e
      .lifecycle
      .create_version(owner.user_id, doc.document_id, payload("v2"))
      .await
      .unwrap();
    let snapshot = revision.archived.document_id;

    let err = e
      .lifecycle
      .update_status(snapshot, QualityStatus::Verified, Role::Admin)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    let err = e
      .lifecycle
      .create_version(owner.user_id, snapshot, payload("v3"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    // Snapshots stay readable.
    assert_eq!(e.lifecycle.get(snapshot).await.unwrap().version, 1);
  }
}
