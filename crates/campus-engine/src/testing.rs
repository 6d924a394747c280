//! Shared fixtures for the engine's unit tests.

use std::sync::Arc;

use campus_core::{
  content::{Content, NewContent, TargetRef},
  conversation::Conversation,
  document::{Document, DocumentPayload, NewDocument, QualityStatus, Revision},
  notification::{NewNotification, Notification},
  reaction::{Reaction, ReactionKey, ReactionKind},
  store::CampusStore,
  user::{AwardOutcome, NewUser, PointAward, User},
  vote::{Vote, VoteKey, VoteValue},
};
use campus_store_sqlite::{Result, SqliteStore};
use uuid::Uuid;

use crate::{Engine, EngineConfig};

pub async fn engine() -> Engine<SqliteStore> {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("failed to open in-memory store");
  engine_over(store).await
}

pub async fn engine_over<S: CampusStore + 'static>(store: S) -> Engine<S> {
  Engine::new(Arc::new(store), EngineConfig::default())
}

pub async fn user<S: CampusStore + 'static>(engine: &Engine<S>, name: &str) -> User {
  engine
    .store()
    .add_user(NewUser::new(name))
    .await
    .expect("failed to add user")
}

// ─── Stale reaction reads ────────────────────────────────────────────────────

/// A store whose `get_reaction` never sees existing rows, like a toggle that
/// read "absent" just before a concurrent toggle inserted the same row.
/// Everything else is passed through to SQLite.
pub struct StaleReactionReads(SqliteStore);

impl StaleReactionReads {
  pub async fn open() -> Self {
    Self(
      SqliteStore::open_in_memory()
        .await
        .expect("failed to open in-memory store"),
    )
  }
}

impl CampusStore for StaleReactionReads {
  type Error = campus_store_sqlite::Error;

  async fn add_user(&self, input: NewUser) -> Result<User> { self.0.add_user(input).await }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> { self.0.get_user(id).await }

  async fn apply_award(&self, award: PointAward) -> Result<AwardOutcome> {
    self.0.apply_award(award).await
  }

  async fn add_content(&self, input: NewContent) -> Result<Content> {
    self.0.add_content(input).await
  }

  async fn get_content(&self, id: Uuid) -> Result<Option<Content>> {
    self.0.get_content(id).await
  }

  async fn target_owner(&self, target: TargetRef) -> Result<Option<Uuid>> {
    self.0.target_owner(target).await
  }

  async fn set_accepted_answer(&self, question_id: Uuid, answer_id: Uuid) -> Result<Option<Uuid>> {
    self.0.set_accepted_answer(question_id, answer_id).await
  }

  async fn add_document(&self, input: NewDocument) -> Result<Document> {
    self.0.add_document(input).await
  }

  async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
    self.0.get_document(id).await
  }

  async fn revise_document(
    &self,
    document_id: Uuid,
    expected_version: u32,
    payload: DocumentPayload,
  ) -> Result<Revision> {
    self.0.revise_document(document_id, expected_version, payload).await
  }

  async fn set_quality_status(
    &self,
    document_id: Uuid,
    status: QualityStatus,
  ) -> Result<Option<Document>> {
    self.0.set_quality_status(document_id, status).await
  }

  async fn document_history(&self, document_id: Uuid) -> Result<Vec<Document>> {
    self.0.document_history(document_id).await
  }

  async fn add_notification(&self, input: NewNotification) -> Result<Notification> {
    self.0.add_notification(input).await
  }

  async fn list_notifications(&self, owner_id: Uuid, limit: usize) -> Result<Vec<Notification>> {
    self.0.list_notifications(owner_id, limit).await
  }

  async fn mark_notification_read(&self, owner_id: Uuid, notification_id: Uuid) -> Result<bool> {
    self.0.mark_notification_read(owner_id, notification_id).await
  }

  async fn mark_all_notifications_read(&self, owner_id: Uuid) -> Result<u64> {
    self.0.mark_all_notifications_read(owner_id).await
  }

  async fn unread_notifications(&self, owner_id: Uuid) -> Result<u64> {
    self.0.unread_notifications(owner_id).await
  }

  async fn get_reaction(&self, _key: ReactionKey) -> Result<Option<Reaction>> { Ok(None) }

  async fn add_reaction(&self, key: ReactionKey) -> Result<Reaction> {
    self.0.add_reaction(key).await
  }

  async fn remove_reaction(&self, key: ReactionKey) -> Result<bool> {
    self.0.remove_reaction(key).await
  }

  async fn count_reactions(&self, reaction: ReactionKind, target: TargetRef) -> Result<u64> {
    self.0.count_reactions(reaction, target).await
  }

  async fn upsert_vote(&self, key: VoteKey, value: VoteValue) -> Result<Vote> {
    self.0.upsert_vote(key, value).await
  }

  async fn get_vote(&self, key: VoteKey) -> Result<Option<Vote>> { self.0.get_vote(key).await }

  async fn score(&self, target: TargetRef) -> Result<i64> { self.0.score(target).await }

  async fn find_conversation(&self, a: Uuid, b: Uuid) -> Result<Option<Conversation>> {
    self.0.find_conversation(a, b).await
  }

  async fn add_conversation(&self, a: Uuid, b: Uuid) -> Result<Conversation> {
    self.0.add_conversation(a, b).await
  }
}
