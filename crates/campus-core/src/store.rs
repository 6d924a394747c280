//! The `CampusStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `campus-store-sqlite`).
//! The engine depends on this abstraction, not on any concrete backend.
//!
//! Backends must provide three guarantees the engine relies on:
//!
//! - inserts into unique-keyed tables (reactions, conversations) fail with an
//!   error whose [`StoreError::is_conflict`] is `true` instead of duplicating;
//! - [`CampusStore::apply_award`] is one atomic read-modify-write;
//! - [`CampusStore::revise_document`] archives and updates in one transaction.

use std::future::Future;

use uuid::Uuid;

use crate::{
  content::{Content, NewContent, TargetRef},
  conversation::Conversation,
  document::{Document, DocumentPayload, NewDocument, QualityStatus, Revision},
  notification::{NewNotification, Notification},
  reaction::{Reaction, ReactionKey, ReactionKind},
  user::{AwardOutcome, NewUser, PointAward, User},
  vote::{Vote, VoteKey, VoteValue},
};

/// Errors returned by a [`CampusStore`] backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the operation lost a uniqueness or compare-and-swap race.
  fn is_conflict(&self) -> bool;
}

/// Abstraction over a campus store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait CampusStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by UUID. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Add the award's points and recompute the level, atomically.
  ///
  /// An award already applied for the same `(user, action, subject_key)`
  /// changes nothing and yields [`AwardOutcome::AlreadyAwarded`].
  fn apply_award(
    &self,
    award: PointAward,
  ) -> impl Future<Output = Result<AwardOutcome, Self::Error>> + Send + '_;

  // ── Content ───────────────────────────────────────────────────────────

  fn add_content(
    &self,
    input: NewContent,
  ) -> impl Future<Output = Result<Content, Self::Error>> + Send + '_;

  fn get_content(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Content>, Self::Error>> + Send + '_;

  /// The owner of a reaction/vote target, or `None` if the target does not
  /// exist (or exists under a different kind).
  fn target_owner(
    &self,
    target: TargetRef,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;

  /// Point a question at its accepted answer, replacing any previous one.
  /// Returns the previously accepted answer.
  fn set_accepted_answer(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  fn add_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Retrieve a live document or an archived snapshot by UUID.
  fn get_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Archive the live row and replace its attributes with `payload`,
  /// bumping the version and resetting the review status.
  ///
  /// Compare-and-swap on `expected_version`: if the live row's version has
  /// moved on, nothing is written and the error is a conflict.
  fn revise_document(
    &self,
    document_id: Uuid,
    expected_version: u32,
    payload: DocumentPayload,
  ) -> impl Future<Output = Result<Revision, Self::Error>> + Send + '_;

  /// Set the review status of a live document. Returns `None` if no live
  /// document has this id.
  fn set_quality_status(
    &self,
    document_id: Uuid,
    status: QualityStatus,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Archived snapshots of a document, newest first.
  fn document_history(
    &self,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn add_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// Most recent first, at most `limit` rows.
  fn list_notifications(
    &self,
    owner_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Mark one notification read if, and only if, `owner_id` owns it.
  /// Returns whether a row matched.
  fn mark_notification_read(
    &self,
    owner_id: Uuid,
    notification_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns the number of rows that flipped from unread to read.
  fn mark_all_notifications_read(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn unread_notifications(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  fn get_reaction(
    &self,
    key: ReactionKey,
  ) -> impl Future<Output = Result<Option<Reaction>, Self::Error>> + Send + '_;

  /// Insert a membership; a duplicate key is a conflict.
  fn add_reaction(
    &self,
    key: ReactionKey,
  ) -> impl Future<Output = Result<Reaction, Self::Error>> + Send + '_;

  /// Returns whether a row was deleted.
  fn remove_reaction(
    &self,
    key: ReactionKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_reactions(
    &self,
    reaction: ReactionKind,
    target: TargetRef,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Insert or replace the actor's vote on the target.
  fn upsert_vote(
    &self,
    key: VoteKey,
    value: VoteValue,
  ) -> impl Future<Output = Result<Vote, Self::Error>> + Send + '_;

  fn get_vote(
    &self,
    key: VoteKey,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  /// Sum of all vote values on the target.
  fn score(
    &self,
    target: TargetRef,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Conversations ─────────────────────────────────────────────────────

  /// Find the conversation between two users, whichever way round it was
  /// stored.
  fn find_conversation(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<Option<Conversation>, Self::Error>> + Send + '_;

  /// Insert a conversation; an existing pair is a conflict.
  fn add_conversation(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<Conversation, Self::Error>> + Send + '_;
}
