//! Notification fan-out: a best-effort side channel plus read/unread state.

use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{
  Error, Result,
  content::{TargetKind, TargetRef},
  event::{Event, EventKind, EventPayload},
  notification::{NewNotification, Notification, NotificationKind},
  store::CampusStore,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bus::Listener;

/// Creates and reads per-user notifications.
pub struct Notifier<S> {
  store: Arc<S>,
  limit: usize,
}

impl<S> Clone for Notifier<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), limit: self.limit }
  }
}

impl<S: CampusStore> Notifier<S> {
  pub fn new(store: Arc<S>, limit: usize) -> Self { Self { store, limit } }

  /// Insert one notification.
  ///
  /// Never fails the caller: a storage error is logged and `None` returned,
  /// because the action that triggered the notification has already
  /// succeeded.
  pub async fn create_notification(
    &self,
    owner_id: Uuid,
    content: impl Into<String>,
    kind: NotificationKind,
    link: Option<String>,
  ) -> Option<Notification> {
    let input = NewNotification { owner_id, kind, content: content.into(), link };
    match self.store.add_notification(input).await {
      Ok(n) => {
        debug!(owner = %owner_id, kind = n.kind.as_ref(), "notification created");
        Some(n)
      }
      Err(e) => {
        warn!(owner = %owner_id, error = %e, "failed to create notification");
        None
      }
    }
  }

  /// Mark one notification read. A notification that does not exist or
  /// belongs to someone else is left alone and reported as `false`.
  pub async fn mark_read(&self, owner_id: Uuid, notification_id: Uuid) -> Result<bool> {
    let matched = self
      .store
      .mark_notification_read(owner_id, notification_id)
      .await
      .map_err(Error::store)?;
    if !matched {
      debug!(owner = %owner_id, notification = %notification_id, "mark_read ignored");
    }
    Ok(matched)
  }

  /// Mark every notification of `owner_id` read. Returns how many flipped.
  pub async fn mark_all_read(&self, owner_id: Uuid) -> Result<u64> {
    self
      .store
      .mark_all_notifications_read(owner_id)
      .await
      .map_err(Error::store)
  }

  /// The most recent notifications, newest first.
  pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Notification>> {
    self
      .store
      .list_notifications(owner_id, self.limit)
      .await
      .map_err(Error::store)
  }

  pub async fn unread_count(&self, owner_id: Uuid) -> Result<u64> {
    self
      .store
      .unread_notifications(owner_id)
      .await
      .map_err(Error::store)
  }
}

// ─── Listener ────────────────────────────────────────────────────────────────

/// Tells content owners about activity on their content.
pub struct NotificationListener<S> {
  store:    Arc<S>,
  notifier: Notifier<S>,
}

impl<S: CampusStore> NotificationListener<S> {
  pub fn new(store: Arc<S>, notifier: Notifier<S>) -> Self { Self { store, notifier } }

  async fn actor_name(&self, user_id: Uuid) -> String {
    match self.store.get_user(user_id).await {
      Ok(Some(user)) => user.display_name,
      Ok(None) => "Someone".into(),
      Err(e) => {
        warn!(user = %user_id, error = %e, "failed to load actor name");
        "Someone".into()
      }
    }
  }

  async fn tell(
    &self,
    recipient: Uuid,
    actor: Uuid,
    kind: NotificationKind,
    content: impl FnOnce(&str) -> String,
    link: String,
  ) {
    if recipient == actor {
      return;
    }
    let name = self.actor_name(actor).await;
    self
      .notifier
      .create_notification(recipient, content(&name), kind, Some(link))
      .await;
  }
}

fn noun(kind: TargetKind) -> &'static str {
  match kind {
    TargetKind::Post => "post",
    TargetKind::Comment => "comment",
    TargetKind::Question => "question",
    TargetKind::Answer => "answer",
    TargetKind::Document => "document",
  }
}

#[async_trait]
impl<S: CampusStore + 'static> Listener for NotificationListener<S> {
  fn name(&self) -> &'static str { "notifications" }

  fn interests(&self) -> &'static [EventKind] {
    &[
      EventKind::CommentAdded,
      EventKind::AnswerPosted,
      EventKind::AnswerAccepted,
      EventKind::LikeAdded,
      EventKind::BookmarkAdded,
    ]
  }

  async fn handle(&self, event: &Event) -> Result<()> {
    match &event.payload {
      EventPayload::CommentAdded { post_id, post_owner_id, user_id, .. } => {
        let link = TargetRef::new(TargetKind::Post, *post_id).link();
        self
          .tell(
            *post_owner_id,
            *user_id,
            NotificationKind::Comment,
            |name| format!("{name} commented on your post"),
            link,
          )
          .await;
      }
      EventPayload::AnswerPosted { question_id, question_author_id, user_id, .. } => {
        let link = TargetRef::new(TargetKind::Question, *question_id).link();
        self
          .tell(
            *question_author_id,
            *user_id,
            NotificationKind::Comment,
            |name| format!("{name} answered your question"),
            link,
          )
          .await;
      }
      EventPayload::AnswerAccepted { question_id, answer_author_id, user_id, .. } => {
        let link = TargetRef::new(TargetKind::Question, *question_id).link();
        self
          .tell(
            *answer_author_id,
            *user_id,
            NotificationKind::System,
            |_| "Your answer was accepted".to_string(),
            link,
          )
          .await;
      }
      EventPayload::LikeAdded { target, target_owner_id, user_id } => {
        self
          .tell(
            *target_owner_id,
            *user_id,
            NotificationKind::Like,
            |name| format!("{name} liked your {}", noun(target.kind)),
            target.link(),
          )
          .await;
      }
      EventPayload::BookmarkAdded { target, target_owner_id, user_id } => {
        self
          .tell(
            *target_owner_id,
            *user_id,
            NotificationKind::Like,
            |name| format!("{name} bookmarked your {}", noun(target.kind)),
            target.link(),
          )
          .await;
      }
      _ => {}
    }
    Ok(())
  }
}
