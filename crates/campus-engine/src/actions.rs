//! User actions: the primary writes that feed the event bus.
//!
//! Each handler validates its input, performs its write and publishes one
//! event. Listener failures are reported by the bus and never undo the write.

use std::sync::Arc;

use campus_core::{
  Entity, Error, Result,
  content::{Content, ContentKind, NewContent},
  document::{Document, DocumentPayload, NewDocument},
  event::{Event, EventPayload},
  store::CampusStore,
  user::User,
};
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::bus::EventBus;

pub struct Actions<S> {
  store: Arc<S>,
  bus:   EventBus,
}

impl<S> Clone for Actions<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), bus: self.bus.clone() }
  }
}

impl<S: CampusStore> Actions<S> {
  pub fn new(store: Arc<S>, bus: EventBus) -> Self { Self { store, bus } }

  pub async fn create_post(&self, user_id: Uuid, body: impl Into<String>) -> Result<Content> {
    self.author(user_id).await?;
    let post = self.write(ContentKind::Post, user_id, None, body.into()).await?;
    self
      .emit(EventPayload::PostCreated { post_id: post.content_id, user_id })
      .await;
    Ok(post)
  }

  pub async fn add_comment(
    &self,
    user_id: Uuid,
    post_id: Uuid,
    body: impl Into<String>,
  ) -> Result<Content> {
    self.author(user_id).await?;
    let post = self.parent(ContentKind::Post, Entity::Post, post_id).await?;
    let comment = self
      .write(ContentKind::Comment, user_id, Some(post_id), body.into())
      .await?;
    self
      .emit(EventPayload::CommentAdded {
        comment_id: comment.content_id,
        post_id,
        post_owner_id: post.owner_id,
        user_id,
      })
      .await;
    Ok(comment)
  }

  pub async fn ask_question(&self, user_id: Uuid, body: impl Into<String>) -> Result<Content> {
    self.author(user_id).await?;
    let question = self
      .write(ContentKind::Question, user_id, None, body.into())
      .await?;
    self
      .emit(EventPayload::QuestionCreated { question_id: question.content_id, user_id })
      .await;
    Ok(question)
  }

  pub async fn post_answer(
    &self,
    user_id: Uuid,
    question_id: Uuid,
    body: impl Into<String>,
  ) -> Result<Content> {
    self.author(user_id).await?;
    let question = self
      .parent(ContentKind::Question, Entity::Question, question_id)
      .await?;
    let answer = self
      .write(ContentKind::Answer, user_id, Some(question_id), body.into())
      .await?;
    self
      .emit(EventPayload::AnswerPosted {
        answer_id: answer.content_id,
        question_id,
        question_author_id: question.owner_id,
        user_id,
      })
      .await;
    Ok(answer)
  }

  /// Store the first version of a document. It starts `PENDING` at
  /// version 1.
  pub async fn upload_document(
    &self,
    user_id: Uuid,
    payload: DocumentPayload,
  ) -> Result<Document> {
    self.author(user_id).await?;
    let document = self
      .store
      .add_document(NewDocument { owner_id: user_id, payload })
      .await
      .map_err(Error::store)?;
    self
      .emit(EventPayload::DocumentCreated { document_id: document.document_id, user_id })
      .await;
    Ok(document)
  }

  /// Note that `user_id` visited on `day`. Only the first visit of a day
  /// earns points.
  pub async fn record_daily_visit(&self, user_id: Uuid, day: NaiveDate) -> Result<()> {
    self.author(user_id).await?;
    self.emit(EventPayload::DailyVisit { user_id, day }).await;
    Ok(())
  }

  async fn author(&self, user_id: Uuid) -> Result<User> {
    require_user(self.store.as_ref(), user_id).await
  }

  async fn parent(&self, kind: ContentKind, entity: Entity, id: Uuid) -> Result<Content> {
    self
      .store
      .get_content(id)
      .await
      .map_err(Error::store)?
      .filter(|c| c.kind == kind)
      .ok_or_else(|| Error::not_found(entity, id))
  }

  async fn write(
    &self,
    kind: ContentKind,
    owner_id: Uuid,
    parent_id: Option<Uuid>,
    body: String,
  ) -> Result<Content> {
    self
      .store
      .add_content(NewContent { kind, owner_id, parent_id, body })
      .await
      .map_err(Error::store)
  }

  async fn emit(&self, payload: EventPayload) {
    let report = self.bus.publish(Event::new(payload)).await;
    debug!(
      kind = %report.kind,
      delivered = report.delivered,
      failed = report.failed.len(),
      "action published"
    );
  }
}

/// Load `user_id`, or fail with `NotFound` before anything is written on
/// their behalf.
pub(crate) async fn require_user<S: CampusStore>(store: &S, user_id: Uuid) -> Result<User> {
  store
    .get_user(user_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(Entity::User, user_id))
}

#[cfg(test)]
mod tests {
  use campus_core::{store::CampusStore as _, user::ActionKind};

  use super::*;
  use crate::testing::{engine, user};

  #[tokio::test]
  async fn each_action_awards_its_points() {
    let e = engine().await;
    let u = user(&e, "Ada").await;
    let other = user(&e, "Grace").await;

    let post = e.actions.create_post(other.user_id, "hi").await.unwrap();
    e.actions.add_comment(u.user_id, post.content_id, "hello").await.unwrap();
    let q = e.actions.ask_question(u.user_id, "why?").await.unwrap();
    e.actions.post_answer(u.user_id, q.content_id, "because").await.unwrap();

    let stored = e.store().get_user(u.user_id).await.unwrap().unwrap();
    let expected = ActionKind::Reply.points()
      + ActionKind::Question.points()
      + ActionKind::Reply.points();
    assert_eq!(stored.points, expected);
  }

  #[tokio::test]
  async fn unknown_author_writes_nothing() {
    let e = engine().await;
    let err = e.actions.create_post(Uuid::new_v4(), "ghost").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: Entity::User, .. }));
  }

  #[tokio::test]
  async fn comment_on_a_question_is_not_found() {
    let e = engine().await;
    let u = user(&e, "Ada").await;
    let q = e.actions.ask_question(u.user_id, "why?").await.unwrap();

    let err = e.actions.add_comment(u.user_id, q.content_id, "hm").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: Entity::Post, .. }));

    let err = e
      .actions
      .post_answer(u.user_id, Uuid::new_v4(), "lost")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: Entity::Question, .. }));
  }

  #[tokio::test]
  async fn answer_notifies_the_question_author() {
    let e = engine().await;
    let asker = user(&e, "Asker").await;
    let helper = user(&e, "Helper").await;
    let q = e.actions.ask_question(asker.user_id, "why?").await.unwrap();

    e.actions.post_answer(helper.user_id, q.content_id, "because").await.unwrap();

    let listed = e.notifications.list(asker.user_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "Helper answered your question");
    let expected_link = format!("/questions/{}", q.content_id);
    assert_eq!(listed[0].link.as_deref(), Some(expected_link.as_str()));
  }
}
