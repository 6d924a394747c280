//! Up/down votes and accepted answers.

use std::sync::Arc;

use campus_core::{
  Entity, Error, Result,
  content::{ContentKind, TargetRef},
  event::{Event, EventPayload},
  store::CampusStore,
  vote::{Acceptance, VoteKey, VoteOutcome, VoteValue},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{actions::require_user, bus::EventBus};

pub struct Votes<S> {
  store: Arc<S>,
  bus:   EventBus,
}

impl<S> Clone for Votes<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), bus: self.bus.clone() }
  }
}

impl<S: CampusStore> Votes<S> {
  pub fn new(store: Arc<S>, bus: EventBus) -> Self { Self { store, bus } }

  /// Record `actor_id`'s vote on `target`, replacing any earlier vote by the
  /// same actor, and return the target's new score.
  ///
  /// `value` is checked before anything is read or written.
  pub async fn vote(
    &self,
    actor_id: Uuid,
    target: TargetRef,
    value: i64,
  ) -> Result<VoteOutcome> {
    let value = VoteValue::try_from(value)?;
    require_user(self.store.as_ref(), actor_id).await?;

    self
      .store
      .target_owner(target)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(target.kind, target.id))?;

    let key = VoteKey { actor_id, target };
    let previous = self
      .store
      .get_vote(key)
      .await
      .map_err(Error::store)?
      .map(|vote| vote.value);
    self.store.upsert_vote(key, value).await.map_err(Error::store)?;
    let score = self.score(target).await?;

    debug!(actor = %actor_id, target = %target.id, value = value.as_i8(), score, "vote recorded");
    Ok(VoteOutcome { value, previous, score })
  }

  /// Sum of all current votes on `target`.
  pub async fn score(&self, target: TargetRef) -> Result<i64> {
    self.store.score(target).await.map_err(Error::store)
  }

  /// Mark `answer_id` as the accepted answer of `question_id`.
  ///
  /// Only the question's author or an elevated user may accept. Accepting a
  /// different answer later replaces the earlier acceptance.
  pub async fn accept_answer(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
    requester_id: Uuid,
  ) -> Result<Acceptance> {
    let question = self
      .store
      .get_content(question_id)
      .await
      .map_err(Error::store)?
      .filter(|c| c.kind == ContentKind::Question)
      .ok_or_else(|| Error::not_found(Entity::Question, question_id))?;

    let requester = require_user(self.store.as_ref(), requester_id).await?;

    if question.owner_id != requester_id && !requester.role.is_elevated() {
      return Err(Error::Forbidden(format!(
        "user {requester_id} may not accept answers on question {question_id}"
      )));
    }

    let answer = self
      .store
      .get_content(answer_id)
      .await
      .map_err(Error::store)?
      .filter(|c| c.kind == ContentKind::Answer)
      .ok_or_else(|| Error::not_found(Entity::Answer, answer_id))?;

    if answer.parent_id != Some(question_id) {
      return Err(Error::Validation(format!(
        "answer {answer_id} does not belong to question {question_id}"
      )));
    }

    let previous = self
      .store
      .set_accepted_answer(question_id, answer_id)
      .await
      .map_err(Error::store)?;

    let replaced = previous.filter(|prev| *prev != answer_id);
    if let Some(prev) = replaced {
      info!(question = %question_id, from = %prev, to = %answer_id, "accepted answer replaced");
    }

    if previous != Some(answer_id) {
      let payload = EventPayload::AnswerAccepted {
        question_id,
        answer_id,
        answer_author_id: answer.owner_id,
        user_id: requester_id,
      };
      self.bus.publish(Event::new(payload)).await;
    } else {
      debug!(question = %question_id, answer = %answer_id, "answer already accepted");
    }

    Ok(Acceptance { question_id, answer_id, replaced })
  }
}
