//! Points, levels and level-up notifications.

use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{
  Error, Result,
  event::{Event, EventKind, EventPayload},
  notification::NotificationKind,
  store::CampusStore,
  user::{ActionKind, AwardOutcome, PointAward},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{bus::Listener, notifications::Notifier};

/// Converts qualifying actions into points and announces level-ups.
pub struct Gamification<S> {
  store:        Arc<S>,
  notifier:     Notifier<S>,
  profile_link: String,
}

impl<S> Clone for Gamification<S> {
  fn clone(&self) -> Self {
    Self {
      store:        self.store.clone(),
      notifier:     self.notifier.clone(),
      profile_link: self.profile_link.clone(),
    }
  }
}

impl<S: CampusStore> Gamification<S> {
  pub fn new(store: Arc<S>, notifier: Notifier<S>, profile_link: impl Into<String>) -> Self {
    Self { store, notifier, profile_link: profile_link.into() }
  }

  /// Award the fixed points of `action` to `user_id`.
  ///
  /// `subject_key` names what the action was about; an award for a
  /// `(user, action, subject)` that was already applied changes nothing. A
  /// user that no longer exists is skipped without error. If the new point
  /// total crosses into a higher level, a level-up notification is created
  /// after the points are persisted.
  pub async fn award_points(
    &self,
    user_id: Uuid,
    action: ActionKind,
    subject_key: impl Into<String>,
  ) -> Result<AwardOutcome> {
    let award = PointAward { user_id, action, subject_key: subject_key.into() };
    let outcome = self
      .store
      .apply_award(award)
      .await
      .map_err(Error::store)?;

    match outcome {
      AwardOutcome::UserNotFound => {
        debug!(user = %user_id, action = action.as_ref(), "award skipped: no such user");
      }
      AwardOutcome::AlreadyAwarded => {
        debug!(user = %user_id, action = action.as_ref(), "award skipped: already applied");
      }
      AwardOutcome::Applied { after, .. } => {
        debug!(user = %user_id, action = action.as_ref(), points = after.points, "points awarded");
      }
    }

    if let Some(level) = outcome.level_up() {
      info!(user = %user_id, level, "level up");
      self
        .notifier
        .create_notification(
          user_id,
          format!("Congratulations! You reached level {level}."),
          NotificationKind::System,
          Some(format!("{}{user_id}", self.profile_link)),
        )
        .await;
    }

    Ok(outcome)
  }
}

// ─── Listener ────────────────────────────────────────────────────────────────

/// The action an event earns points for, if any.
pub fn action_for(payload: &EventPayload) -> Option<ActionKind> {
  match payload {
    EventPayload::PostCreated { .. } => Some(ActionKind::Post),
    EventPayload::CommentAdded { .. } | EventPayload::AnswerPosted { .. } => {
      Some(ActionKind::Reply)
    }
    EventPayload::DocumentCreated { .. } => Some(ActionKind::Upload),
    EventPayload::QuestionCreated { .. } => Some(ActionKind::Question),
    EventPayload::DailyVisit { .. } => Some(ActionKind::DailyVisit),
    EventPayload::AnswerAccepted { .. }
    | EventPayload::LikeAdded { .. }
    | EventPayload::BookmarkAdded { .. } => None,
  }
}

/// Awards points to the actor of every qualifying event.
pub struct GamificationListener<S> {
  gamification: Gamification<S>,
}

impl<S> GamificationListener<S> {
  pub fn new(gamification: Gamification<S>) -> Self { Self { gamification } }
}

#[async_trait]
impl<S: CampusStore + 'static> Listener for GamificationListener<S> {
  fn name(&self) -> &'static str { "gamification" }

  fn interests(&self) -> &'static [EventKind] {
    &[
      EventKind::PostCreated,
      EventKind::CommentAdded,
      EventKind::AnswerPosted,
      EventKind::DocumentCreated,
      EventKind::QuestionCreated,
      EventKind::DailyVisit,
    ]
  }

  async fn handle(&self, event: &Event) -> Result<()> {
    let Some(action) = action_for(&event.payload) else {
      return Ok(());
    };
    self
      .gamification
      .award_points(event.payload.actor_id(), action, event.payload.subject_key())
      .await?;
    Ok(())
  }
}
