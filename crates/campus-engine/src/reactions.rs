//! Like and bookmark toggles.

use std::sync::Arc;

use campus_core::{
  Error, Result,
  content::TargetRef,
  event::{Event, EventPayload},
  reaction::{ReactionKey, ReactionKind, ToggleOutcome},
  store::{CampusStore, StoreError as _},
};
use tracing::debug;
use uuid::Uuid;

use crate::{actions::require_user, bus::EventBus};

pub struct Reactions<S> {
  store: Arc<S>,
  bus:   EventBus,
}

impl<S> Clone for Reactions<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), bus: self.bus.clone() }
  }
}

impl<S: CampusStore> Reactions<S> {
  pub fn new(store: Arc<S>, bus: EventBus) -> Self { Self { store, bus } }

  /// Flip the actor's membership on `target` and return the new state.
  ///
  /// Turning a reaction on publishes `LikeAdded`/`BookmarkAdded`; turning it
  /// off publishes nothing. Two concurrent toggles that both see "absent"
  /// settle on one row: the loser's insert conflicts and is reported as
  /// active without a second event.
  pub async fn toggle(
    &self,
    actor_id: Uuid,
    reaction: ReactionKind,
    target: TargetRef,
  ) -> Result<ToggleOutcome> {
    require_user(self.store.as_ref(), actor_id).await?;
    let owner_id = self
      .store
      .target_owner(target)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(target.kind, target.id))?;

    let key = ReactionKey { reaction, actor_id, target };
    let existing = self.store.get_reaction(key).await.map_err(Error::store)?;

    let active = match existing {
      Some(_) => {
        self.store.remove_reaction(key).await.map_err(Error::store)?;
        false
      }
      None => match self.store.add_reaction(key).await {
        Ok(_) => {
          self.announce(key, owner_id).await;
          true
        }
        Err(e) if e.is_conflict() => {
          debug!(actor = %actor_id, target = %target.id, "reaction already present");
          true
        }
        Err(e) => return Err(Error::store(e)),
      },
    };

    let count = self.count(reaction, target).await?;
    debug!(
      actor = %actor_id,
      reaction = reaction.as_ref(),
      target = %target.id,
      active,
      count,
      "reaction toggled"
    );
    Ok(ToggleOutcome { active, count })
  }

  pub async fn is_active(&self, key: ReactionKey) -> Result<bool> {
    Ok(self.store.get_reaction(key).await.map_err(Error::store)?.is_some())
  }

  pub async fn count(&self, reaction: ReactionKind, target: TargetRef) -> Result<u64> {
    self
      .store
      .count_reactions(reaction, target)
      .await
      .map_err(Error::store)
  }

  async fn announce(&self, key: ReactionKey, target_owner_id: Uuid) {
    let payload = match key.reaction {
      ReactionKind::Like => EventPayload::LikeAdded {
        target: key.target,
        target_owner_id,
        user_id: key.actor_id,
      },
      ReactionKind::Bookmark => EventPayload::BookmarkAdded {
        target: key.target,
        target_owner_id,
        user_id: key.actor_id,
      },
    };
    self.bus.publish(Event::new(payload)).await;
  }
}
