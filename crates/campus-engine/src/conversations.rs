//! One conversation per unordered pair of users.

use std::sync::Arc;

use campus_core::{
  Error, Result,
  conversation::Conversation,
  store::{CampusStore, StoreError as _},
};
use tracing::debug;
use uuid::Uuid;

use crate::actions::require_user;

pub struct Conversations<S> {
  store: Arc<S>,
}

impl<S> Clone for Conversations<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: CampusStore> Conversations<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// The conversation between `a` and `b`, created on first use.
  ///
  /// `resolve(a, b)` and `resolve(b, a)` return the same conversation. When
  /// two callers race to create it, the loser reads back the winner's row.
  pub async fn resolve(&self, a: Uuid, b: Uuid) -> Result<Conversation> {
    if a == b {
      return Err(Error::Validation(
        "a conversation needs two different users".into(),
      ));
    }
    for id in [a, b] {
      require_user(self.store.as_ref(), id).await?;
    }

    if let Some(existing) = self.find(a, b).await? {
      return Ok(existing);
    }

    match self.store.add_conversation(a, b).await {
      Ok(created) => {
        debug!(conversation = %created.conversation_id, "conversation created");
        Ok(created)
      }
      Err(e) if e.is_conflict() => {
        debug!(%a, %b, "conversation created concurrently, re-reading");
        self.find(a, b).await?.ok_or_else(|| {
          Error::Conflict(format!("conversation between {a} and {b} vanished"))
        })
      }
      Err(e) => Err(Error::store(e)),
    }
  }

  async fn find(&self, a: Uuid, b: Uuid) -> Result<Option<Conversation>> {
    self.store.find_conversation(a, b).await.map_err(Error::store)
  }
}
