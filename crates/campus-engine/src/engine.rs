//! Wiring of the bus, the services and the built-in listeners.

use std::sync::Arc;

use campus_core::store::CampusStore;
use tracing::debug;

use crate::{
  EngineConfig,
  actions::Actions,
  bus::EventBus,
  conversations::Conversations,
  gamification::{Gamification, GamificationListener},
  lifecycle::Lifecycle,
  notifications::{NotificationListener, Notifier},
  reactions::Reactions,
  votes::Votes,
};

/// The assembled engine over one store.
pub struct Engine<S> {
  pub bus:           EventBus,
  pub actions:       Actions<S>,
  pub notifications: Notifier<S>,
  pub gamification:  Gamification<S>,
  pub reactions:     Reactions<S>,
  pub votes:         Votes<S>,
  pub lifecycle:     Lifecycle<S>,
  pub conversations: Conversations<S>,
  store:             Arc<S>,
}

impl<S: CampusStore + 'static> Engine<S> {
  /// Build every service over `store` and subscribe the gamification and
  /// notification listeners.
  pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
    let bus = EventBus::new();
    let notifications = Notifier::new(store.clone(), config.notification_limit);
    let gamification = Gamification::new(
      store.clone(),
      notifications.clone(),
      config.profile_link_prefix.clone(),
    );

    bus.subscribe(Arc::new(GamificationListener::new(gamification.clone())));
    bus.subscribe(Arc::new(NotificationListener::new(
      store.clone(),
      notifications.clone(),
    )));
    debug!(listeners = bus.listener_count(), "engine assembled");

    Self {
      actions: Actions::new(store.clone(), bus.clone()),
      reactions: Reactions::new(store.clone(), bus.clone()),
      votes: Votes::new(store.clone(), bus.clone()),
      lifecycle: Lifecycle::new(store.clone(), config.version_retry_attempts),
      conversations: Conversations::new(store.clone()),
      notifications,
      gamification,
      bus,
      store,
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }
}
