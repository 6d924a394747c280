//! In-process publish/subscribe dispatcher for domain events.
//!
//! # Guarantees
//!
//! - **Awaited dispatch**: `publish` returns once every interested listener
//!   has finished. Listeners of one event run concurrently.
//! - **Isolation**: a listener that returns an error or panics is logged and
//!   counted; the publisher and the other listeners are unaffected.
//! - **In-memory only**: events are not persisted. A crash between the
//!   primary write and listener completion loses the side effects.
//!
//! Listeners must tolerate redelivery; the gamification listener does so by
//! keying each award on the event's subject.

use std::{
  panic::AssertUnwindSafe,
  sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use campus_core::{
  Result,
  event::{Event, EventKind},
};
use futures::{FutureExt as _, future::join_all};
use tracing::{debug, warn};

/// A consumer of domain events.
#[async_trait]
pub trait Listener: Send + Sync {
  /// Unique name, used for logging and [`EventBus::unsubscribe`].
  fn name(&self) -> &'static str;

  /// The event kinds this listener is invoked for.
  fn interests(&self) -> &'static [EventKind];

  /// Apply this listener's side effects for `event`, in order.
  async fn handle(&self, event: &Event) -> Result<()>;
}

/// What happened during one `publish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
  pub kind:      EventKind,
  /// Listeners that completed successfully.
  pub delivered: usize,
  /// Names of listeners that returned an error or panicked.
  pub failed:    Vec<&'static str>,
}

/// Type-erased event bus.
///
/// Cloning is cheap; clones share the same listener registry.
#[derive(Clone, Default)]
pub struct EventBus {
  listeners: Arc<RwLock<Vec<Arc<dyn Listener>>>>,
}

impl EventBus {
  pub fn new() -> Self { Self::default() }

  /// Register a listener. A listener with the same name is replaced.
  pub fn subscribe(&self, listener: Arc<dyn Listener>) {
    let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
    listeners.retain(|l| l.name() != listener.name());
    debug!(listener = listener.name(), "listener subscribed");
    listeners.push(listener);
  }

  /// Remove the listener called `name`. Returns whether one was registered.
  pub fn unsubscribe(&self, name: &str) -> bool {
    let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
    let before = listeners.len();
    listeners.retain(|l| l.name() != name);
    before != listeners.len()
  }

  /// Returns the number of registered listeners.
  pub fn listener_count(&self) -> usize {
    self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// Hand `event` to every listener interested in its kind and wait for all
  /// of them.
  pub async fn publish(&self, event: Event) -> DispatchReport {
    let kind = event.kind();

    // Snapshot so the lock is not held across awaits.
    let targets: Vec<Arc<dyn Listener>> = self
      .listeners
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .filter(|l| l.interests().contains(&kind))
      .cloned()
      .collect();

    let event = &event;
    let outcomes = join_all(targets.iter().map(|listener| async move {
      let outcome = AssertUnwindSafe(listener.handle(event)).catch_unwind().await;
      (listener.name(), outcome)
    }))
    .await;

    let mut report = DispatchReport { kind, delivered: 0, failed: Vec::new() };
    for (name, outcome) in outcomes {
      match outcome {
        Ok(Ok(())) => report.delivered += 1,
        Ok(Err(e)) => {
          warn!(listener = name, %kind, event_id = %event.event_id, error = %e, "listener failed");
          report.failed.push(name);
        }
        Err(_) => {
          warn!(listener = name, %kind, event_id = %event.event_id, "listener panicked");
          report.failed.push(name);
        }
      }
    }

    debug!(%kind, delivered = report.delivered, failed = report.failed.len(), "event dispatched");
    report
  }
}

impl std::fmt::Debug for EventBus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EventBus")
      .field("listener_count", &self.listener_count())
      .finish()
  }
}
