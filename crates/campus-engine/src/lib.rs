//! The campus reputation & content-lifecycle engine.
//!
//! Action handlers ([`actions::Actions`]) perform a primary write and publish
//! a domain event on the [`bus::EventBus`]. Listeners registered on the bus
//! ([`gamification::GamificationListener`],
//! [`notifications::NotificationListener`]) turn those events into points,
//! levels and notifications. Reactions and votes are called directly because
//! their callers need the resulting state back.
//!
//! Everything is generic over a [`campus_core::store::CampusStore`] backend.
//! [`Engine`] wires the pieces together.

pub mod actions;
pub mod bus;
pub mod config;
pub mod conversations;
pub mod engine;
pub mod gamification;
pub mod lifecycle;
pub mod notifications;
pub mod reactions;
pub mod votes;

pub use config::EngineConfig;
pub use engine::Engine;

#[cfg(test)]
mod testing;
