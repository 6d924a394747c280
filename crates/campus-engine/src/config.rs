//! Engine configuration, deserialised from the `[engine]` table of the
//! binary's config file.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// How many notifications `list` returns.
  pub notification_limit:     usize,
  /// How often a version upload is retried after losing a version race.
  pub version_retry_attempts: u32,
  /// Prefix of the profile deep link in level-up notifications.
  pub profile_link_prefix:    String,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      notification_limit:     20,
      version_retry_attempts: 3,
      profile_link_prefix:    "/profile/".into(),
    }
  }
}
