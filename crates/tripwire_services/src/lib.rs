//! Tripwire Services Layer
//!
//! Settings and the boot helpers the runtime uses to stand up a world.

pub mod settings;

pub use settings::{Settings, SettingsError, SpawnSettings, WorldSettings};

use tripwire_core::{Episode, EpisodeId, GameSession, SimWorld};

/// Build a reference world with a running session as described by `settings`.
pub fn init_world(settings: &WorldSettings) -> SimWorld {
    let episode = Episode::new(EpisodeId(settings.episode_id), settings.map_name.clone());
    tracing::info!(map = %settings.map_name, episode = %episode.id(), "starting episode");
    SimWorld::with_session(GameSession::new(episode))
}
