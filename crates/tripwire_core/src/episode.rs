//! Episode and session context
//!
//! A session is the host's per-run game state. While a simulation is running
//! it carries exactly one active episode, which newly created actors are
//! bound to.

use std::fmt;

/// Identifier of a simulation episode (one run of a map).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeId(pub u64);

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "episode#{}", self.0)
    }
}

/// The currently running simulation episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    id: EpisodeId,
    map_name: String,
}

impl Episode {
    pub fn new(id: EpisodeId, map_name: impl Into<String>) -> Self {
        Self {
            id,
            map_name: map_name.into(),
        }
    }

    pub fn id(&self) -> EpisodeId {
        self.id
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }
}

/// Session accessor consumed by factories.
///
/// A session that exists must yield an episode; `None` from [`episode`]
/// on a live session is an invariant violation on the host side.
///
/// [`episode`]: SessionContext::episode
pub trait SessionContext {
    fn episode(&self) -> Option<Episode>;
}

/// Plain session holding an optional active episode.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    episode: Option<Episode>,
}

impl GameSession {
    pub fn new(episode: Episode) -> Self {
        Self {
            episode: Some(episode),
        }
    }

    /// A session with no episode. Only useful for exercising the invariant
    /// check in factories.
    pub fn without_episode() -> Self {
        Self { episode: None }
    }
}

impl SessionContext for GameSession {
    fn episode(&self) -> Option<Episode> {
        self.episode.clone()
    }
}
