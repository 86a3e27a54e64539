//! The factory contract and spawn outcomes

use crate::definition::{ActorDefinition, ActorDescription};
use thiserror::Error;
use tripwire_core::{ActorClass, EntityHandle, SpawnContext, Transform};

/// Recoverable reasons a spawn produced no actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("no world is available to spawn into")]
    EnvironmentUnavailable,
    #[error("no compatible session with an active episode")]
    SessionUnavailable,
    #[error("host refused to allocate an actor of class '{class}'")]
    AllocationFailed { class: ActorClass },
    #[error("factory '{factory}' cannot build actors of class '{class}'")]
    UnsupportedClass { factory: String, class: ActorClass },
    #[error("allocated actor of class '{class}' does not expose the expected capabilities")]
    ClassMismatch { class: ActorClass },
}

/// Outcome of a spawn. The handle is empty on failure.
///
/// The actor behind the handle belongs to the host's entity registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnResult {
    handle: Option<EntityHandle>,
    error: Option<SpawnError>,
}

impl SpawnResult {
    pub fn spawned(handle: EntityHandle) -> Self {
        Self {
            handle: Some(handle),
            error: None,
        }
    }

    pub fn failed(error: SpawnError) -> Self {
        Self {
            handle: None,
            error: Some(error),
        }
    }

    #[inline]
    pub fn handle(&self) -> Option<EntityHandle> {
        self.handle
    }

    #[inline]
    pub fn error(&self) -> Option<&SpawnError> {
        self.error.as_ref()
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.handle.is_some()
    }
}

impl From<Result<EntityHandle, SpawnError>> for SpawnResult {
    fn from(result: Result<EntityHandle, SpawnError>) -> Self {
        match result {
            Ok(handle) => Self::spawned(handle),
            Err(error) => Self::failed(error),
        }
    }
}

/// A source of spawnable actor kinds.
pub trait ActorFactory {
    /// Name used as the owner of spawned actors and in logs.
    fn name(&self) -> &str;

    /// Everything this factory can build. Fresh values on every call.
    fn definitions(&self) -> Vec<ActorDefinition>;

    /// Build one fully configured actor from `description` at `placement`.
    ///
    /// Never panics on missing collaborators; failures come back as an empty
    /// [`SpawnResult`].
    fn spawn_actor(
        &self,
        context: &mut SpawnContext<'_>,
        placement: &Transform,
        description: &ActorDescription,
    ) -> SpawnResult;
}
