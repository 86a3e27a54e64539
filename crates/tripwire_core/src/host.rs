// host.rs - Contracts between actor factories and the host simulation
//
// Factories never reach for global state. Everything they need from the
// host (world, session, deferred construction) arrives through a
// `SpawnContext` supplied by the caller.

use crate::{EntityHandle, Episode, SessionContext, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a concrete actor class known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorClass(String);

impl ActorClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ActorClass {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// How the host treats a spawn whose placement overlaps existing actors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionHandling {
    /// Never reject a spawn because of an initial overlap.
    #[default]
    AlwaysSpawn,
    /// Reject the spawn when the placement overlaps a live actor.
    DontSpawnIfColliding,
}

/// Arguments of the allocation half of deferred construction.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    pub class: &'a ActorClass,
    pub placement: &'a Transform,
    /// Name of the factory requesting the spawn.
    pub owner: &'a str,
    pub collision: CollisionHandling,
}

/// Capability set of trigger volumes.
///
/// Factories only talk to spawned triggers through this trait, so any actor
/// type that exposes these setters can be built by a trigger factory.
pub trait TriggerActor {
    fn bind_episode(&mut self, episode: Episode);
    fn set_friction(&mut self, friction: f32);
    fn set_extent(&mut self, extent: Vec3);
    fn set_role_name(&mut self, role_name: String);

    fn episode(&self) -> Option<&Episode>;
    fn friction(&self) -> f32;
    fn extent(&self) -> Vec3;
    fn role_name(&self) -> &str;
}

/// Anything the host can allocate and publish.
pub trait Actor: Send {
    fn class(&self) -> &ActorClass;

    fn as_trigger(&self) -> Option<&dyn TriggerActor> {
        None
    }

    fn as_trigger_mut(&mut self) -> Option<&mut dyn TriggerActor> {
        None
    }
}

/// World accessor plus the host's deferred construction primitive.
///
/// Contract: every call to [`begin_spawn`] is balanced by exactly one call to
/// either [`finish_spawn`] (with the handle `begin_spawn` returned, `None`
/// included) or [`cancel_spawn`]. Actors allocated by `begin_spawn` are not
/// visible to the rest of the simulation until `finish_spawn` publishes them.
///
/// [`begin_spawn`]: HostWorld::begin_spawn
/// [`finish_spawn`]: HostWorld::finish_spawn
/// [`cancel_spawn`]: HostWorld::cancel_spawn
pub trait HostWorld {
    /// Session accessor. `None` when no game session is running.
    fn session(&self) -> Option<&dyn SessionContext>;

    /// Allocate an actor of `request.class` without activating it.
    fn begin_spawn(&mut self, request: SpawnRequest<'_>) -> Option<EntityHandle>;

    /// Trigger capability of an allocated, not yet published actor.
    fn pending_trigger_mut(&mut self, handle: EntityHandle) -> Option<&mut dyn TriggerActor>;

    /// Publish a pending actor at `placement`. Finishing `None` (a denied
    /// allocation) must be accepted and do nothing.
    fn finish_spawn(&mut self, handle: Option<EntityHandle>, placement: &Transform);

    /// Discard a pending actor without ever publishing it.
    fn cancel_spawn(&mut self, handle: EntityHandle);
}

/// Explicit ambient context of one spawn call.
pub struct SpawnContext<'a> {
    world: Option<&'a mut dyn HostWorld>,
}

impl<'a> SpawnContext<'a> {
    pub fn new(world: &'a mut dyn HostWorld) -> Self {
        Self { world: Some(world) }
    }

    /// A context with no world attached (e.g. between map loads).
    pub fn detached() -> Self {
        Self { world: None }
    }

    pub fn world(&mut self) -> Option<&mut (dyn HostWorld + 'a)> {
        self.world.as_deref_mut()
    }
}
