//! Tripwire Core
//!
//! Contains the host-side simulation contracts the actor factories build on:
//! - Placement math (rigid transforms)
//! - Generational entity handles
//! - Episode and session context
//! - The deferred (two-phase) construction primitive and its scoped guard
//! - An in-memory reference host world

pub mod deferred;
pub mod entity;
pub mod episode;
pub mod host;
pub mod math;
pub mod world;

pub use glam;

pub use deferred::{DeferredSpawn, SpawnPhase};
pub use entity::EntityHandle;
pub use episode::{Episode, EpisodeId, GameSession, SessionContext};
pub use host::{
    Actor, ActorClass, CollisionHandling, HostWorld, SpawnContext, SpawnRequest, TriggerActor,
};
pub use math::Transform;
pub use world::{SimWorld, TriggerSnapshot, WorldError, WorldEvent};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
