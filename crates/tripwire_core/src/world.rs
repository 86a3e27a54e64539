// world.rs - In-memory reference host with deferred construction
//
// Entities live in generational slots. A slot is Free, Pending (allocated by
// `begin_spawn`, invisible to the simulation) or Live (published by
// `finish_spawn`). Observers only ever learn about an entity through the
// `Published` event, which snapshots its configuration at that instant.

use crate::host::{Actor, ActorClass, CollisionHandling, HostWorld, SpawnRequest, TriggerActor};
use crate::{EntityHandle, EpisodeId, GameSession, SessionContext, Transform};
use glam::Vec3;
use std::collections::{hash_map::Entry, HashMap};
use thiserror::Error;

/// Two placements closer than this overlap for collision handling purposes.
const OVERLAP_TOLERANCE: f32 = 0.01;

type Constructor = Box<dyn Fn(&ActorClass) -> Box<dyn Actor> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("actor class '{class}' is already registered")]
    DuplicateClass { class: ActorClass },
    #[error("entity {handle} is not alive")]
    StaleHandle { handle: EntityHandle },
}

/// Trigger configuration observed at publish time.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSnapshot {
    pub episode: Option<EpisodeId>,
    pub friction: f32,
    pub extent: Vec3,
    pub role_name: String,
}

impl TriggerSnapshot {
    fn of(trigger: &dyn TriggerActor) -> Self {
        Self {
            episode: trigger.episode().map(|e| e.id()),
            friction: trigger.friction(),
            extent: trigger.extent(),
            role_name: trigger.role_name().to_string(),
        }
    }
}

/// Events visible to the rest of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Published {
        handle: EntityHandle,
        class: ActorClass,
        owner: String,
        transform: Transform,
        trigger: Option<TriggerSnapshot>,
    },
    Despawned {
        handle: EntityHandle,
    },
}

struct Occupant {
    actor: Box<dyn Actor>,
    owner: String,
    transform: Transform,
}

enum SlotState {
    Free,
    Pending(Occupant),
    Live(Occupant),
}

struct Slot {
    generation: u32,
    state: SlotState,
}

/// The reference host world.
pub struct SimWorld {
    classes: HashMap<ActorClass, Constructor>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    session: Option<GameSession>,
    events: Vec<WorldEvent>,
    begin_calls: u64,
    finish_calls: u64,
    cancel_calls: u64,
}

impl SimWorld {
    /// Create an empty world with no session.
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            session: None,
            events: Vec::new(),
            begin_calls: 0,
            finish_calls: 0,
            cancel_calls: 0,
        }
    }

    /// Create a world with a running session.
    pub fn with_session(session: GameSession) -> Self {
        let mut world = Self::new();
        world.session = Some(session);
        world
    }

    pub fn set_session(&mut self, session: Option<GameSession>) {
        self.session = session;
    }

    /// Teach the world how to allocate actors of `class`.
    pub fn register_class<F>(&mut self, class: ActorClass, constructor: F) -> Result<(), WorldError>
    where
        F: Fn(&ActorClass) -> Box<dyn Actor> + Send + Sync + 'static,
    {
        match self.classes.entry(class) {
            Entry::Occupied(o) => Err(WorldError::DuplicateClass {
                class: o.key().clone(),
            }),
            Entry::Vacant(v) => {
                v.insert(Box::new(constructor));
                Ok(())
            }
        }
    }

    /// Get a live actor. Pending and stale handles resolve to `None`.
    pub fn get(&self, handle: EntityHandle) -> Option<&dyn Actor> {
        match &self.slot(handle)?.state {
            SlotState::Live(occupant) => Some(occupant.actor.as_ref()),
            _ => None,
        }
    }

    /// Trigger capability of a live actor.
    pub fn trigger(&self, handle: EntityHandle) -> Option<&dyn TriggerActor> {
        self.get(handle)?.as_trigger()
    }

    /// Transform of a live actor.
    pub fn transform(&self, handle: EntityHandle) -> Option<Transform> {
        match &self.slot(handle)?.state {
            SlotState::Live(occupant) => Some(occupant.transform),
            _ => None,
        }
    }

    pub fn is_pending(&self, handle: EntityHandle) -> bool {
        matches!(
            self.slot(handle).map(|s| &s.state),
            Some(SlotState::Pending(_))
        )
    }

    /// Remove a live actor. The slot's generation is bumped so old handles
    /// go stale.
    pub fn despawn(&mut self, handle: EntityHandle) -> Result<(), WorldError> {
        let live = matches!(
            self.slot(handle).map(|s| &s.state),
            Some(SlotState::Live(_))
        );
        if !live {
            return Err(WorldError::StaleHandle { handle });
        }
        self.release(handle.index());
        self.events.push(WorldEvent::Despawned { handle });
        tracing::debug!(%handle, "entity despawned");
        Ok(())
    }

    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Live(_)))
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Pending(_)))
            .count()
    }

    /// Handles of all live actors, in slot order.
    pub fn live_handles(&self) -> Vec<EntityHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.state, SlotState::Live(_)))
            .map(|(i, s)| EntityHandle::new(i as u32, s.generation))
            .collect()
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    pub fn begin_calls(&self) -> u64 {
        self.begin_calls
    }

    pub fn finish_calls(&self) -> u64 {
        self.finish_calls
    }

    pub fn cancel_calls(&self) -> u64 {
        self.cancel_calls
    }

    /// Every `begin_spawn` has been matched by a finish or a cancel.
    pub fn is_balanced(&self) -> bool {
        self.begin_calls == self.finish_calls + self.cancel_calls && self.pending_count() == 0
    }

    fn slot(&self, handle: EntityHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index() as usize)
            .filter(|s| s.generation == handle.generation())
    }

    fn slot_mut(&mut self, handle: EntityHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|s| s.generation == handle.generation())
    }

    fn alloc(&mut self, occupant: Occupant) -> EntityHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.state = SlotState::Pending(occupant);
                EntityHandle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Pending(occupant),
                });
                EntityHandle::new(index, 0)
            }
        }
    }

    fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.state = SlotState::Free;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    fn overlaps_live(&self, location: Vec3) -> bool {
        self.slots.iter().any(|s| match &s.state {
            SlotState::Live(o) => o.transform.location.distance(location) < OVERLAP_TOLERANCE,
            _ => false,
        })
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl HostWorld for SimWorld {
    fn session(&self) -> Option<&dyn SessionContext> {
        self.session.as_ref().map(|s| s as &dyn SessionContext)
    }

    fn begin_spawn(&mut self, request: SpawnRequest<'_>) -> Option<EntityHandle> {
        self.begin_calls += 1;

        let Some(constructor) = self.classes.get(request.class) else {
            tracing::warn!(class = %request.class, "unknown actor class");
            return None;
        };

        if request.collision == CollisionHandling::DontSpawnIfColliding
            && self.overlaps_live(request.placement.location)
        {
            tracing::debug!(class = %request.class, "spawn rejected, placement is occupied");
            return None;
        }

        let actor = constructor(request.class);
        let handle = self.alloc(Occupant {
            actor,
            owner: request.owner.to_string(),
            transform: *request.placement,
        });
        Some(handle)
    }

    fn pending_trigger_mut(&mut self, handle: EntityHandle) -> Option<&mut dyn TriggerActor> {
        match &mut self.slot_mut(handle)?.state {
            SlotState::Pending(occupant) => occupant.actor.as_trigger_mut(),
            _ => None,
        }
    }

    fn finish_spawn(&mut self, handle: Option<EntityHandle>, placement: &Transform) {
        self.finish_calls += 1;

        let Some(handle) = handle else {
            return;
        };
        let Some(slot) = self.slot_mut(handle) else {
            tracing::warn!(%handle, "finish_spawn on stale handle");
            return;
        };

        let occupant = match std::mem::replace(&mut slot.state, SlotState::Free) {
            SlotState::Pending(mut occupant) => {
                occupant.transform = *placement;
                occupant
            }
            other => {
                slot.state = other;
                tracing::warn!(%handle, "finish_spawn on an entity that is not pending");
                return;
            }
        };

        let event = WorldEvent::Published {
            handle,
            class: occupant.actor.class().clone(),
            owner: occupant.owner.clone(),
            transform: occupant.transform,
            trigger: occupant.actor.as_trigger().map(TriggerSnapshot::of),
        };
        slot.state = SlotState::Live(occupant);
        self.events.push(event);
        tracing::debug!(%handle, "entity published");
    }

    fn cancel_spawn(&mut self, handle: EntityHandle) {
        self.cancel_calls += 1;

        if self.is_pending(handle) {
            self.release(handle.index());
            tracing::debug!(%handle, "pending spawn cancelled");
        } else {
            tracing::warn!(%handle, "cancel_spawn on an entity that is not pending");
        }
    }
}
