// factory.rs - Trigger factory
//
// Spawning is two-phase: the actor is allocated through the host's deferred
// primitive, configured while nothing can observe it, then published. The
// `DeferredSpawn` guard balances every allocation with exactly one finish
// (or cancel), whichever path the spawn takes.

use super::friction::{FrictionTrigger, FRICTION_TRIGGER_CLASS};
use crate::attribute::{resolve, Variations};
use crate::definition::{
    ActorDefinition, ActorDescription, AttributeSpec, DEFAULT_ROLE_NAME, ROLE_NAME,
};
use crate::factory::{ActorFactory, SpawnError, SpawnResult};
use glam::Vec3;
use tripwire_core::{
    ActorClass, CollisionHandling, DeferredSpawn, EntityHandle, SimWorld, SpawnContext,
    SpawnRequest, Transform, TriggerActor, WorldError,
};

pub const DEFAULT_FRICTION: f32 = 3.5;
pub const DEFAULT_EXTENT: f32 = 100.0;

const FRICTION: &str = "friction";
const EXTENT_X: &str = "extent_x";
const EXTENT_Y: &str = "extent_y";
const EXTENT_Z: &str = "extent_z";

/// Effective trigger configuration of one description.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerConfig {
    pub role_name: String,
    pub friction: f32,
    pub extent: Vec3,
}

impl TriggerConfig {
    /// Resolve every trigger attribute, defaulting missing or malformed ones.
    pub fn resolve(variations: &Variations) -> Self {
        Self {
            role_name: resolve(ROLE_NAME, variations, DEFAULT_ROLE_NAME.to_string()),
            friction: resolve(FRICTION, variations, DEFAULT_FRICTION),
            extent: Vec3::new(
                resolve(EXTENT_X, variations, DEFAULT_EXTENT),
                resolve(EXTENT_Y, variations, DEFAULT_EXTENT),
                resolve(EXTENT_Z, variations, DEFAULT_EXTENT),
            ),
        }
    }

    pub fn apply(self, trigger: &mut dyn TriggerActor) {
        trigger.set_role_name(self.role_name);
        trigger.set_friction(self.friction);
        trigger.set_extent(self.extent);
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::resolve(&Variations::new())
    }
}

/// Factory for trigger volumes.
pub struct TriggerFactory {
    name: String,
    friction_class: ActorClass,
}

impl TriggerFactory {
    pub fn new() -> Self {
        Self {
            name: "trigger_factory".to_string(),
            friction_class: ActorClass::new(FRICTION_TRIGGER_CLASS),
        }
    }

    /// Register the actor classes this factory spawns with a [`SimWorld`].
    pub fn register_classes(&self, world: &mut SimWorld) -> Result<(), WorldError> {
        world.register_class(self.friction_class.clone(), FrictionTrigger::boxed)
    }

    pub fn supports(&self, class: &ActorClass) -> bool {
        *class == self.friction_class
    }

    fn friction_definition(&self) -> ActorDefinition {
        ActorDefinition::new(self.friction_class.clone(), &["static", "trigger", "friction"])
            .with_attribute(AttributeSpec::float(FRICTION, DEFAULT_FRICTION))
            .with_attribute(AttributeSpec::float(EXTENT_X, DEFAULT_EXTENT))
            .with_attribute(AttributeSpec::float(EXTENT_Y, DEFAULT_EXTENT))
            .with_attribute(AttributeSpec::float(EXTENT_Z, DEFAULT_EXTENT))
    }

    fn try_spawn(
        &self,
        context: &mut SpawnContext<'_>,
        placement: &Transform,
        description: &ActorDescription,
    ) -> Result<EntityHandle, SpawnError> {
        if !self.supports(&description.class) {
            return Err(SpawnError::UnsupportedClass {
                factory: self.name.clone(),
                class: description.class.clone(),
            });
        }

        let world = context.world().ok_or(SpawnError::EnvironmentUnavailable)?;
        let session = world.session().ok_or(SpawnError::SessionUnavailable)?;
        let Some(episode) = session.episode() else {
            debug_assert!(false, "a running session must have an active episode");
            return Err(SpawnError::SessionUnavailable);
        };

        let mut spawn = DeferredSpawn::begin(
            world,
            SpawnRequest {
                class: &description.class,
                placement,
                owner: &self.name,
                collision: CollisionHandling::AlwaysSpawn,
            },
        );
        if spawn.handle().is_none() {
            // dropping the guard finishes the empty allocation
            return Err(SpawnError::AllocationFailed {
                class: description.class.clone(),
            });
        }

        let configured = spawn.configure(|trigger| {
            trigger.bind_episode(episode);
            TriggerConfig::resolve(&description.variations).apply(trigger);
        });
        if !configured {
            spawn.cancel();
            return Err(SpawnError::ClassMismatch {
                class: description.class.clone(),
            });
        }

        spawn.publish().ok_or_else(|| SpawnError::AllocationFailed {
            class: description.class.clone(),
        })
    }
}

impl Default for TriggerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorFactory for TriggerFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn definitions(&self) -> Vec<ActorDefinition> {
        let definition = self.friction_definition();
        if let Err(err) = definition.validate() {
            panic!("built-in trigger definition is invalid: {err}");
        }
        vec![definition]
    }

    fn spawn_actor(
        &self,
        context: &mut SpawnContext<'_>,
        placement: &Transform,
        description: &ActorDescription,
    ) -> SpawnResult {
        let result = self.try_spawn(context, placement, description);
        match &result {
            Ok(handle) => tracing::debug!(
                factory = %self.name,
                %handle,
                class = %description.class,
                "trigger spawned"
            ),
            Err(err) => tracing::error!(
                factory = %self.name,
                class = %description.class,
                "cannot spawn trigger: {err}"
            ),
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeKind, AttributeValue};
    use tripwire_core::{
        Actor, Episode, EpisodeId, GameSession, HostWorld, SessionContext, WorldEvent,
    };

    fn episode() -> Episode {
        Episode::new(EpisodeId(7), "Town03")
    }

    fn world(factory: &TriggerFactory) -> SimWorld {
        let mut world = SimWorld::with_session(GameSession::new(episode()));
        factory.register_classes(&mut world).unwrap();
        world
    }

    fn description(factory: &TriggerFactory) -> ActorDescription {
        ActorDescription::of(&factory.definitions()[0])
    }

    fn placement() -> Transform {
        Transform::from_location(Vec3::new(10.0, -4.0, 0.5))
    }

    #[test]
    fn definitions_are_deterministic() {
        let factory = TriggerFactory::new();
        let first = factory.definitions();
        let second = factory.definitions();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);

        let def = &first[0];
        assert_eq!(def.id, "static.trigger.friction");
        assert_eq!(def.class.as_str(), FRICTION_TRIGGER_CLASS);
        let names: Vec<&str> = def.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["role_name", "friction", "extent_x", "extent_y", "extent_z"]
        );
        let friction = def.attribute("friction").unwrap();
        assert_eq!(friction.kind, AttributeKind::Float);
        assert_eq!(friction.default, AttributeValue::Float(3.5));
        assert_eq!(
            def.attribute("extent_z").unwrap().default,
            AttributeValue::Float(100.0)
        );
    }

    #[test]
    fn missing_world_fails_safely() {
        let factory = TriggerFactory::new();
        let mut context = SpawnContext::detached();
        let result = factory.spawn_actor(&mut context, &placement(), &description(&factory));
        assert_eq!(result.handle(), None);
        assert_eq!(result.error(), Some(&SpawnError::EnvironmentUnavailable));
    }

    #[test]
    fn missing_session_fails_without_allocation() {
        let factory = TriggerFactory::new();
        let mut world = SimWorld::new();
        factory.register_classes(&mut world).unwrap();

        let result = factory.spawn_actor(
            &mut SpawnContext::new(&mut world),
            &placement(),
            &description(&factory),
        );
        assert_eq!(result.error(), Some(&SpawnError::SessionUnavailable));
        assert_eq!(world.begin_calls(), 0);
        assert_eq!(world.live_count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "active episode")]
    fn session_without_episode_is_an_invariant_violation() {
        let factory = TriggerFactory::new();
        let mut world = world(&factory);
        world.set_session(Some(GameSession::without_episode()));
        factory.spawn_actor(
            &mut SpawnContext::new(&mut world),
            &placement(),
            &description(&factory),
        );
    }

    #[test]
    fn unsupported_class_is_rejected_before_allocation() {
        let factory = TriggerFactory::new();
        let mut world = world(&factory);
        let desc = ActorDescription::new("static.prop.cone", ActorClass::new("Cone"));

        let result = factory.spawn_actor(&mut SpawnContext::new(&mut world), &placement(), &desc);
        assert!(matches!(
            result.error(),
            Some(SpawnError::UnsupportedClass { .. })
        ));
        assert_eq!(world.begin_calls(), 0);
    }

    #[test]
    fn successful_spawn_applies_all_attributes() {
        let factory = TriggerFactory::new();
        let mut world = world(&factory);
        let desc = description(&factory)
            .with("friction", "4.2")
            .with("extent_x", "50")
            .with("extent_y", "60")
            .with("extent_z", "70")
            .with("role_name", "puddle");

        let result = factory.spawn_actor(&mut SpawnContext::new(&mut world), &placement(), &desc);
        let handle = result.handle().expect("spawn should succeed");

        let trigger = world.trigger(handle).unwrap();
        assert_eq!(trigger.friction(), 4.2);
        assert_eq!(trigger.extent(), Vec3::new(50.0, 60.0, 70.0));
        assert_eq!(trigger.role_name(), "puddle");
        assert_eq!(trigger.episode().map(|e| e.id()), Some(EpisodeId(7)));
        assert_eq!(world.transform(handle), Some(placement()));

        match world.events() {
            [WorldEvent::Published {
                handle: published,
                owner,
                trigger: Some(snapshot),
                ..
            }] => {
                assert_eq!(*published, handle);
                assert_eq!(owner, "trigger_factory");
                assert_eq!(snapshot.friction, 4.2);
                assert_eq!(snapshot.extent, Vec3::new(50.0, 60.0, 70.0));
                assert_eq!(snapshot.episode, Some(EpisodeId(7)));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn missing_and_malformed_attributes_fall_back_to_defaults() {
        let factory = TriggerFactory::new();
        let mut world = world(&factory);
        let desc = description(&factory)
            .with("friction", "slippery")
            .with("extent_y", 12.0f32)
            .with("unknown_attribute", "ignored");

        let result = factory.spawn_actor(&mut SpawnContext::new(&mut world), &placement(), &desc);
        let trigger = world.trigger(result.handle().unwrap()).unwrap();
        assert_eq!(trigger.friction(), DEFAULT_FRICTION);
        assert_eq!(trigger.extent(), Vec3::new(100.0, 12.0, 100.0));
        assert_eq!(trigger.role_name(), "default");

        assert_eq!(world.begin_calls(), 1);
        assert_eq!(world.finish_calls(), 1);
        assert!(world.is_balanced());
    }

    #[test]
    fn allocation_failure_still_balances_deferred_primitive() {
        let factory = TriggerFactory::new();
        // No classes registered, so the host denies the allocation.
        let mut world = SimWorld::with_session(GameSession::new(episode()));

        let result = factory.spawn_actor(
            &mut SpawnContext::new(&mut world),
            &placement(),
            &description(&factory),
        );
        assert_eq!(result.handle(), None);
        assert!(matches!(
            result.error(),
            Some(SpawnError::AllocationFailed { .. })
        ));
        assert_eq!(world.begin_calls(), 1);
        assert_eq!(world.finish_calls(), 1);
        assert!(world.is_balanced());
        assert!(world.events().is_empty());
    }

    struct Inert(ActorClass);

    impl Actor for Inert {
        fn class(&self) -> &ActorClass {
            &self.0
        }
    }

    #[test]
    fn non_trigger_actor_is_cancelled() {
        let factory = TriggerFactory::new();
        let mut world = SimWorld::with_session(GameSession::new(episode()));
        world
            .register_class(ActorClass::new(FRICTION_TRIGGER_CLASS), |class| {
                Box::new(Inert(class.clone()))
            })
            .unwrap();

        let result = factory.spawn_actor(
            &mut SpawnContext::new(&mut world),
            &placement(),
            &description(&factory),
        );
        assert!(matches!(
            result.error(),
            Some(SpawnError::ClassMismatch { .. })
        ));
        assert_eq!(world.cancel_calls(), 1);
        assert!(world.is_balanced());
        assert_eq!(world.live_count(), 0);
    }

    /// Host that logs the trigger's configuration at each primitive call.
    struct Recorder {
        session: GameSession,
        pending: Option<FrictionTrigger>,
        log: Vec<String>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                session: GameSession::new(episode()),
                pending: None,
                log: Vec::new(),
            }
        }

        fn state(&self) -> String {
            match &self.pending {
                Some(t) => format!("friction={} extent={:?}", t.friction(), t.extent().to_array()),
                None => "empty".to_string(),
            }
        }
    }

    impl HostWorld for Recorder {
        fn session(&self) -> Option<&dyn SessionContext> {
            Some(&self.session as &dyn SessionContext)
        }

        fn begin_spawn(&mut self, request: SpawnRequest<'_>) -> Option<EntityHandle> {
            assert_eq!(request.collision, CollisionHandling::AlwaysSpawn);
            self.pending = Some(FrictionTrigger::new(request.class.clone()));
            self.log.push(format!("begin {}", self.state()));
            Some(EntityHandle::new(3, 0))
        }

        fn pending_trigger_mut(&mut self, _handle: EntityHandle) -> Option<&mut dyn TriggerActor> {
            self.pending.as_mut().map(|t| t as &mut dyn TriggerActor)
        }

        fn finish_spawn(&mut self, handle: Option<EntityHandle>, _placement: &Transform) {
            self.log.push(format!("finish {:?} {}", handle, self.state()));
        }

        fn cancel_spawn(&mut self, _handle: EntityHandle) {
            self.log.push("cancel".to_string());
        }
    }

    #[test]
    fn configuration_happens_between_begin_and_finish() {
        let factory = TriggerFactory::new();
        let mut host = Recorder::new();
        let desc = description(&factory)
            .with("friction", "4.2")
            .with("extent_x", "50")
            .with("extent_y", "60")
            .with("extent_z", "70");

        let result = factory.spawn_actor(&mut SpawnContext::new(&mut host), &placement(), &desc);
        assert_eq!(result.handle(), Some(EntityHandle::new(3, 0)));
        assert_eq!(
            host.log,
            vec![
                "begin friction=3.5 extent=[100.0, 100.0, 100.0]".to_string(),
                "finish Some(EntityHandle { index: 3, generation: 0 }) friction=4.2 extent=[50.0, 60.0, 70.0]"
                    .to_string(),
            ]
        );
    }
}
