// friction.rs - Box-shaped trigger that overrides wheel friction
//
// Only the configuration surface lives here. Overlap detection and applying
// friction to vehicles belong to the host's physics.

use super::factory::{DEFAULT_EXTENT, DEFAULT_FRICTION};
use crate::definition::DEFAULT_ROLE_NAME;
use glam::Vec3;
use tripwire_core::{Actor, ActorClass, Episode, TriggerActor};

/// Class identifier the host allocates friction triggers under.
pub const FRICTION_TRIGGER_CLASS: &str = "FrictionTrigger";

#[derive(Debug, Clone, PartialEq)]
pub struct FrictionTrigger {
    class: ActorClass,
    episode: Option<Episode>,
    friction: f32,
    extent: Vec3,
    role_name: String,
}

impl FrictionTrigger {
    pub fn new(class: ActorClass) -> Self {
        Self {
            class,
            episode: None,
            friction: DEFAULT_FRICTION,
            extent: Vec3::splat(DEFAULT_EXTENT),
            role_name: DEFAULT_ROLE_NAME.to_string(),
        }
    }

    /// Constructor in the shape host class tables expect.
    pub fn boxed(class: &ActorClass) -> Box<dyn Actor> {
        Box::new(Self::new(class.clone()))
    }
}

impl Actor for FrictionTrigger {
    fn class(&self) -> &ActorClass {
        &self.class
    }

    fn as_trigger(&self) -> Option<&dyn TriggerActor> {
        Some(self)
    }

    fn as_trigger_mut(&mut self) -> Option<&mut dyn TriggerActor> {
        Some(self)
    }
}

impl TriggerActor for FrictionTrigger {
    fn bind_episode(&mut self, episode: Episode) {
        self.episode = Some(episode);
    }

    fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    fn set_extent(&mut self, extent: Vec3) {
        self.extent = extent;
    }

    fn set_role_name(&mut self, role_name: String) {
        self.role_name = role_name;
    }

    fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    fn friction(&self) -> f32 {
        self.friction
    }

    fn extent(&self) -> Vec3 {
        self.extent
    }

    fn role_name(&self) -> &str {
        &self.role_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_trigger_carries_defaults() {
        let trigger = FrictionTrigger::new(ActorClass::new(FRICTION_TRIGGER_CLASS));
        assert_eq!(trigger.friction(), 3.5);
        assert_eq!(trigger.extent(), Vec3::splat(100.0));
        assert_eq!(trigger.role_name(), "default");
        assert!(trigger.episode().is_none());
    }

    #[test]
    fn boxed_actor_exposes_trigger_capability() {
        let mut actor = FrictionTrigger::boxed(&ActorClass::new(FRICTION_TRIGGER_CLASS));
        actor.as_trigger_mut().unwrap().set_friction(0.5);
        assert_eq!(actor.as_trigger().unwrap().friction(), 0.5);
        assert_eq!(actor.class().as_str(), FRICTION_TRIGGER_CLASS);
    }
}
