//! Trigger volumes and the factory that spawns them

mod factory;
mod friction;

pub use factory::{TriggerConfig, TriggerFactory, DEFAULT_EXTENT, DEFAULT_FRICTION};
pub use friction::{FrictionTrigger, FRICTION_TRIGGER_CLASS};
