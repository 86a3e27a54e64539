//! Tripwire Actor Factories
//!
//! Attribute-driven factories that advertise what they can build
//! ([`ActorDefinition`]) and instantiate actors from caller-chosen
//! descriptions ([`ActorDescription`]) through the host's deferred
//! construction primitive.

pub mod attribute;
pub mod definition;
pub mod dispatcher;
pub mod factory;
pub mod trigger;

pub use attribute::{resolve, AttributeKind, AttributeValue, FromAttribute, Variations};
pub use definition::{ActorDefinition, ActorDescription, AttributeSpec, DefinitionError};
pub use dispatcher::{ActorDispatcher, DispatchError};
pub use factory::{ActorFactory, SpawnError, SpawnResult};
pub use trigger::{FrictionTrigger, TriggerConfig, TriggerFactory};
