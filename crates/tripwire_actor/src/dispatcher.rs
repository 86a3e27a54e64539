//! Factory binding and spawn routing
//!
//! Definitions are indexed by id for describing actors; spawns are routed by
//! class to the first factory that advertised it.

use crate::attribute::{AttributeKind, AttributeValue, Variations};
use crate::definition::{ActorDefinition, ActorDescription, DefinitionError};
use crate::factory::{ActorFactory, SpawnError, SpawnResult};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tripwire_core::{ActorClass, SpawnContext, Transform};

/// Errors raised while binding factories or building descriptions.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("definition '{id}' is already bound")]
    DuplicateDefinition { id: String },

    #[error(transparent)]
    InvalidDefinition(#[from] DefinitionError),

    #[error("no definition named '{id}'")]
    UnknownDefinition { id: String },

    #[error("definition '{id}' has no attribute '{name}'")]
    UnknownAttribute { id: String, name: String },

    #[error("value '{value}' of attribute '{name}' is not a valid {kind}")]
    InvalidValue {
        name: String,
        value: String,
        kind: AttributeKind,
    },

    #[error("attribute '{name}' of '{id}' must be supplied")]
    MissingAttribute { id: String, name: String },
}

/// Binds factories to the definitions they advertise and routes spawns.
pub struct ActorDispatcher {
    factories: Vec<Box<dyn ActorFactory>>,
    definitions: Vec<ActorDefinition>,
    id_lookup: HashMap<String, usize>,
    class_lookup: HashMap<ActorClass, usize>,
}

impl ActorDispatcher {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            definitions: Vec::new(),
            id_lookup: HashMap::new(),
            class_lookup: HashMap::new(),
        }
    }

    /// Register every definition of `factory`.
    ///
    /// Either all definitions are bound or none are. Returns how many were
    /// bound.
    pub fn bind<F>(&mut self, factory: F) -> Result<usize, DispatchError>
    where
        F: ActorFactory + 'static,
    {
        let definitions = factory.definitions();

        let mut incoming = HashSet::new();
        for definition in &definitions {
            definition.validate()?;
            let id = definition.id.as_str();
            if self.id_lookup.contains_key(id) || !incoming.insert(id) {
                return Err(DispatchError::DuplicateDefinition { id: id.to_string() });
            }
        }

        let factory_index = self.factories.len();
        let count = definitions.len();
        for definition in definitions {
            tracing::debug!(
                factory = factory.name(),
                definition = %definition.id,
                "definition bound"
            );
            self.id_lookup
                .insert(definition.id.clone(), self.definitions.len());
            self.class_lookup
                .entry(definition.class.clone())
                .or_insert(factory_index);
            self.definitions.push(definition);
        }
        self.factories.push(Box::new(factory));
        Ok(count)
    }

    /// All bound definitions, in binding order.
    pub fn definitions(&self) -> impl Iterator<Item = &ActorDefinition> {
        self.definitions.iter()
    }

    pub fn definition(&self, id: &str) -> Option<&ActorDefinition> {
        self.id_lookup
            .get(id)
            .map(|&index| &self.definitions[index])
    }

    /// Definitions carrying every tag in `tags`.
    pub fn filter_by_tags<'a>(
        &'a self,
        tags: &'a [&'a str],
    ) -> impl Iterator<Item = &'a ActorDefinition> + 'a {
        self.definitions()
            .filter(move |definition| tags.iter().all(|tag| definition.has_tag(tag)))
    }

    /// Build a description of definition `id` from caller-chosen values.
    ///
    /// Each value is checked against its attribute's kind and stored in
    /// that kind. Attributes not supplied get their defaults.
    pub fn describe<I, K, V>(&self, id: &str, attributes: I) -> Result<ActorDescription, DispatchError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        let definition = self
            .definition(id)
            .ok_or_else(|| DispatchError::UnknownDefinition { id: id.to_string() })?;

        let mut variations = Variations::new();
        for (name, value) in attributes {
            let name = name.into();
            let value = value.into();
            let Some(spec) = definition.attribute(&name) else {
                return Err(DispatchError::UnknownAttribute {
                    id: id.to_string(),
                    name,
                });
            };
            let Some(coerced) = value.coerce(spec.kind) else {
                return Err(DispatchError::InvalidValue {
                    name,
                    value: value.to_string(),
                    kind: spec.kind,
                });
            };
            variations.insert(name, coerced);
        }

        for spec in &definition.attributes {
            if variations.contains_key(&spec.name) {
                continue;
            }
            if spec.required {
                return Err(DispatchError::MissingAttribute {
                    id: id.to_string(),
                    name: spec.name.clone(),
                });
            }
            variations.insert(spec.name.clone(), spec.default.clone());
        }

        Ok(ActorDescription {
            id: definition.id.clone(),
            class: definition.class.clone(),
            variations,
        })
    }

    /// Spawn through the factory owning `description.class`.
    pub fn spawn(
        &self,
        context: &mut SpawnContext<'_>,
        placement: &Transform,
        description: &ActorDescription,
    ) -> SpawnResult {
        match self.class_lookup.get(&description.class) {
            Some(&factory) => self.factories[factory].spawn_actor(context, placement, description),
            None => {
                let error = SpawnError::UnsupportedClass {
                    factory: "actor_dispatcher".to_string(),
                    class: description.class.clone(),
                };
                tracing::error!(definition = %description.id, "cannot dispatch spawn: {error}");
                SpawnResult::failed(error)
            }
        }
    }
}

impl Default for ActorDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
