//! Actor definitions and descriptions
//!
//! A definition advertises a spawnable actor kind and the attributes it
//! accepts. A description is one concrete choice of values for a spawn.

use crate::attribute::{AttributeKind, AttributeValue, Variations};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tripwire_core::ActorClass;

/// Attribute every definition carries, used to tag spawned actors.
pub const ROLE_NAME: &str = "role_name";
pub const DEFAULT_ROLE_NAME: &str = "default";

#[derive(Debug, Error, PartialEq)]
pub enum DefinitionError {
    #[error("definition id is empty")]
    EmptyId,
    #[error("definition id '{id}' contains invalid characters")]
    InvalidId { id: String },
    #[error("tag '{tag}' of '{id}' contains invalid characters")]
    InvalidTag { id: String, tag: String },
    #[error("attribute name '{name}' of '{id}' is invalid")]
    InvalidAttributeName { id: String, name: String },
    #[error("attribute '{name}' is declared more than once in '{id}'")]
    DuplicateAttribute { id: String, name: String },
    #[error("default of attribute '{name}' in '{id}' is a {found}, expected {expected}")]
    DefaultKindMismatch {
        id: String,
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
}

/// One configurable attribute of a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: AttributeKind,
    pub default: AttributeValue,
    #[serde(default)]
    pub required: bool,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, default: impl Into<AttributeValue>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            kind: default.kind(),
            default,
            required: false,
        }
    }

    pub fn float(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, default)
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::String(default.into()))
    }

    /// Mark the attribute as one a description must supply explicitly.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A spawnable actor kind and its accepted attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDefinition {
    /// Dotted identifier, e.g. `static.trigger.friction`.
    pub id: String,
    /// Comma separated tags, e.g. `static,trigger,friction`.
    pub tags: String,
    pub class: ActorClass,
    pub attributes: Vec<AttributeSpec>,
}

impl ActorDefinition {
    /// Build a definition whose id and tags are derived from `parts`.
    ///
    /// Every definition starts with the `role_name` attribute.
    pub fn new(class: ActorClass, parts: &[&str]) -> Self {
        let parts: Vec<String> = parts.iter().map(|p| p.to_lowercase()).collect();
        Self {
            id: parts.join("."),
            tags: parts.join(","),
            class,
            attributes: vec![AttributeSpec::string(ROLE_NAME, DEFAULT_ROLE_NAME)],
        }
    }

    pub fn with_attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').filter(|t| !t.is_empty())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }

    /// Check identifier syntax, attribute uniqueness and default kinds.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.id.is_empty() {
            return Err(DefinitionError::EmptyId);
        }
        if !self.id.split('.').all(is_valid_word) {
            return Err(DefinitionError::InvalidId {
                id: self.id.clone(),
            });
        }
        for tag in self.tags.split(',') {
            if !is_valid_word(tag) {
                return Err(DefinitionError::InvalidTag {
                    id: self.id.clone(),
                    tag: tag.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !is_valid_word(&attribute.name) {
                return Err(DefinitionError::InvalidAttributeName {
                    id: self.id.clone(),
                    name: attribute.name.clone(),
                });
            }
            if !seen.insert(attribute.name.as_str()) {
                return Err(DefinitionError::DuplicateAttribute {
                    id: self.id.clone(),
                    name: attribute.name.clone(),
                });
            }
            if attribute.default.kind() != attribute.kind {
                return Err(DefinitionError::DefaultKindMismatch {
                    id: self.id.clone(),
                    name: attribute.name.clone(),
                    expected: attribute.kind,
                    found: attribute.default.kind(),
                });
            }
        }
        Ok(())
    }
}

/// Lowercase ascii letters, digits, `_` and `-`; not empty.
fn is_valid_word(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// The values chosen for one spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDescription {
    /// Id of the definition this description was made from.
    pub id: String,
    pub class: ActorClass,
    #[serde(default)]
    pub variations: Variations,
}

impl ActorDescription {
    pub fn new(id: impl Into<String>, class: ActorClass) -> Self {
        Self {
            id: id.into(),
            class,
            variations: Variations::new(),
        }
    }

    /// Description of `definition` with no variations (all defaults).
    pub fn of(definition: &ActorDefinition) -> Self {
        Self::new(definition.id.clone(), definition.class.clone())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.variations.insert(name.into(), value.into());
        self
    }
}
