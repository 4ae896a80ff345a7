//! Per-type metadata computed once at registration.
//!
//! A [`ResourceDescriptor`] records the resource name, the attribute layout
//! observed on a prototype instance, the declared relationships and the
//! optional capabilities of the type. Marshalling and unmarshalling consult
//! it instead of inspecting the type on every request.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;

use super::naming;
use super::resource::{Reference, Resource};

/// Key holding the resource identifier; never treated as an attribute.
pub const ID_KEY: &str = "id";

/// Errors raised while registering a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The prototype did not serialise to a JSON object.
    #[error("resource type {type_label} must serialise to a record, found {found}")]
    NotARecord {
        /// Short Rust type name.
        type_label: String,
        /// JSON kind the prototype produced.
        found: &'static str,
    },
    /// The prototype could not be serialised at all.
    #[error("failed to serialise prototype of {type_label}: {message}")]
    Prototype {
        /// Short Rust type name.
        type_label: String,
        /// Serializer error message.
        message: String,
    },
    /// The type declares the same relation name twice.
    #[error("relationship {name} is declared twice on {type_label}")]
    DuplicateRelationship {
        /// Short Rust type name.
        type_label: String,
        /// Relation name.
        name: String,
    },
    /// The resolved resource name is empty.
    #[error("resource type {type_label} resolves to an empty name")]
    EmptyName {
        /// Short Rust type name.
        type_label: String,
    },
    /// Another resource already uses the same name.
    #[error("resource name {name} is already registered")]
    DuplicateResource {
        /// Resource name.
        name: String,
    },
}

/// Cached reflection of a resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    name: String,
    type_label: String,
    attributes: Vec<String>,
    hidden: BTreeSet<String>,
    references: Vec<Reference>,
    template: Map<String, Value>,
    edits_to_many: bool,
}

impl ResourceDescriptor {
    /// Reflect on `T` using `prototype` as the template for new instances.
    ///
    /// # Errors
    /// Returns [`RegistrationError`] when the prototype is not a record, the
    /// name is empty, or a relation name is declared twice.
    ///
    /// # Examples
    /// ```
    /// use jsonapi_server::domain::{ApiResult, Resource, ResourceDescriptor};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Clone, Default, Serialize, Deserialize)]
    /// struct BlogPost { id: String, title: String }
    ///
    /// impl Resource for BlogPost {
    ///     fn id(&self) -> String { self.id.clone() }
    ///     fn set_id(&mut self, id: &str) -> ApiResult<()> { self.id = id.into(); Ok(()) }
    /// }
    ///
    /// let descriptor = ResourceDescriptor::reflect(&BlogPost::default()).expect("blog posts register");
    /// assert_eq!(descriptor.name(), "blogPosts");
    /// assert_eq!(descriptor.attributes(), ["title"]);
    /// ```
    pub fn reflect<T: Resource>(prototype: &T) -> Result<Self, RegistrationError> {
        let type_label = naming::short_type_name(std::any::type_name::<T>()).to_owned();
        let value = serde_json::to_value(prototype).map_err(|err| RegistrationError::Prototype {
            type_label: type_label.clone(),
            message: err.to_string(),
        })?;
        let template = match value {
            Value::Object(map) => map,
            other => {
                return Err(RegistrationError::NotARecord {
                    type_label,
                    found: json_kind(&other),
                });
            }
        };

        let name = T::resource_name()
            .map_or_else(|| naming::resource_name_for(std::any::type_name::<T>()), str::to_owned);
        if name.is_empty() {
            return Err(RegistrationError::EmptyName { type_label });
        }

        let references = T::references();
        let mut seen = BTreeSet::new();
        for reference in &references {
            if !seen.insert(reference.name()) {
                return Err(RegistrationError::DuplicateRelationship {
                    type_label,
                    name: reference.name().to_owned(),
                });
            }
        }

        let hidden: BTreeSet<String> = T::hidden_fields().iter().map(|key| (*key).to_owned()).collect();
        let attributes = template
            .keys()
            .filter(|key| key.as_str() != ID_KEY && !hidden.contains(key.as_str()))
            .cloned()
            .collect();
        let edits_to_many = prototype.clone().to_many_editor().is_some();

        Ok(Self {
            name,
            type_label,
            attributes,
            hidden,
            references,
            template,
            edits_to_many,
        })
    }

    /// Resource name used as the document `type` and the route segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short Rust type name, for diagnostics.
    #[must_use]
    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    /// Attribute keys observed on the prototype.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Whether `key` may appear in the `attributes` member.
    ///
    /// Keys absent from the prototype, such as skipped optional fields, are
    /// still attributes unless they are the identifier or hidden.
    #[must_use]
    pub fn is_attribute(&self, key: &str) -> bool {
        key != ID_KEY && !self.hidden.contains(key)
    }

    /// Declared relationships in declaration order.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Look up a declared relationship by name.
    #[must_use]
    pub fn reference(&self, name: &str) -> Option<&Reference> {
        self.references.iter().find(|reference| reference.name() == name)
    }

    /// Serialised prototype used as the base of newly created instances.
    #[must_use]
    pub fn template(&self) -> &Map<String, Value> {
        &self.template
    }

    /// Whether the type supports incremental to-many edits.
    #[must_use]
    pub fn edits_to_many(&self) -> bool {
        self.edits_to_many
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
