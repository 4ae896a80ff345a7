//! Capabilities a Rust type implements to be served as a JSON:API resource.
//!
//! The mandatory surface is identifier access; everything else has a default
//! so plain records need only `id` and `set_id`. Relationship handling is
//! opt-in per capability:
//!
//! - [`Resource::references`] and [`Resource::referenced_ids`] emit
//!   relationships when marshalling.
//! - [`Resource::set_to_one_id`] and [`Resource::set_to_many_ids`] accept
//!   linkage when unmarshalling.
//! - [`EditToMany`] enables incremental to-many edits.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};
use super::naming;

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Zero or one related resource.
    ToOne,
    /// Any number of related resources.
    ToMany,
}

/// Declared relationship of a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    type_name: String,
    name: String,
    kind: RelationKind,
}

impl Reference {
    /// Declare a relationship, inferring cardinality from the name.
    ///
    /// Plural names (`comments`) are to-many, singular names (`author`) are
    /// to-one.
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = if naming::is_plural(&name) {
            RelationKind::ToMany
        } else {
            RelationKind::ToOne
        };
        Self {
            type_name: type_name.into(),
            name,
            kind,
        }
    }

    /// Declare a to-one relationship regardless of the name's plurality.
    pub fn to_one(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            kind: RelationKind::ToOne,
        }
    }

    /// Declare a to-many relationship regardless of the name's plurality.
    pub fn to_many(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            kind: RelationKind::ToMany,
        }
    }

    /// Resource name of the related type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Relation name as it appears in documents and URLs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relationship cardinality.
    #[must_use]
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Whether the relationship is to-many.
    #[must_use]
    pub fn is_to_many(&self) -> bool {
        self.kind == RelationKind::ToMany
    }
}

/// One related identifier reported by a resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceId {
    /// Resource name of the related type.
    pub type_name: String,
    /// Relation the identifier belongs to.
    pub name: String,
    /// Identifier of the related resource.
    pub id: String,
}

impl ReferenceId {
    /// Construct a reference identifier.
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            id: id.into(),
        }
    }
}

/// A serialisable record served as a JSON:API resource.
///
/// The serialised fields of an instance become its attributes, except the
/// `id` key and anything listed in [`Resource::hidden_fields`].
///
/// # Examples
/// ```
/// use jsonapi_server::domain::{ApiResult, Resource};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Post {
///     #[serde(default)]
///     id: String,
///     title: String,
/// }
///
/// impl Resource for Post {
///     fn id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn set_id(&mut self, id: &str) -> ApiResult<()> {
///         self.id = id.to_owned();
///         Ok(())
///     }
/// }
/// ```
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier of this instance.
    fn id(&self) -> String;

    /// Assign the identifier parsed from a request.
    ///
    /// # Errors
    /// Returns an error when `id` is not acceptable for this type.
    fn set_id(&mut self, id: &str) -> ApiResult<()>;

    /// Explicit resource name overriding the derived one.
    fn resource_name() -> Option<&'static str> {
        None
    }

    /// Serialised keys that are not exposed as attributes.
    ///
    /// Use this for storage of relationship identifiers.
    fn hidden_fields() -> &'static [&'static str] {
        &[]
    }

    /// Relationships declared by this type.
    fn references() -> Vec<Reference> {
        Vec::new()
    }

    /// Related identifiers of this instance, grouped by relation name.
    fn referenced_ids(&self) -> Vec<ReferenceId> {
        Vec::new()
    }

    /// Set or clear a to-one relationship.
    ///
    /// # Errors
    /// The default rejects every relation.
    fn set_to_one_id(&mut self, name: &str, _id: Option<String>) -> ApiResult<()> {
        Err(unsupported_relation::<Self>(name))
    }

    /// Replace a to-many relationship.
    ///
    /// # Errors
    /// The default rejects every relation.
    fn set_to_many_ids(&mut self, name: &str, _ids: Vec<String>) -> ApiResult<()> {
        Err(unsupported_relation::<Self>(name))
    }

    /// Access incremental to-many editing when the type supports it.
    fn to_many_editor(&mut self) -> Option<&mut dyn EditToMany> {
        None
    }
}

/// Incremental editing of to-many relationships.
pub trait EditToMany {
    /// Add identifiers to a to-many relationship.
    ///
    /// # Errors
    /// Returns an error when the relation cannot be edited.
    fn add_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()>;

    /// Remove identifiers from a to-many relationship.
    ///
    /// # Errors
    /// Returns an error when the relation cannot be edited.
    fn delete_to_many_ids(&mut self, name: &str, ids: Vec<String>) -> ApiResult<()>;
}

fn unsupported_relation<T: ?Sized>(name: &str) -> ApiError {
    ApiError::invalid_request(format!(
        "{} does not accept linkage for the relationship {name}",
        naming::short_type_name(std::any::type_name::<T>())
    ))
}
