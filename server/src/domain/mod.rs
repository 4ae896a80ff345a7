//! Transport-agnostic JSON:API document engine.
//!
//! Purpose: reflect on resource types, convert between resource instances and
//! documents, and define the contract for data sources. Nothing here knows
//! about HTTP; the inbound adapter maps errors to statuses and bytes to
//! documents.
//!
//! Public surface:
//! - [`Resource`] and [`EditToMany`]: capabilities implemented by domain types.
//! - [`ResourceDescriptor`]: reflection cached at registration.
//! - [`marshal`] and [`unmarshal_into`]: the document engine.
//! - [`DataSource`], [`FindAll`] and [`PaginatedFindAll`]: the backend ports.
//! - [`ApiError`]: the error type propagated everywhere.

pub mod descriptor;
pub mod document;
pub mod error;
pub mod linker;
pub mod marshal;
pub mod naming;
pub mod ports;
pub mod request;
pub mod resource;
pub mod trace_id;
pub mod unmarshal;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::descriptor::{RegistrationError, ResourceDescriptor};
pub use self::document::{
    Document, Linkage, PrimaryData, Relationship, RelationshipData, RelationshipLinks,
    ResourceObject,
};
pub use self::error::{ApiError, ApiResult, ErrorCode, ErrorDocument, ErrorObject};
pub use self::linker::{LinkContext, add_to_many, delete_to_many};
pub use self::marshal::{marshal, marshal_resource, relationship_entry};
pub use self::ports::{DataSource, FindAll, PaginatedFindAll, Payload, Response};
pub use self::request::{LinkedFilter, Request};
pub use self::resource::{EditToMany, Reference, ReferenceId, RelationKind, Resource};
pub use self::trace_id::TraceId;
pub use self::unmarshal::{unmarshal_into, unmarshal_new, unmarshal_relationship, unmarshal_update};
