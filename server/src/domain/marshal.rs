//! Conversion of resource instances into JSON:API documents.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::descriptor::ResourceDescriptor;
use super::document::{
    Document, Linkage, PrimaryData, Relationship, RelationshipData, ResourceObject,
};
use super::error::{ApiError, ApiResult};
use super::linker::LinkContext;
use super::ports::Payload;
use super::resource::{Reference, RelationKind, Resource};

/// Marshal one instance into a resource object.
///
/// Every declared relationship is emitted, empty ones included. Links are
/// attached when `links` is given.
///
/// # Errors
/// Returns an internal error when the instance no longer serialises to a
/// record.
pub fn marshal_resource<T: Resource>(
    object: &T,
    descriptor: &ResourceDescriptor,
    links: Option<&LinkContext>,
) -> ApiResult<ResourceObject> {
    let value = serde_json::to_value(object).map_err(|err| {
        ApiError::internal(format!("failed to serialise {}: {err}", descriptor.name()))
    })?;
    let Value::Object(fields) = value else {
        return Err(ApiError::internal(format!(
            "{} did not serialise to a record",
            descriptor.type_label()
        )));
    };
    let attributes: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| descriptor.is_attribute(key))
        .collect();

    let id = object.id();
    let relationships = descriptor
        .references()
        .iter()
        .map(|reference| {
            let relationship = relationship_entry(object, descriptor, reference, &id, links);
            (reference.name().to_owned(), relationship)
        })
        .collect::<BTreeMap<_, _>>();

    Ok(ResourceObject {
        id,
        type_name: descriptor.name().to_owned(),
        attributes,
        relationships,
    })
}

/// Build the relationship member for `reference` of `object`.
#[must_use]
pub fn relationship_entry<T: Resource>(
    object: &T,
    descriptor: &ResourceDescriptor,
    reference: &Reference,
    id: &str,
    links: Option<&LinkContext>,
) -> Relationship {
    let linkages = object
        .referenced_ids()
        .into_iter()
        .filter(|referenced| referenced.name == reference.name())
        .map(|referenced| Linkage {
            type_name: referenced.type_name,
            id: referenced.id,
        });
    let data = match reference.kind() {
        RelationKind::ToOne => RelationshipData::ToOne(linkages.into_iter().next()),
        RelationKind::ToMany => RelationshipData::ToMany(linkages.collect()),
    };
    Relationship {
        data,
        links: links.map(|ctx| ctx.relationship_links(descriptor.name(), id, reference.name())),
    }
}

/// Marshal a data source payload into a document.
///
/// `meta` is merged into the document's top-level metadata.
///
/// # Errors
/// Propagates errors from [`marshal_resource`].
pub fn marshal<T: Resource>(
    payload: &Payload<T>,
    descriptor: &ResourceDescriptor,
    meta: &Map<String, Value>,
    links: Option<&LinkContext>,
) -> ApiResult<Document> {
    let data = match payload {
        Payload::One(object) => {
            PrimaryData::Resource(Box::new(marshal_resource(object, descriptor, links)?))
        }
        Payload::Many(objects) => PrimaryData::Collection(
            objects
                .iter()
                .map(|object| marshal_resource(object, descriptor, links))
                .collect::<ApiResult<_>>()?,
        ),
        Payload::Empty => PrimaryData::Null,
    };
    let mut document = Document {
        data: Some(data),
        ..Document::default()
    };
    document.merge_meta(meta);
    Ok(document)
}
