//! Conversion of request documents into resource instances.
//!
//! Attributes are merged onto a base record: the stored instance for updates
//! or the registration template for new resources. Members the document does
//! not mention keep their base values, and unknown attributes are ignored by
//! the deserializer.

use serde_json::{Map, Value};

use super::descriptor::{ID_KEY, ResourceDescriptor};
use super::error::{ApiError, ApiResult};
use super::linker::linkage_id;
use super::resource::{RelationKind, Resource};

/// Parse every resource object of `document`, merging onto `targets` in order.
///
/// Objects beyond the supplied targets start from the template.
///
/// # Errors
/// Returns an invalid request error when `data` is missing or malformed, or
/// when attributes do not fit the type.
pub fn unmarshal_into<T: Resource>(
    document: &Value,
    descriptor: &ResourceDescriptor,
    targets: Vec<T>,
) -> ApiResult<Vec<T>> {
    let data = document
        .get("data")
        .ok_or_else(|| ApiError::invalid_request("Invalid object. Need a \"data\" object"))?;
    let objects: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![data],
        _ => {
            return Err(ApiError::invalid_request(
                "data must contain an object or an array of objects",
            ));
        }
    };
    let mut targets = targets.into_iter();
    objects
        .into_iter()
        .map(|object| merge_resource(object, descriptor, targets.next()))
        .collect()
}

/// Parse the resources of a creation request.
///
/// # Errors
/// See [`unmarshal_into`].
pub fn unmarshal_new<T: Resource>(document: &Value, descriptor: &ResourceDescriptor) -> ApiResult<Vec<T>> {
    unmarshal_into(document, descriptor, Vec::new())
}

/// Merge an update request onto the stored instance.
///
/// The document must carry a single resource object with `id` and `type`.
///
/// # Errors
/// Returns a forbidden error when a mandatory member is missing, and the
/// errors of [`unmarshal_into`] otherwise.
pub fn unmarshal_update<T: Resource>(
    document: &Value,
    descriptor: &ResourceDescriptor,
    stored: T,
) -> ApiResult<T> {
    let data = document
        .get("data")
        .ok_or_else(|| ApiError::forbidden("missing mandatory data key."))?;
    let Value::Object(object) = data else {
        return Err(ApiError::forbidden("data must contain an object."));
    };
    if !object.contains_key(ID_KEY) {
        return Err(ApiError::forbidden("missing mandatory id key."));
    }
    if !object.contains_key("type") {
        return Err(ApiError::forbidden("missing mandatory type key."));
    }
    merge_resource(data, descriptor, Some(stored))
}

/// Apply relationship linkage to `target`.
///
/// `null` clears a to-one relationship, an object sets it and an array
/// replaces a to-many relationship.
///
/// # Errors
/// Returns not found for undeclared relations, invalid request when the
/// linkage shape does not match the declared cardinality, and whatever the
/// resource's setter reports.
pub fn unmarshal_relationship<T: Resource>(
    target: &mut T,
    descriptor: &ResourceDescriptor,
    relation: &str,
    linkage: &Value,
) -> ApiResult<()> {
    let reference = descriptor
        .reference(relation)
        .ok_or_else(|| ApiError::not_found(format!("There is no relation with the name {relation}")))?;
    match (reference.kind(), linkage) {
        (RelationKind::ToOne, Value::Null) => target.set_to_one_id(relation, None),
        (RelationKind::ToOne, Value::Object(_)) => {
            target.set_to_one_id(relation, Some(linkage_id(linkage)?))
        }
        (RelationKind::ToMany, Value::Array(entries)) => {
            let ids = entries.iter().map(linkage_id).collect::<ApiResult<Vec<_>>>()?;
            target.set_to_many_ids(relation, ids)
        }
        (RelationKind::ToOne, _) => Err(ApiError::invalid_request(format!(
            "relationship {relation} expects an object or null"
        ))),
        (RelationKind::ToMany, _) => Err(ApiError::invalid_request(format!(
            "relationship {relation} expects an array"
        ))),
    }
}

fn merge_resource<T: Resource>(
    raw: &Value,
    descriptor: &ResourceDescriptor,
    base: Option<T>,
) -> ApiResult<T> {
    let Value::Object(object) = raw else {
        return Err(ApiError::invalid_request("resource object must be a JSON object"));
    };
    if let Some(kind) = object.get("type") {
        if kind.as_str() != Some(descriptor.name()) {
            return Err(ApiError::invalid_request(format!(
                "type {kind} does not match resource {}",
                descriptor.name()
            ))
            .with_status(409));
        }
    }

    let mut fields = match base {
        Some(stored) => record_of(&stored, descriptor)?,
        None => descriptor.template().clone(),
    };
    match object.get("attributes") {
        None => {}
        Some(Value::Object(attributes)) => {
            for (key, value) in attributes {
                if descriptor.is_attribute(key) {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        Some(_) => return Err(ApiError::invalid_request("attributes must be an object")),
    }

    let mut target: T = serde_json::from_value(Value::Object(fields)).map_err(|err| {
        ApiError::invalid_request(format!("invalid attributes for {}: {err}", descriptor.name()))
    })?;

    match object.get(ID_KEY) {
        None => {}
        Some(Value::String(id)) => target.set_id(id)?,
        Some(_) => return Err(ApiError::invalid_request("id must be a string")),
    }

    match object.get("relationships") {
        None => {}
        Some(Value::Object(relationships)) => {
            for (name, relationship) in relationships {
                if descriptor.reference(name).is_none() {
                    continue;
                }
                let linkage = relationship.get("data").ok_or_else(|| {
                    ApiError::invalid_request(format!("relationship {name} needs a \"data\" member"))
                })?;
                unmarshal_relationship(&mut target, descriptor, name, linkage)?;
            }
        }
        Some(_) => return Err(ApiError::invalid_request("relationships must be an object")),
    }
    Ok(target)
}

fn record_of<T: Resource>(object: &T, descriptor: &ResourceDescriptor) -> ApiResult<Map<String, Value>> {
    match serde_json::to_value(object) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::internal(format!(
            "{} did not serialise to a record",
            descriptor.type_label()
        ))),
        Err(err) => Err(ApiError::internal(format!(
            "failed to serialise {}: {err}",
            descriptor.name()
        ))),
    }
}
