//! Wire model of JSON:API documents produced by the marshaller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ApiError, ApiResult};

/// Resource identifier object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkage {
    /// Resource name of the related resource.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Identifier of the related resource.
    pub id: String,
}

/// Linkage carried by a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    /// A single identifier, or `null` when empty.
    ToOne(Option<Linkage>),
    /// An array of identifiers, possibly empty.
    ToMany(Vec<Linkage>),
}

/// URLs describing a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipLinks {
    /// The relationship endpoint.
    #[serde(rename = "self")]
    pub self_link: String,
    /// The related resource endpoint.
    pub related: String,
}

/// Relationship member of a resource object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Resource linkage.
    pub data: RelationshipData,
    /// Relationship links, when link generation is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
}

/// A resource object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    /// Resource identifier.
    pub id: String,
    /// Resource name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Attribute members.
    pub attributes: Map<String, Value>,
    /// Relationship members keyed by relation name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

/// Primary data of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// A single resource.
    Resource(Box<ResourceObject>),
    /// A resource collection.
    Collection(Vec<ResourceObject>),
    /// Relationship linkage.
    Relationship(RelationshipData),
    /// An explicitly empty single resource.
    Null,
}

/// Top-level JSON:API document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Primary data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    /// Top-level metadata.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    /// Top-level links.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

impl Document {
    /// A document carrying only metadata.
    #[must_use]
    pub fn meta_only(meta: Map<String, Value>) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    /// Merge `meta` into the top-level metadata; later keys win.
    pub fn merge_meta(&mut self, meta: &Map<String, Value>) {
        for (key, value) in meta {
            self.meta.insert(key.clone(), value.clone());
        }
    }

    /// Add top-level links.
    pub fn extend_links<K: Into<String>>(&mut self, links: impl IntoIterator<Item = (K, String)>) {
        self.links
            .extend(links.into_iter().map(|(name, url)| (name.into(), url)));
    }

    /// Convert to a JSON value for encoding.
    ///
    /// # Errors
    /// Returns an internal error if an attribute value cannot be represented.
    pub fn to_value(&self) -> ApiResult<Value> {
        serde_json::to_value(self)
            .map_err(|err| ApiError::internal(format!("failed to build document: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn empty_to_one_renders_null() {
        let relationship = Relationship {
            data: RelationshipData::ToOne(None),
            links: None,
        };
        let value = serde_json::to_value(relationship).expect("serialise relationship");
        assert_eq!(value, json!({ "data": null }));
    }

    #[rstest]
    fn meta_only_document_has_no_data() {
        let mut meta = Map::new();
        meta.insert("deleted".into(), json!(true));
        let value = Document::meta_only(meta).to_value().expect("document value");
        assert_eq!(value, json!({ "meta": { "deleted": true } }));
    }

    #[rstest]
    fn null_primary_data_is_kept() {
        let document = Document {
            data: Some(PrimaryData::Null),
            ..Document::default()
        };
        assert_eq!(document.to_value().expect("document value"), json!({ "data": null }));
    }
}
