//! Relationship URLs and linkage application.

use serde_json::Value;

use super::document::RelationshipLinks;
use super::error::{ApiError, ApiResult};
use super::resource::{EditToMany, Resource};

/// Base used to build absolute relationship URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkContext {
    base: String,
}

impl LinkContext {
    /// Combine a base URL and a route prefix.
    ///
    /// Trailing and leading slashes are normalised so that
    /// `("http://api/", "/v1/")` and `("http://api", "v1")` agree.
    ///
    /// # Examples
    /// ```
    /// use jsonapi_server::domain::LinkContext;
    ///
    /// let ctx = LinkContext::new("http://localhost:8080/", "/v1/");
    /// assert_eq!(ctx.base(), "http://localhost:8080/v1");
    /// ```
    #[must_use]
    pub fn new(base_url: &str, prefix: &str) -> Self {
        let mut base = base_url.trim_end_matches('/').to_owned();
        let prefix = prefix.trim_matches('/');
        if !prefix.is_empty() {
            base.push('/');
            base.push_str(prefix);
        }
        Self { base }
    }

    /// Normalised base, without a trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Links for `relation` of the resource `type_name/id`.
    #[must_use]
    pub fn relationship_links(&self, type_name: &str, id: &str, relation: &str) -> RelationshipLinks {
        RelationshipLinks {
            self_link: format!("{}/{type_name}/{id}/relationships/{relation}", self.base),
            related: format!("{}/{type_name}/{id}/{relation}", self.base),
        }
    }
}

/// Extract the identifier of one resource identifier object.
///
/// # Errors
/// Returns an invalid request error when the entry is not an object or has
/// no string `id`.
pub fn linkage_id(entry: &Value) -> ApiResult<String> {
    let Value::Object(object) = entry else {
        return Err(ApiError::invalid_request("entry in data object invalid"));
    };
    match object.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        _ => Err(ApiError::invalid_request("no id field found inside data object")),
    }
}

/// Extract all identifiers of a linkage array.
///
/// Nothing is returned unless every entry is valid.
///
/// # Errors
/// Returns an invalid request error when `data` is not an array or any entry
/// lacks an identifier.
pub fn linkage_ids(data: &Value, action: &str) -> ApiResult<Vec<String>> {
    let Value::Array(entries) = data else {
        return Err(ApiError::invalid_request(format!(
            "Data must be an array with \"id\" and \"type\" field to {action} to-many relationships"
        )));
    };
    entries.iter().map(linkage_id).collect()
}

/// Add the identifiers in `data` to the to-many `relation` of `target`.
///
/// # Errors
/// Fails without touching `target` when the linkage is malformed, and with a
/// missing capability error when the type cannot edit to-many relationships.
pub fn add_to_many<T: Resource>(target: &mut T, relation: &str, data: &Value) -> ApiResult<()> {
    let ids = linkage_ids(data, "add new")?;
    editor(target)?.add_to_many_ids(relation, ids)
}

/// Remove the identifiers in `data` from the to-many `relation` of `target`.
///
/// # Errors
/// Fails without touching `target` when the linkage is malformed, and with a
/// missing capability error when the type cannot edit to-many relationships.
pub fn delete_to_many<T: Resource>(target: &mut T, relation: &str, data: &Value) -> ApiResult<()> {
    let ids = linkage_ids(data, "delete")?;
    editor(target)?.delete_to_many_ids(relation, ids)
}

fn editor<T: Resource>(target: &mut T) -> ApiResult<&mut dyn EditToMany> {
    target
        .to_many_editor()
        .ok_or_else(|| ApiError::missing_capability("target struct must implement the EditToMany interface"))
}
