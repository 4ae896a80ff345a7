//! Transport-neutral view of an inbound request handed to data sources.

use std::collections::BTreeMap;

use pagination::PageParams;
use url::form_urlencoded;

/// Source of a related-resource lookup such as `GET /posts/1/comments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedFilter {
    /// Resource name of the resource owning the relation.
    pub source_resource: String,
    /// Identifier of the owning resource.
    pub source_id: String,
    /// Relation being followed.
    pub relation: String,
}

impl LinkedFilter {
    /// Construct a filter.
    pub fn new(
        source_resource: impl Into<String>,
        source_id: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source_resource: source_resource.into(),
            source_id: source_id.into(),
            relation: relation.into(),
        }
    }
}

/// Request data visible to data sources.
///
/// Query values are split on commas (`?sort=title,-date` yields two values).
/// Only the first occurrence of a key is kept and pagination keys are left
/// to [`Request::page_params`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    path: String,
    raw_query: String,
    query: BTreeMap<String, Vec<String>>,
    headers: BTreeMap<String, String>,
    linked: Option<LinkedFilter>,
}

impl Request {
    /// Build a request for `path` with the raw, possibly encoded, query.
    pub fn new(path: impl Into<String>, raw_query: impl Into<String>) -> Self {
        let raw_query = raw_query.into();
        let mut query = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(raw_query.as_bytes()) {
            if PageParams::is_page_key(&key) || query.contains_key(&*key) {
                continue;
            }
            let values = value.split(',').map(str::to_owned).collect();
            query.insert(key.into_owned(), values);
        }
        Self {
            path: path.into(),
            raw_query,
            query,
            headers: BTreeMap::new(),
            linked: None,
        }
    }

    /// Attach a header; names are stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Narrow the request to resources related to `filter`.
    #[must_use]
    pub fn with_linked(mut self, filter: LinkedFilter) -> Self {
        self.linked = Some(filter);
        self
    }

    /// Request path as received.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string as received.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// Non-pagination query parameters.
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, Vec<String>> {
        &self.query
    }

    /// Values of one query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&[String]> {
        self.query.get(key).map(Vec::as_slice)
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Related-resource filter, set only for linked lookups.
    #[must_use]
    pub fn linked(&self) -> Option<&LinkedFilter> {
        self.linked.as_ref()
    }

    /// Pagination parameters of the raw query.
    #[must_use]
    pub fn page_params(&self) -> PageParams {
        PageParams::from_query(&self.raw_query)
    }
}
