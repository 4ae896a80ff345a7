//! Backend contract the dispatcher drives.
//!
//! A data source owns storage and querying for one resource type. The core
//! operations are mandatory; listing is split into optional capabilities that
//! a source advertises through [`DataSource::listing`] and
//! [`DataSource::paginated_listing`].

use async_trait::async_trait;
use pagination::Pagination;
use serde_json::{Map, Value};

use super::error::ApiResult;
use super::request::Request;
use super::resource::Resource;

/// Objects returned by a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// A single object.
    One(T),
    /// An ordered collection.
    Many(Vec<T>),
    /// No object.
    Empty,
}

/// Result of a data source operation.
///
/// `status` is the HTTP status the source asks for; the dispatcher checks it
/// against the statuses the operation may legally return.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    /// Returned objects.
    pub payload: Payload<T>,
    /// Metadata merged into the document's top-level `meta`.
    pub meta: Map<String, Value>,
    /// Requested HTTP status.
    pub status: u16,
}

impl<T> Response<T> {
    /// A response with the given status and payload and no metadata.
    pub fn new(status: u16, payload: Payload<T>) -> Self {
        Self {
            payload,
            meta: Map::new(),
            status,
        }
    }

    /// `200 OK` carrying `payload`.
    pub fn ok(payload: Payload<T>) -> Self {
        Self::new(200, payload)
    }

    /// `201 Created` carrying the created object.
    pub fn created(object: T) -> Self {
        Self::new(201, Payload::One(object))
    }

    /// `202 Accepted` without payload.
    pub fn accepted() -> Self {
        Self::new(202, Payload::Empty)
    }

    /// `204 No Content`.
    pub fn no_content() -> Self {
        Self::new(204, Payload::Empty)
    }

    /// Attach one metadata member.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}

/// Mandatory operations of a resource backend.
#[async_trait]
pub trait DataSource<T: Resource>: Send + Sync {
    /// Load a single object.
    async fn find_one(&self, id: &str, request: &Request) -> ApiResult<Response<T>>;

    /// Persist a newly posted object.
    async fn create(&self, object: T, request: &Request) -> ApiResult<Response<T>>;

    /// Persist an object already merged with the request document.
    async fn update(&self, object: T, request: &Request) -> ApiResult<Response<T>>;

    /// Remove an object.
    async fn delete(&self, id: &str, request: &Request) -> ApiResult<Response<T>>;

    /// Unpaginated listing, when supported.
    fn listing(&self) -> Option<&dyn FindAll<T>> {
        None
    }

    /// Paginated listing, when supported.
    fn paginated_listing(&self) -> Option<&dyn PaginatedFindAll<T>> {
        None
    }
}

/// Listing of every object matching a request.
#[async_trait]
pub trait FindAll<T: Resource>: Send + Sync {
    /// List objects; [`Request::linked`] narrows the listing for related
    /// resource lookups.
    async fn find_all(&self, request: &Request) -> ApiResult<Response<T>>;
}

/// Listing of one page of objects.
#[async_trait]
pub trait PaginatedFindAll<T: Resource>: Send + Sync {
    /// List one page and report the total number of matching objects.
    async fn paginated_find_all(
        &self,
        page: Pagination,
        request: &Request,
    ) -> ApiResult<(u64, Response<T>)>;
}
