//! Per-resource verb dispatch.
//!
//! [`ResourceDispatcher`] sequences one resource's data source calls with the
//! document engine and enforces the statuses each operation may report. It is
//! erased behind [`ResourceEndpoint`] so routes and the registry can hold
//! resources of different types side by side.

use std::sync::Arc;

use actix_web::http::StatusCode;
use async_trait::async_trait;
use pagination::RequestTarget;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    ApiError, ApiResult, DataSource, Document, LinkContext, Payload, PrimaryData, Request,
    Resource, ResourceDescriptor, Response, add_to_many, delete_to_many, marshal,
    relationship_entry, unmarshal_new, unmarshal_relationship, unmarshal_update,
};

/// Outcome of a dispatched operation, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: Option<Value>,
    location: Option<String>,
}

impl Reply {
    /// A reply carrying `document`.
    ///
    /// # Errors
    /// Returns an internal error when the document cannot be represented.
    pub fn document(status: StatusCode, document: &Document) -> ApiResult<Self> {
        Ok(Self {
            status,
            body: Some(document.to_value()?),
            location: None,
        })
    }

    /// A reply without body.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: None,
            location: None,
        }
    }

    /// Attach a `Location` header value.
    #[must_use]
    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Document to encode, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// `Location` header value, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// Direction of an incremental to-many edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToManyEdit {
    /// Append identifiers.
    Add,
    /// Remove identifiers.
    Delete,
}

/// Base URL and route prefix shared by every endpoint of an API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointContext {
    base_url: String,
    prefix: String,
    generate_links: bool,
}

impl EndpointContext {
    /// Normalise `base_url` and `prefix`; `prefix` becomes `""` or `/name`.
    #[must_use]
    pub fn new(base_url: &str, prefix: &str, generate_links: bool) -> Self {
        let prefix = prefix.trim_matches('/');
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            prefix: if prefix.is_empty() {
                String::new()
            } else {
                format!("/{prefix}")
            },
            generate_links,
        }
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route prefix, empty or starting with a slash.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Link base regardless of whether resource links are enabled.
    #[must_use]
    pub fn link_context(&self) -> LinkContext {
        LinkContext::new(&self.base_url, &self.prefix)
    }

    /// Link base for resource relationships, when enabled.
    #[must_use]
    pub fn resource_links(&self) -> Option<LinkContext> {
        self.generate_links.then(|| self.link_context())
    }
}

/// Type-erased operations of one registered resource.
#[async_trait]
pub trait ResourceEndpoint: Send + Sync {
    /// Reflection of the served type.
    fn descriptor(&self) -> &ResourceDescriptor;

    /// Resource name.
    fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// `GET /resource`, optionally paginated or narrowed by a linked filter.
    async fn index(&self, request: &Request) -> ApiResult<Reply>;

    /// `GET /resource/:id`.
    async fn read(&self, id: &str, request: &Request) -> ApiResult<Reply>;

    /// `POST /resource`.
    async fn create(&self, document: Value, request: &Request) -> ApiResult<Reply>;

    /// `PATCH /resource/:id`.
    async fn update(&self, id: &str, document: Value, request: &Request) -> ApiResult<Reply>;

    /// `DELETE /resource/:id`.
    async fn delete(&self, id: &str, request: &Request) -> ApiResult<Reply>;

    /// `GET /resource/:id/relationships/:relation`.
    async fn read_relationship(&self, id: &str, relation: &str, request: &Request) -> ApiResult<Reply>;

    /// `PATCH /resource/:id/relationships/:relation`.
    async fn replace_relationship(
        &self,
        id: &str,
        relation: &str,
        document: Value,
        request: &Request,
    ) -> ApiResult<Reply>;

    /// `POST` or `DELETE /resource/:id/relationships/:relation`.
    async fn edit_to_many(
        &self,
        id: &str,
        relation: &str,
        edit: ToManyEdit,
        document: Value,
        request: &Request,
    ) -> ApiResult<Reply>;
}

/// Dispatcher binding a resource type to its data source.
pub struct ResourceDispatcher<T: Resource> {
    descriptor: ResourceDescriptor,
    source: Arc<dyn DataSource<T>>,
    context: EndpointContext,
    links: Option<LinkContext>,
}

impl<T: Resource> ResourceDispatcher<T> {
    /// Bind `source` to the resource described by `descriptor`.
    pub fn new(
        descriptor: ResourceDescriptor,
        source: Arc<dyn DataSource<T>>,
        context: EndpointContext,
    ) -> Self {
        let links = context.resource_links();
        Self {
            descriptor,
            source,
            context,
            links,
        }
    }

    fn violation(&self, method: &str, status: u16) -> ApiError {
        warn!(resource = %self.descriptor.name(), method, status, "data source reported an illegal status");
        ApiError::protocol_violation(format!(
            "invalid status code {status} from resource {} for method {method}",
            self.descriptor.name()
        ))
    }

    fn expect_ok(&self, method: &str, status: u16) -> ApiResult<()> {
        if status == 200 {
            Ok(())
        } else {
            Err(self.violation(method, status))
        }
    }

    fn render(&self, response: &Response<T>) -> ApiResult<Document> {
        marshal(&response.payload, &self.descriptor, &response.meta, self.links.as_ref())
    }

    fn location(&self, object: &T) -> String {
        format!("{}/{}/{}", self.context.prefix(), self.descriptor.name(), object.id())
    }

    fn missing_one(&self) -> ApiError {
        ApiError::internal(format!(
            "Expected FindOne to return one object of resource {}",
            self.descriptor.name()
        ))
    }

    async fn find(&self, id: &str, request: &Request) -> ApiResult<Response<T>> {
        let response = self.source.find_one(id, request).await?;
        self.expect_ok("FindOne", response.status)?;
        Ok(response)
    }

    async fn load(&self, id: &str, request: &Request) -> ApiResult<T> {
        match self.find(id, request).await?.payload {
            Payload::One(object) => Ok(object),
            Payload::Many(_) | Payload::Empty => Err(self.missing_one()),
        }
    }

    fn relationship_document(&self, relation: &str, document: &Value) -> ApiResult<Value> {
        if self.descriptor.reference(relation).is_none() {
            return Err(ApiError::not_found(format!("There is no relation with the name {relation}")));
        }
        document
            .get("data")
            .cloned()
            .ok_or_else(|| ApiError::invalid_request("Invalid object. Need a \"data\" object"))
    }
}

#[async_trait]
impl<T: Resource> ResourceEndpoint for ResourceDispatcher<T> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    async fn index(&self, request: &Request) -> ApiResult<Reply> {
        if let Some(page) = request.page_params().strategy()? {
            let source = self.source.paginated_listing().ok_or_else(|| {
                ApiError::missing_capability("Resource does not implement the PaginatedFindAll interface")
            })?;
            let (count, response) = source.paginated_find_all(page, request).await?;
            self.expect_ok("PaginatedFindAll", response.status)?;
            let mut document = self.render(&response)?;
            let target = RequestTarget::new(self.context.base_url(), request.path(), request.raw_query());
            document.extend_links(page.links(&target, count).into_pairs());
            debug!(resource = %self.descriptor.name(), count, "served paginated listing");
            return Reply::document(StatusCode::OK, &document);
        }
        let source = self.source.listing().ok_or_else(|| {
            ApiError::missing_capability("Resource does not implement the FindAll interface")
        })?;
        let response = source.find_all(request).await?;
        self.expect_ok("FindAll", response.status)?;
        Reply::document(StatusCode::OK, &self.render(&response)?)
    }

    async fn read(&self, id: &str, request: &Request) -> ApiResult<Reply> {
        let response = self.find(id, request).await?;
        Reply::document(StatusCode::OK, &self.render(&response)?)
    }

    async fn create(&self, document: Value, request: &Request) -> ApiResult<Reply> {
        let mut objects: Vec<T> = unmarshal_new(&document, &self.descriptor)?;
        let object = match (objects.pop(), objects.is_empty()) {
            (Some(object), true) => object,
            _ => return Err(ApiError::invalid_request("expected exactly one object in POST")),
        };
        let response = self.source.create(object, request).await?;
        match response.status {
            201 => {
                let Payload::One(created) = &response.payload else {
                    return Err(ApiError::protocol_violation(format!(
                        "Expected one newly created object by resource {}",
                        self.descriptor.name()
                    )));
                };
                let location = self.location(created);
                Ok(Reply::document(StatusCode::CREATED, &self.render(&response)?)?.with_location(location))
            }
            202 => Ok(Reply::empty(StatusCode::ACCEPTED)),
            204 => Ok(Reply::empty(StatusCode::NO_CONTENT)),
            other => Err(self.violation("Create", other)),
        }
    }

    async fn update(&self, id: &str, document: Value, request: &Request) -> ApiResult<Reply> {
        let stored = self.load(id, request).await?;
        let updated = unmarshal_update(&document, &self.descriptor, stored)?;
        if updated.id() != id {
            return Err(ApiError::invalid_request(format!(
                "id {} in the document does not match the URL id {id}",
                updated.id()
            ))
            .with_status(409));
        }
        let mut response = self.source.update(updated, request).await?;
        match response.status {
            200 => {
                if matches!(response.payload, Payload::Empty) {
                    debug!(resource = %self.descriptor.name(), id, "re-reading object after update");
                    response = self.find(id, request).await?;
                    if !matches!(response.payload, Payload::One(_)) {
                        return Err(self.missing_one());
                    }
                }
                Reply::document(StatusCode::OK, &self.render(&response)?)
            }
            202 => Ok(Reply::empty(StatusCode::ACCEPTED)),
            204 => Ok(Reply::empty(StatusCode::NO_CONTENT)),
            other => Err(self.violation("Update", other)),
        }
    }

    async fn delete(&self, id: &str, request: &Request) -> ApiResult<Reply> {
        let response = self.source.delete(id, request).await?;
        match response.status {
            200 => Reply::document(StatusCode::OK, &Document::meta_only(response.meta)),
            202 => Ok(Reply::empty(StatusCode::ACCEPTED)),
            204 => Ok(Reply::empty(StatusCode::NO_CONTENT)),
            other => Err(self.violation("Delete", other)),
        }
    }

    async fn read_relationship(&self, id: &str, relation: &str, request: &Request) -> ApiResult<Reply> {
        let reference = self
            .descriptor
            .reference(relation)
            .ok_or_else(|| ApiError::not_found(format!("There is no relation with the name {relation}")))?;
        let response = self.find(id, request).await?;
        let Payload::One(object) = &response.payload else {
            return Err(self.missing_one());
        };
        let links = self.context.link_context();
        let entry = relationship_entry(object, &self.descriptor, reference, &object.id(), Some(&links));
        let mut document = Document {
            data: Some(PrimaryData::Relationship(entry.data)),
            meta: response.meta.clone(),
            ..Document::default()
        };
        if let Some(links) = entry.links {
            document.extend_links([("self", links.self_link), ("related", links.related)]);
        }
        Reply::document(StatusCode::OK, &document)
    }

    async fn replace_relationship(
        &self,
        id: &str,
        relation: &str,
        document: Value,
        request: &Request,
    ) -> ApiResult<Reply> {
        let data = self.relationship_document(relation, &document)?;
        let mut object = self.load(id, request).await?;
        unmarshal_relationship(&mut object, &self.descriptor, relation, &data)?;
        self.source.update(object, request).await?;
        Ok(Reply::empty(StatusCode::NO_CONTENT))
    }

    async fn edit_to_many(
        &self,
        id: &str,
        relation: &str,
        edit: ToManyEdit,
        document: Value,
        request: &Request,
    ) -> ApiResult<Reply> {
        let data = self.relationship_document(relation, &document)?;
        let mut object = self.load(id, request).await?;
        match edit {
            ToManyEdit::Add => add_to_many(&mut object, relation, &data)?,
            ToManyEdit::Delete => delete_to_many(&mut object, relation, &data)?,
        }
        self.source.update(object, request).await?;
        Ok(Reply::empty(StatusCode::NO_CONTENT))
    }
}
