//! In-memory data source used by tests and the demo binary.
//!
//! Objects are kept in identifier order behind a tokio `RwLock`. Created
//! objects without an identifier receive a random UUID. Linked lookups are
//! answered through an optional predicate; without one a linked listing is
//! empty.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::Pagination;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    ApiError, ApiResult, DataSource, FindAll, LinkedFilter, PaginatedFindAll, Payload, Request,
    Resource, Response,
};

/// Decides whether an object belongs to a linked listing.
pub type LinkPredicate<T> = Arc<dyn Fn(&T, &LinkedFilter) -> bool + Send + Sync>;

/// Data source holding every object in memory.
pub struct MemorySource<T: Resource> {
    objects: RwLock<BTreeMap<String, T>>,
    linked: Option<LinkPredicate<T>>,
}

impl<T: Resource> Default for MemorySource<T> {
    fn default() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            linked: None,
        }
    }
}

impl<T: Resource> MemorySource<T> {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A source seeded with `objects`, keyed by their identifiers.
    #[must_use]
    pub fn with_objects(objects: impl IntoIterator<Item = T>) -> Self {
        let objects = objects.into_iter().map(|object| (object.id(), object)).collect();
        Self {
            objects: RwLock::new(objects),
            linked: None,
        }
    }

    /// Answer linked lookups with `predicate`.
    #[must_use]
    pub fn with_link_predicate(
        mut self,
        predicate: impl Fn(&T, &LinkedFilter) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.linked = Some(Arc::new(predicate));
        self
    }

    /// Copy of every stored object in identifier order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.objects.read().await.values().cloned().collect()
    }

    async fn matching(&self, request: &Request) -> Vec<T> {
        let objects = self.objects.read().await;
        match (request.linked(), &self.linked) {
            (None, _) => objects.values().cloned().collect(),
            (Some(filter), Some(predicate)) => objects
                .values()
                .filter(|object| predicate(*object, filter))
                .cloned()
                .collect(),
            (Some(_), None) => Vec::new(),
        }
    }
}

fn missing(id: &str) -> ApiError {
    ApiError::not_found(format!("no object with id {id}"))
}

#[async_trait]
impl<T: Resource> DataSource<T> for MemorySource<T> {
    async fn find_one(&self, id: &str, _request: &Request) -> ApiResult<Response<T>> {
        let objects = self.objects.read().await;
        let object = objects.get(id).cloned().ok_or_else(|| missing(id))?;
        Ok(Response::ok(Payload::One(object)))
    }

    async fn create(&self, mut object: T, _request: &Request) -> ApiResult<Response<T>> {
        if object.id().is_empty() {
            object.set_id(&Uuid::new_v4().to_string())?;
        }
        let id = object.id();
        let mut objects = self.objects.write().await;
        if objects.contains_key(&id) {
            return Err(ApiError::invalid_request(format!("object with id {id} already exists")).with_status(409));
        }
        objects.insert(id.clone(), object.clone());
        debug!(%id, "stored object");
        Ok(Response::created(object))
    }

    async fn update(&self, object: T, _request: &Request) -> ApiResult<Response<T>> {
        let id = object.id();
        let mut objects = self.objects.write().await;
        let stored = objects.get_mut(&id).ok_or_else(|| missing(&id))?;
        *stored = object.clone();
        Ok(Response::ok(Payload::One(object)))
    }

    async fn delete(&self, id: &str, _request: &Request) -> ApiResult<Response<T>> {
        self.objects.write().await.remove(id).ok_or_else(|| missing(id))?;
        Ok(Response::no_content())
    }

    fn listing(&self) -> Option<&dyn FindAll<T>> {
        Some(self)
    }

    fn paginated_listing(&self) -> Option<&dyn PaginatedFindAll<T>> {
        Some(self)
    }
}

#[async_trait]
impl<T: Resource> FindAll<T> for MemorySource<T> {
    async fn find_all(&self, request: &Request) -> ApiResult<Response<T>> {
        Ok(Response::ok(Payload::Many(self.matching(request).await)))
    }
}

#[async_trait]
impl<T: Resource> PaginatedFindAll<T> for MemorySource<T> {
    async fn paginated_find_all(&self, page: Pagination, request: &Request) -> ApiResult<(u64, Response<T>)> {
        let objects = self.matching(request).await;
        let count = u64::try_from(objects.len()).unwrap_or(u64::MAX);
        let start = usize::try_from(page.start()).unwrap_or(usize::MAX);
        let len = usize::try_from(page.len()).unwrap_or(usize::MAX);
        let window = objects.into_iter().skip(start).take(len).collect();
        Ok((count, Response::ok(Payload::Many(window))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{Comment, Post};
    use rstest::{fixture, rstest};

    fn comment(id: &str, post_id: &str) -> Comment {
        Comment {
            id: id.into(),
            text: format!("comment {id}"),
            post_id: Some(post_id.into()),
        }
    }

    #[fixture]
    fn comments() -> MemorySource<Comment> {
        MemorySource::with_objects([comment("1", "a"), comment("2", "b"), comment("3", "a")]).with_link_predicate(
            |comment: &Comment, filter: &LinkedFilter| comment.post_id.as_deref() == Some(filter.source_id.as_str()),
        )
    }

    fn ids(response: &Response<Comment>) -> Vec<String> {
        match &response.payload {
            Payload::Many(objects) => objects.iter().map(|object| object.id.clone()).collect(),
            Payload::One(object) => vec![object.id.clone()],
            Payload::Empty => Vec::new(),
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn creates_with_generated_ids() {
        let source = MemorySource::<Post>::new();
        let response = source
            .create(Post::default(), &Request::default())
            .await
            .expect("created");
        assert_eq!(response.status, 201);
        let stored = source.snapshot().await;
        let id = stored.first().map(|post| post.id.clone()).unwrap_or_default();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[rstest]
    #[actix_rt::test]
    async fn missing_objects_are_not_found() {
        let source = MemorySource::<Post>::new();
        let err = source
            .find_one("404", &Request::default())
            .await
            .expect_err("not stored");
        assert_eq!(err.status(), 404);
        let err = source.delete("404", &Request::default()).await.expect_err("not stored");
        assert_eq!(err.status(), 404);
    }

    #[rstest]
    #[actix_rt::test]
    async fn linked_listing_uses_the_predicate(comments: MemorySource<Comment>) {
        let request = Request::default().with_linked(LinkedFilter::new("posts", "a", "comments"));
        let response = comments.find_all(&request).await.expect("listing");
        assert_eq!(ids(&response), ["1", "3"]);
    }

    #[rstest]
    #[actix_rt::test]
    async fn linked_listing_without_predicate_is_empty() {
        let source = MemorySource::with_objects([comment("1", "a")]);
        let request = Request::default().with_linked(LinkedFilter::new("posts", "a", "comments"));
        let response = source.find_all(&request).await.expect("listing");
        assert!(ids(&response).is_empty());
    }

    #[rstest]
    #[case(Pagination::Numbered { number: 2, size: 2 }, &["3"])]
    #[case(Pagination::Offset { offset: 0, limit: 2 }, &["1", "2"])]
    #[case(Pagination::Offset { offset: 5, limit: 2 }, &[])]
    #[actix_rt::test]
    async fn pages_report_the_total(
        comments: MemorySource<Comment>,
        #[case] page: Pagination,
        #[case] expected: &[&str],
    ) {
        let (count, response) = comments
            .paginated_find_all(page, &Request::default())
            .await
            .expect("page");
        assert_eq!(count, 3);
        assert_eq!(ids(&response), expected);
    }
}
