//! API builder and the frozen resource registry.
//!
//! Resources are registered on [`Api`] with a prototype instance and a data
//! source. [`Api::build`] freezes the registration into a [`Registry`], which
//! is shared by every route and mounted with [`Registry::configure`].
//!
//! ```no_run
//! # use jsonapi_server::inbound::http::Api;
//! # use jsonapi_server::outbound::MemorySource;
//! # use jsonapi_server::demo::{Chocolate, User};
//! let mut api = Api::new().with_base_url("http://localhost:31415").with_prefix("v0");
//! api.add_resource(User::default(), MemorySource::<User>::new())?
//!     .add_resource(Chocolate::default(), MemorySource::<Chocolate>::new())?;
//! let registry = api.build();
//! # Ok::<(), jsonapi_server::domain::RegistrationError>(())
//! ```

use std::sync::Arc;

use tracing::info;

use super::codec::{Codec, CodecRegistry};
use super::dispatcher::{EndpointContext, Reply, ResourceDispatcher, ResourceEndpoint};
use crate::config::ApiSettings;
use crate::domain::{
    ApiError, ApiResult, DataSource, ErrorObject, LinkedFilter, RegistrationError, Request,
    Resource, ResourceDescriptor,
};

const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

type EndpointFactory = Box<dyn FnOnce(&EndpointContext) -> Arc<dyn ResourceEndpoint>>;

struct Pending {
    name: String,
    factory: EndpointFactory,
}

/// Mutable registration phase of an API.
pub struct Api {
    base_url: String,
    prefix: String,
    generate_links: bool,
    max_body_bytes: usize,
    codecs: CodecRegistry,
    pending: Vec<Pending>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            prefix: String::new(),
            generate_links: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            codecs: CodecRegistry::new(),
            pending: Vec::new(),
        }
    }
}

impl Api {
    /// An API without prefix, base URL or resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An API configured from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new()
            .with_base_url(settings.base_url())
            .with_prefix(settings.prefix())
            .with_links(settings.generate_links())
            .with_max_body_bytes(settings.max_body_bytes())
    }

    /// Absolute URL used for relationship and pagination links.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Route prefix such as `v1`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Toggle relationship links on resource objects.
    #[must_use]
    pub fn with_links(mut self, enabled: bool) -> Self {
        self.generate_links = enabled;
        self
    }

    /// Largest accepted request body.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Register an additional codec for `content_type`.
    #[must_use]
    pub fn with_codec(mut self, content_type: impl Into<String>, codec: impl Codec + 'static) -> Self {
        self.codecs.insert(content_type, codec);
        self
    }

    /// Register a resource served by `source`.
    ///
    /// # Errors
    /// Fails when the prototype cannot be reflected or a resource of the same
    /// name is already registered.
    pub fn add_resource<T, S>(&mut self, prototype: T, source: S) -> Result<&mut Self, RegistrationError>
    where
        T: Resource,
        S: DataSource<T> + 'static,
    {
        self.add_shared_resource(prototype, Arc::new(source))
    }

    /// Register a resource served by a shared data source.
    ///
    /// # Errors
    /// As [`Api::add_resource`].
    pub fn add_shared_resource<T: Resource>(
        &mut self,
        prototype: T,
        source: Arc<dyn DataSource<T>>,
    ) -> Result<&mut Self, RegistrationError> {
        let descriptor = ResourceDescriptor::reflect(&prototype)?;
        let name = descriptor.name().to_owned();
        if self.pending.iter().any(|pending| pending.name == name) {
            return Err(RegistrationError::DuplicateResource { name });
        }
        let factory: EndpointFactory = Box::new(move |context: &EndpointContext| {
            Arc::new(ResourceDispatcher::new(descriptor, source, context.clone()))
                as Arc<dyn ResourceEndpoint>
        });
        self.pending.push(Pending { name, factory });
        Ok(self)
    }

    /// Freeze the registration.
    #[must_use]
    pub fn build(self) -> Arc<Registry> {
        let context = EndpointContext::new(&self.base_url, &self.prefix, self.generate_links);
        let endpoints: Vec<_> = self
            .pending
            .into_iter()
            .map(|pending| (pending.factory)(&context))
            .collect();
        info!(
            resources = endpoints.len(),
            prefix = %context.prefix(),
            "api registry built"
        );
        Arc::new(Registry {
            context,
            codecs: self.codecs,
            max_body_bytes: self.max_body_bytes,
            endpoints,
        })
    }
}

/// Frozen set of endpoints shared by all routes.
pub struct Registry {
    context: EndpointContext,
    codecs: CodecRegistry,
    max_body_bytes: usize,
    endpoints: Vec<Arc<dyn ResourceEndpoint>>,
}

impl Registry {
    /// Base URL and prefix of the API.
    #[must_use]
    pub fn context(&self) -> &EndpointContext {
        &self.context
    }

    /// Registered codecs.
    #[must_use]
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Largest accepted request body.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Endpoints in registration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Arc<dyn ResourceEndpoint>] {
        &self.endpoints
    }

    /// Endpoint registered under `name`.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&Arc<dyn ResourceEndpoint>> {
        self.endpoints.iter().find(|endpoint| endpoint.name() == name)
    }

    /// List the objects `relation` of `source`/`id` points to.
    ///
    /// The target resource's listing is invoked with a [`LinkedFilter`] so
    /// its data source can narrow the result.
    ///
    /// # Errors
    /// Returns 404 when the relation is unknown or its resource type has no
    /// registered handler, and propagates listing errors.
    pub async fn linked(
        &self,
        source: &dyn ResourceEndpoint,
        id: &str,
        relation: &str,
        request: &Request,
    ) -> ApiResult<Reply> {
        let reference = source
            .descriptor()
            .reference(relation)
            .ok_or_else(|| ApiError::not_found(format!("There is no relation with the name {relation}")))?;
        let Some(target) = self.endpoint(reference.type_name()) else {
            return Err(ApiError::not_found("Not Found").with_error(ErrorObject {
                status: "404".into(),
                title: "Not Found".into(),
                detail: format!(
                    "No resource handler is registered to handle the linked resource {}",
                    reference.name()
                ),
                ..ErrorObject::default()
            }));
        };
        let linked = request
            .clone()
            .with_linked(LinkedFilter::new(source.name(), id, relation));
        target.index(&linked).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{Comment, Post};
    use crate::outbound::MemorySource;
    use rstest::rstest;

    #[rstest]
    fn rejects_duplicate_resource_names() {
        let mut api = Api::new();
        api.add_resource(Post::default(), MemorySource::<Post>::new())
            .expect("first registration");
        let err = api
            .add_resource(Post::default(), MemorySource::<Post>::new())
            .err()
            .expect("duplicate rejected");
        assert!(matches!(err, RegistrationError::DuplicateResource { ref name } if name == "posts"));
    }

    #[rstest]
    fn build_keeps_registration_order() {
        let mut api = Api::new().with_prefix("/v1/");
        api.add_resource(Post::default(), MemorySource::<Post>::new())
            .and_then(|api| api.add_resource(Comment::default(), MemorySource::<Comment>::new()))
            .expect("registrations");
        let registry = api.build();
        let names: Vec<_> = registry.endpoints().iter().map(|endpoint| endpoint.name()).collect();
        assert_eq!(names, ["posts", "comments"]);
        assert_eq!(registry.context().prefix(), "/v1");
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(true), true)]
    #[case(Some(false), false)]
    fn settings_toggle_relationship_links(#[case] generate_links: Option<bool>, #[case] expected: bool) {
        let settings = ApiSettings {
            base_url: None,
            prefix: Some("v1".into()),
            bind_addr: None,
            max_body_bytes: None,
            generate_links,
        };
        let registry = Api::from_settings(&settings).build();
        assert_eq!(registry.context().resource_links().is_some(), expected);
        assert_eq!(registry.context().prefix(), "/v1");
    }

    #[rstest]
    #[actix_rt::test]
    async fn linked_lookup_without_handler_is_not_found() {
        let mut api = Api::new();
        api.add_resource(Post::default(), MemorySource::<Post>::new())
            .expect("registration");
        let registry = api.build();
        let posts = registry.endpoint("posts").expect("posts endpoint");
        let err = registry
            .linked(posts.as_ref(), "1", "author", &Request::new("/posts/1/author", ""))
            .await
            .expect_err("no people handler");
        assert_eq!(err.status(), 404);
        let entry = err.errors().first().expect("error entry");
        assert_eq!(
            entry.detail,
            "No resource handler is registered to handle the linked resource author"
        );
    }
}
