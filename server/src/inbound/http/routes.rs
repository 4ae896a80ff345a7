//! Route table of a built registry.
//!
//! ```text
//! GET     /{prefix}/{name}                               index
//! POST    /{prefix}/{name}                               create
//! OPTIONS /{prefix}/{name}                               allowed methods
//! GET     /{prefix}/{name}/{id}                          read
//! PATCH   /{prefix}/{name}/{id}                          update
//! DELETE  /{prefix}/{name}/{id}                          delete
//! OPTIONS /{prefix}/{name}/{id}                          allowed methods
//! GET     /{prefix}/{name}/{id}/relationships/{rel}      read relationship
//! PATCH   /{prefix}/{name}/{id}/relationships/{rel}      replace relationship
//! POST    /{prefix}/{name}/{id}/relationships/{rel}      add to-many members
//! DELETE  /{prefix}/{name}/{id}/relationships/{rel}      remove to-many members
//! GET     /{prefix}/{name}/{id}/{rel}                    linked resources
//! ```
//!
//! The incremental to-many routes exist only for plural relations of types
//! that edit to-many relations in place. Any other method on a known path
//! answers `405 Method Not Allowed`.

use std::sync::Arc;

use actix_web::http::{Method, header};
use actix_web::{HttpRequest, HttpResponse, Route, web};
use serde_json::Value;

use super::api::Registry;
use super::dispatcher::{Reply, ResourceEndpoint, ToManyEdit};
use super::error::error_response;
use super::negotiation::Negotiated;
use crate::domain::naming::is_plural;
use crate::domain::{ApiError, ApiResult, Request};

/// Methods allowed on a collection path.
pub const COLLECTION_ALLOW: &str = "GET,POST,PATCH,OPTIONS";
/// Methods allowed on an object path.
pub const OBJECT_ALLOW: &str = "GET,PATCH,DELETE,OPTIONS";

type Body = Result<web::Bytes, actix_web::Error>;

#[derive(Debug, Clone)]
enum Action {
    Index,
    Create,
    Read,
    Update,
    Delete,
    ReadRelationship(String),
    ReplaceRelationship(String),
    EditToMany(String, ToManyEdit),
    Linked(String),
}

#[derive(Clone)]
struct RouteHandler {
    registry: Arc<Registry>,
    endpoint: Arc<dyn ResourceEndpoint>,
    action: Action,
}

impl RouteHandler {
    async fn run(&self, id: &str, request: &Request, negotiated: &Negotiated, body: Body) -> ApiResult<Reply> {
        let endpoint = self.endpoint.as_ref();
        match &self.action {
            Action::Index => endpoint.index(request).await,
            Action::Create => endpoint.create(decode(negotiated, body)?, request).await,
            Action::Read => endpoint.read(id, request).await,
            Action::Update => endpoint.update(id, decode(negotiated, body)?, request).await,
            Action::Delete => endpoint.delete(id, request).await,
            Action::ReadRelationship(relation) => endpoint.read_relationship(id, relation, request).await,
            Action::ReplaceRelationship(relation) => {
                endpoint
                    .replace_relationship(id, relation, decode(negotiated, body)?, request)
                    .await
            }
            Action::EditToMany(relation, edit) => {
                endpoint
                    .edit_to_many(id, relation, *edit, decode(negotiated, body)?, request)
                    .await
            }
            Action::Linked(relation) => self.registry.linked(endpoint, id, relation, request).await,
        }
    }
}

fn decode(negotiated: &Negotiated, body: Body) -> ApiResult<Value> {
    let bytes = body.map_err(ApiError::from)?;
    negotiated.codec.unmarshal(&bytes)
}

fn request_view(req: &HttpRequest) -> Request {
    req.headers()
        .iter()
        .fold(Request::new(req.path(), req.query_string()), |request, (name, value)| {
            match value.to_str() {
                Ok(value) if request.header(name.as_str()).is_none() => request.with_header(name.as_str(), value),
                _ => request,
            }
        })
}

fn negotiate(registry: &Registry, request: &Request) -> Negotiated {
    registry
        .codecs()
        .select(request.header("accept"), request.header("content-type"))
}

fn success_response(negotiated: &Negotiated, reply: &Reply) -> ApiResult<HttpResponse> {
    let mut builder = HttpResponse::build(reply.status());
    builder.insert_header((header::CONTENT_TYPE, negotiated.content_type.as_str()));
    if let Some(location) = reply.location() {
        builder.insert_header((header::LOCATION, location));
    }
    match reply.body() {
        Some(document) => Ok(builder.body(negotiated.codec.marshal(document)?)),
        None => Ok(builder.finish()),
    }
}

async fn dispatch(handler: RouteHandler, req: HttpRequest, body: Body) -> HttpResponse {
    let request = request_view(&req);
    let negotiated = negotiate(&handler.registry, &request);
    let id = req.match_info().get("id").unwrap_or_default();
    let outcome = handler.run(id, &request, &negotiated, body).await;
    match outcome.and_then(|reply| success_response(&negotiated, &reply)) {
        Ok(response) => response,
        Err(err) => error_response(&negotiated, &err),
    }
}

async fn allowed_methods(allow: &'static str) -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ALLOW, allow))
        .finish()
}

async fn method_not_allowed(registry: Arc<Registry>, req: HttpRequest) -> HttpResponse {
    let request = request_view(&req);
    let negotiated = negotiate(&registry, &request);
    let err = ApiError::method_not_allowed(format!("Method {} is not allowed on {}", req.method(), req.path()));
    error_response(&negotiated, &err)
}

impl Registry {
    /// Mount every registered resource onto an actix service config.
    ///
    /// # Examples
    /// ```
    /// use actix_web::App;
    /// use jsonapi_server::inbound::http::Api;
    ///
    /// let registry = Api::new().build();
    /// let _app = App::new().configure(|cfg| registry.configure(cfg));
    /// ```
    pub fn configure(self: &Arc<Self>, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::PayloadConfig::new(self.max_body_bytes()));
        for endpoint in self.endpoints() {
            self.configure_endpoint(cfg, endpoint);
        }
    }

    fn configure_endpoint(self: &Arc<Self>, cfg: &mut web::ServiceConfig, endpoint: &Arc<dyn ResourceEndpoint>) {
        let collection = format!("{}/{}", self.context().prefix(), endpoint.name());
        let object = format!("{collection}/{{id}}");
        let route = |method: Method, action: Action| {
            dispatch_route(
                method,
                RouteHandler {
                    registry: Arc::clone(self),
                    endpoint: Arc::clone(endpoint),
                    action,
                },
            )
        };

        cfg.service(
            web::resource(collection)
                .route(route(Method::GET, Action::Index))
                .route(route(Method::POST, Action::Create))
                .route(web::route().method(Method::OPTIONS).to(|| allowed_methods(COLLECTION_ALLOW)))
                .default_service(self.not_allowed()),
        );
        cfg.service(
            web::resource(object.clone())
                .route(route(Method::GET, Action::Read))
                .route(route(Method::PATCH, Action::Update))
                .route(route(Method::DELETE, Action::Delete))
                .route(web::route().method(Method::OPTIONS).to(|| allowed_methods(OBJECT_ALLOW)))
                .default_service(self.not_allowed()),
        );

        let descriptor = endpoint.descriptor();
        for reference in descriptor.references() {
            let relation = reference.name().to_owned();
            let mut relationship = web::resource(format!("{object}/relationships/{relation}"))
                .route(route(Method::GET, Action::ReadRelationship(relation.clone())))
                .route(route(Method::PATCH, Action::ReplaceRelationship(relation.clone())));
            if descriptor.edits_to_many() && is_plural(&relation) {
                relationship = relationship
                    .route(route(Method::POST, Action::EditToMany(relation.clone(), ToManyEdit::Add)))
                    .route(route(Method::DELETE, Action::EditToMany(relation.clone(), ToManyEdit::Delete)));
            }
            cfg.service(relationship.default_service(self.not_allowed()));
            cfg.service(
                web::resource(format!("{object}/{relation}"))
                    .route(route(Method::GET, Action::Linked(relation)))
                    .default_service(self.not_allowed()),
            );
        }
    }

    fn not_allowed(self: &Arc<Self>) -> Route {
        let registry = Arc::clone(self);
        web::to(move |req: HttpRequest| method_not_allowed(Arc::clone(&registry), req))
    }
}

fn dispatch_route(method: Method, handler: RouteHandler) -> Route {
    web::route()
        .method(method)
        .to(move |req: HttpRequest, body: Body| dispatch(handler.clone(), req, body))
}
