//! HTTP inbound adapter serving registered resources over actix-web.

pub mod api;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod negotiation;
pub mod routes;

pub use api::{Api, Registry};
pub use codec::{Codec, CodecRegistry, DEFAULT_CONTENT_TYPE, JsonCodec};
pub use dispatcher::{EndpointContext, Reply, ResourceDispatcher, ResourceEndpoint, ToManyEdit};
pub use negotiation::{Negotiated, negotiate_content_type};
