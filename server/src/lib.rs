//! JSON:API resource server library.
//!
//! [`domain`] holds the transport-agnostic document engine and the data
//! source ports, [`inbound::http`] serves registered resources on actix-web
//! and [`outbound`] provides an in-memory data source.

pub mod config;
pub mod demo;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use config::ApiSettings;
pub use inbound::http::{Api, Registry};
pub use middleware::Trace;
