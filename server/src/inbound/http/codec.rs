//! Wire codecs keyed by media type.
//!
//! A codec turns documents into bytes and back. The registry always holds the
//! JSON:API media type bound to [`JsonCodec`]; further media types may be
//! registered when the API is built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::domain::{ApiError, ApiResult};

/// Media type served when negotiation selects nothing better.
pub const DEFAULT_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Encoder and decoder for one media type.
pub trait Codec: Send + Sync + fmt::Debug {
    /// Encode a document.
    ///
    /// # Errors
    /// Returns an internal error when the document cannot be encoded.
    fn marshal(&self, document: &Value) -> ApiResult<Vec<u8>>;

    /// Decode a request body.
    ///
    /// # Errors
    /// Returns an invalid request error for malformed bodies.
    fn unmarshal(&self, body: &[u8]) -> ApiResult<Value>;

    /// Encode the `errors` document of `error`; never fails.
    fn marshal_error(&self, error: &ApiError) -> Vec<u8>;
}

/// JSON codec used for the default media type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn marshal(&self, document: &Value) -> ApiResult<Vec<u8>> {
        serde_json::to_vec(document)
            .map_err(|err| ApiError::internal(format!("failed to encode document: {err}")))
    }

    fn unmarshal(&self, body: &[u8]) -> ApiResult<Value> {
        serde_json::from_slice(body)
            .map_err(|err| ApiError::invalid_request(format!("malformed request body: {err}")))
    }

    fn marshal_error(&self, error: &ApiError) -> Vec<u8> {
        serde_json::to_vec(&error.to_document()).unwrap_or_else(|err| {
            error!(error = %err, "failed to encode error document");
            b"{}".to_vec()
        })
    }
}

/// Registered codecs by media type.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<dyn Codec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut codecs: BTreeMap<String, Arc<dyn Codec>> = BTreeMap::new();
        codecs.insert(DEFAULT_CONTENT_TYPE.to_owned(), Arc::new(JsonCodec));
        Self { codecs }
    }
}

impl CodecRegistry {
    /// A registry holding only the default JSON:API codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the codec for `content_type`.
    pub fn insert(&mut self, content_type: impl Into<String>, codec: impl Codec + 'static) {
        self.codecs.insert(content_type.into(), Arc::new(codec));
    }

    /// Codec registered for exactly `content_type`.
    #[must_use]
    pub fn get(&self, content_type: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(content_type).cloned()
    }

    /// The default JSON:API codec.
    #[must_use]
    pub fn fallback(&self) -> Arc<dyn Codec> {
        self.codecs
            .get(DEFAULT_CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| Arc::new(JsonCodec))
    }

    /// Registered media types, the default first and the rest sorted.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        std::iter::once(DEFAULT_CONTENT_TYPE).chain(
            self.codecs
                .keys()
                .map(String::as_str)
                .filter(|content_type| *content_type != DEFAULT_CONTENT_TYPE),
        )
    }
}
