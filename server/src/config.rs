//! Server configuration loaded via OrthoConfig.
//!
//! Values come from `JSONAPI_*` environment variables, a configuration file or
//! command-line flags, in OrthoConfig's usual precedence.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31415";
const DEFAULT_BASE_URL: &str = "http://localhost:31415";
const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Settings controlling how the API is exposed.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "JSONAPI")]
pub struct ApiSettings {
    /// Absolute URL prepended to generated links.
    pub base_url: Option<String>,
    /// Route prefix such as `v1`.
    pub prefix: Option<String>,
    /// Socket address the demo server listens on.
    pub bind_addr: Option<String>,
    /// Largest accepted request body.
    pub max_body_bytes: Option<usize>,
    /// Emit `links` on resource relationships.
    pub generate_links: Option<bool>,
}

impl ApiSettings {
    /// Configured base URL, falling back to the local demo address.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured prefix, empty when unset.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    /// Configured bind address.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Whether relationship links are generated; on unless disabled.
    #[must_use]
    pub fn generate_links(&self) -> bool {
        self.generate_links.unwrap_or(true)
    }

    /// Configured body limit in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ApiSettings {
        ApiSettings::load_from_iter([OsString::from("jsonapi-demo")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("JSONAPI_BASE_URL", None::<String>),
            ("JSONAPI_PREFIX", None::<String>),
            ("JSONAPI_BIND_ADDR", None::<String>),
            ("JSONAPI_MAX_BODY_BYTES", None::<String>),
            ("JSONAPI_GENERATE_LINKS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
        assert_eq!(settings.prefix(), "");
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.max_body_bytes(), DEFAULT_MAX_BODY_BYTES);
        assert!(settings.generate_links());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("JSONAPI_BASE_URL", Some("https://api.example.org".to_owned())),
            ("JSONAPI_PREFIX", Some("v1".to_owned())),
            ("JSONAPI_BIND_ADDR", Some("127.0.0.1:8080".to_owned())),
            ("JSONAPI_MAX_BODY_BYTES", Some("1024".to_owned())),
            ("JSONAPI_GENERATE_LINKS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.base_url(), "https://api.example.org");
        assert_eq!(settings.prefix(), "v1");
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080");
        assert_eq!(settings.max_body_bytes(), 1024);
        assert!(!settings.generate_links());
    }
}
