//! # Configuration
//!
//! [`RestConfig`] is built once at process start, from an optional YAML file
//! overlaid with environment variables, and shared read-only through an `Arc`
//! by every dispatch.
//!
//! ```yaml
//! signal_mode: immediate      # or: recoverable
//! method_override: true
//! content_override: true
//! charsets: [utf-8]
//! languages: [en-us]
//! base_url: "http://localhost:8080"
//! route_prefix: rest
//! etag: true
//! error_body: text            # or: json
//! cors:
//!   allowed_headers: [Origin, Accept, Content-Type]
//! prefixes:
//!   model: Model_REST_
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `BRRTREST_SIGNAL_MODE` | `signal_mode` |
//! | `BRRTREST_METHOD_OVERRIDE` | `method_override` |
//! | `BRRTREST_CONTENT_OVERRIDE` | `content_override` |
//! | `BRRTREST_CHARSETS` | `charsets` (comma list) |
//! | `BRRTREST_LANGUAGES` | `languages` (comma list) |
//! | `BRRTREST_BASE_URL` | `base_url` |
//! | `BRRTREST_ETAG` | `etag` |
//! | `BRRTREST_ERROR_BODY` | `error_body` |
//!
//! Unparseable values are ignored with a warning and the file (or default)
//! value is kept.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::content::ContentType;
use crate::cors::DEFAULT_ALLOWED_HEADERS;
use crate::registry::{CapabilityRegistry, RegistryError, Role};
use crate::router::RestRoute;
use crate::signal::SignalMode;

/// Body written for signals in immediate mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorBodyFormat {
    /// The rendered message as plain text
    #[default]
    Text,
    /// `{"name": ..., "msg": ...}`
    Json,
}

impl ErrorBodyFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(ErrorBodyFormat::Text),
            "json" => Some(ErrorBodyFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Default `Access-Control-Allow-Headers`
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Process-wide dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub signal_mode: SignalMode,
    /// Honour `X-HTTP-METHOD-OVERRIDE`
    pub method_override: bool,
    /// Honour the `content_type` route/query parameter
    pub content_override: bool,
    /// MIME list used instead of the endpoint's types for header negotiation
    pub types: Option<Vec<String>>,
    pub charsets: Vec<String>,
    pub languages: Vec<String>,
    /// Prepended to `Location` URLs of created records
    pub base_url: String,
    pub route_prefix: String,
    /// ETag and `If-None-Match` handling on JSON and XML bodies
    pub etag: bool,
    pub error_body: ErrorBodyFormat,
    pub cors: CorsConfig,
    /// Role prefix overrides; unlisted roles keep their defaults
    pub prefixes: HashMap<Role, String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            signal_mode: SignalMode::Immediate,
            method_override: true,
            content_override: true,
            types: None,
            charsets: vec!["utf-8".to_string()],
            languages: vec!["en-us".to_string()],
            base_url: String::new(),
            route_prefix: "rest".to_string(),
            etag: true,
            error_body: ErrorBodyFormat::Text,
            cors: CorsConfig::default(),
            prefixes: HashMap::new(),
        }
    }
}

fn env_bool(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(variable = name, value = %raw, "Ignoring unparseable boolean");
            None
        }
    }
}

fn env_list(name: &str) -> Option<Vec<String>> {
    let list: Vec<String> = env::var(name)
        .ok()?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!list.is_empty()).then_some(list)
}

impl RestConfig {
    /// Load a YAML file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay `BRRTREST_*` environment variables.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = env::var("BRRTREST_SIGNAL_MODE") {
            match SignalMode::parse(&raw) {
                Some(mode) => self.signal_mode = mode,
                None => warn!(value = %raw, "Ignoring unknown BRRTREST_SIGNAL_MODE"),
            }
        }
        if let Some(v) = env_bool("BRRTREST_METHOD_OVERRIDE") {
            self.method_override = v;
        }
        if let Some(v) = env_bool("BRRTREST_CONTENT_OVERRIDE") {
            self.content_override = v;
        }
        if let Some(list) = env_list("BRRTREST_CHARSETS") {
            self.charsets = list;
        }
        if let Some(list) = env_list("BRRTREST_LANGUAGES") {
            self.languages = list;
        }
        if let Ok(base) = env::var("BRRTREST_BASE_URL") {
            self.base_url = base;
        }
        if let Some(v) = env_bool("BRRTREST_ETAG") {
            self.etag = v;
        }
        if let Ok(raw) = env::var("BRRTREST_ERROR_BODY") {
            match ErrorBodyFormat::parse(&raw) {
                Some(fmt) => self.error_body = fmt,
                None => warn!(value = %raw, "Ignoring unknown BRRTREST_ERROR_BODY"),
            }
        }
        self
    }

    /// `load` when a path is given, defaults otherwise, then the environment.
    pub fn from_sources(path: Option<&Path>) -> anyhow::Result<Self> {
        let base = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// Build and validate the capability registry.
    ///
    /// Also rejects `types` entries the content table cannot render.
    pub fn registry(&self) -> Result<CapabilityRegistry, RegistryError> {
        if let Some(unknown) = self
            .types
            .iter()
            .flatten()
            .find(|t| ContentType::from_mime(t).is_none())
        {
            return Err(RegistryError::UnknownContentType(unknown.clone()));
        }
        let registry = self
            .prefixes
            .iter()
            .fold(CapabilityRegistry::new(), |reg, (role, prefix)| {
                reg.with_prefix(*role, prefix.clone())
            });
        registry.validate()?;
        Ok(registry)
    }

    #[must_use]
    pub fn route(&self) -> RestRoute {
        RestRoute::new(&self.route_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RestConfig::default();
        assert_eq!(cfg.signal_mode, SignalMode::Immediate);
        assert!(cfg.method_override && cfg.content_override && cfg.etag);
        assert_eq!(cfg.charsets, vec!["utf-8"]);
        assert_eq!(cfg.languages, vec!["en-us"]);
        assert_eq!(cfg.cors.allowed_headers.len(), 6);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = RestConfig::from_yaml("etag: false\nprefixes:\n  model: Resource_\n").unwrap();
        assert!(!cfg.etag);
        assert_eq!(cfg.route_prefix, "rest");
        let reg = cfg.registry().unwrap();
        assert_eq!(reg.capability_id(Role::Model, "Test"), "resource_test");
        assert_eq!(reg.capability_id(Role::Method, "GET"), "rest_method_get");
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let cfg = RestConfig::from_yaml("prefixes:\n  content: \"\"\n").unwrap();
        assert_eq!(
            cfg.registry(),
            Err(RegistryError::MissingPrefix(Role::Content))
        );
    }

    #[test]
    fn test_unrenderable_type_is_rejected() {
        let cfg = RestConfig::from_yaml("types:
  - application/json
  - text/plain
").unwrap();
        assert_eq!(
            cfg.registry(),
            Err(RegistryError::UnknownContentType("text/plain".to_string()))
        );

        let cfg = RestConfig::from_yaml("types:
  - Application/XML; charset=utf-8
").unwrap();
        assert!(cfg.registry().is_ok());
    }
}
