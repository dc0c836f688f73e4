//! # Capability Registry
//!
//! Maps a role and a short name to a capability identifier and back. Identifiers
//! are what the dispatcher compares when it asks "does this resource answer
//! DELETE?" or "can this endpoint emit CSV?":
//!
//! ```text
//! (Method,  "GET")  -> "rest_method_get"
//! (Content, "json") -> "rest_content_json"
//! (Model,   "test") -> "model_rest_test"
//! (Exec,    "GET")  -> "rest_get"
//! ```
//!
//! The registry is built once from configuration at process start and shared
//! read-only by every dispatch.
//!
//! A role without a configured prefix resolves with the empty prefix. That keeps
//! lookups total but silently changes every identifier of the role, so
//! [`CapabilityRegistry::validate`] is run at startup to reject such tables.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::content::ContentType;
use crate::method::{MethodSet, RestMethod};

/// Naming role of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Handler operation invoked for a verb
    Exec,
    /// Resource type looked up by name
    Model,
    /// Verb a resource answers
    Method,
    /// Representation an endpoint emits
    Content,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Exec, Role::Model, Role::Method, Role::Content];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Exec => "exec",
            Role::Model => "model",
            Role::Method => "method",
            Role::Content => "content",
        }
    }

    fn default_prefix(&self) -> &'static str {
        match self {
            Role::Exec => "rest_",
            Role::Model => "Model_REST_",
            Role::Method => "REST_Method_",
            Role::Content => "REST_Content_",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup validation failure of a prefix table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The role has no prefix, so its identifiers would collide with bare names
    #[error("capability role '{0}' has no prefix configured")]
    MissingPrefix(Role),
    /// Two roles share a prefix, so their identifiers are indistinguishable
    #[error("capability roles '{0}' and '{1}' share the prefix '{2}'")]
    DuplicatePrefix(Role, Role, String),
    /// A configured negotiation type has no serializer
    #[error("configured type '{0}' is not in the content table")]
    UnknownContentType(String),
}

/// Role → prefix table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRegistry {
    prefixes: HashMap<Role, String>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self {
            prefixes: Role::ALL
                .iter()
                .map(|r| (*r, r.default_prefix().to_string()))
                .collect(),
        }
    }
}

impl CapabilityRegistry {
    /// Registry with the default prefix table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no prefixes at all; every role resolves with `""`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prefixes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, role: Role, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(role, prefix.into());
        self
    }

    #[must_use]
    pub fn without_prefix(mut self, role: Role) -> Self {
        self.prefixes.remove(&role);
        self
    }

    /// Configured prefix, `""` when the role has none.
    #[must_use]
    pub fn prefix(&self, role: Role) -> &str {
        match self.prefixes.get(&role) {
            Some(p) => p.as_str(),
            None => {
                warn!(role = %role, "No prefix configured for capability role, using empty prefix");
                ""
            }
        }
    }

    /// Reject tables with missing or colliding prefixes.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for role in Role::ALL {
            match self.prefixes.get(&role) {
                Some(p) if !p.is_empty() => {}
                _ => return Err(RegistryError::MissingPrefix(role)),
            }
        }
        for (i, a) in Role::ALL.iter().enumerate() {
            for b in &Role::ALL[i + 1..] {
                let pa = self.prefix(*a).to_ascii_lowercase();
                if pa == self.prefix(*b).to_ascii_lowercase() {
                    return Err(RegistryError::DuplicatePrefix(*a, *b, pa));
                }
            }
        }
        Ok(())
    }

    /// `lowercase(prefix(role) + short)`
    #[must_use]
    pub fn capability_id(&self, role: Role, short: &str) -> String {
        let mut id = String::with_capacity(self.prefix(role).len() + short.len());
        id.push_str(self.prefix(role));
        id.push_str(short);
        id.to_lowercase()
    }

    /// Left inverse of [`capability_id`](Self::capability_id): strips the role prefix.
    ///
    /// Identifiers that do not carry the prefix are returned unchanged.
    #[must_use]
    pub fn short_name(&self, role: Role, id: &str) -> String {
        let prefix = self.prefix(role);
        match id.get(..prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(prefix) => id[prefix.len()..].to_string(),
            _ => id.to_string(),
        }
    }

    /// Method capabilities for a declared verb set.
    #[must_use]
    pub fn method_capabilities(&self, methods: MethodSet) -> CapabilitySet {
        methods
            .iter()
            .map(|m| self.capability_id(Role::Method, m.as_str()))
            .collect()
    }

    /// Content capabilities for a declared list of representations.
    #[must_use]
    pub fn content_capabilities(&self, types: &[ContentType]) -> CapabilitySet {
        types
            .iter()
            .map(|t| self.capability_id(Role::Content, t.short_name()))
            .collect()
    }

    /// Probe all eight verbs against a capability set.
    #[must_use]
    pub fn allowed_methods(&self, caps: &CapabilitySet) -> MethodSet {
        RestMethod::ALL
            .into_iter()
            .filter(|m| caps.contains(&self.capability_id(Role::Method, m.as_str())))
            .collect()
    }
}

/// Set of capability identifiers held by a resource or endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.0.insert(id.into());
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<String> for CapabilitySet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
