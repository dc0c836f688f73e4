//! # Response Signals
//!
//! A [`Signal`] short-circuits a dispatch. Genuine failures (404, 405, 406 ...)
//! and deliberate early exits (304, 204, 201) travel the same way: every gate of
//! the dispatcher returns `Result<_, Signal>` and the first `Err` ends the
//! pipeline.
//!
//! What happens to a signal is decided once per process by [`SignalMode`]:
//!
//! - [`SignalMode::Immediate`]: the service boundary writes status, headers and
//!   the rendered message as the response.
//! - [`SignalMode::Recoverable`]: the boundary hands the signal back to the
//!   caller as an error for an outer layer to translate.
//!
//! Messages are templates with `:name` placeholders:
//!
//! ```rust
//! use brrtrest::signal::Message;
//!
//! let msg = Message::new("Method :method not allowed.").param(":method", "PATCH");
//! assert_eq!(msg.to_string(), "Method PATCH not allowed.");
//! ```

use std::borrow::Cow;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::method::MethodSet;

/// How the service boundary treats signals. Fixed per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalMode {
    /// Write the signal as the response and stop
    #[default]
    Immediate,
    /// Return the signal to the caller as an error
    Recoverable,
}

impl SignalMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Some(SignalMode::Immediate),
            "recoverable" | "exceptions" => Some(SignalMode::Recoverable),
            _ => None,
        }
    }
}

/// Message template with named substitution parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    template: Cow<'static, str>,
    params: Vec<(String, String)>,
}

impl Message {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            params: Vec::new(),
        }
    }

    /// Add a substitution. `name` is matched literally, including its `:`.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Substitute parameters in a single left-to-right pass, preferring the
    /// longest name at each position so `:id` never clobbers `:identity`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut names: Vec<&(String, String)> =
            self.params.iter().filter(|(k, _)| !k.is_empty()).collect();
        names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let src = self.template.as_ref();
        let mut out = String::with_capacity(src.len());
        let mut i = 0;
        while i < src.len() {
            let rest = &src[i..];
            match names.iter().find(|(k, _)| rest.starts_with(k.as_str())) {
                Some((k, v)) => {
                    out.push_str(v);
                    i += k.len();
                }
                None => {
                    let ch = rest.chars().next().unwrap_or_default();
                    out.push(ch);
                    i += ch.len_utf8().max(1);
                }
            }
        }
        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&'static str> for Message {
    fn from(s: &'static str) -> Self {
        Message::new(s)
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::new(s)
    }
}

fn suffix(message: &Option<Message>) -> String {
    match message {
        Some(m) => format!(": {}", m.render()),
        None => String::new(),
    }
}

/// Short-circuit of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Signal {
    /// 404: the requested resource type or record does not exist
    #[error("not found{}", suffix(.0))]
    NotFound(Option<Message>),
    /// 500: the resolved resource does not satisfy the resource contract
    #[error("internal configuration error{}", suffix(.0))]
    InternalConfiguration(Option<Message>),
    /// 405: the resource does not answer the method; `allow` lists what it does answer
    #[error("method not allowed: {message}")]
    MethodNotAllowed { message: Message, allow: MethodSet },
    /// 406: no acceptable content type, charset or language
    #[error("not acceptable: {0}")]
    NotAcceptable(Message),
    /// 401: the auth hook denied the request
    #[error("unauthorized{}", suffix(.0))]
    Unauthorized(Option<Message>),
    /// 304: the client's cached representation is current
    #[error("not modified")]
    NotModified { etag: String },
    /// 201 (or another redirect status) pointing at a newly created record
    #[error("created at {location}")]
    Created { status: StatusCode, location: String },
    /// Any other status a handler asks for (403, 204, 200 ...)
    #[error("{status}{}", suffix(.message))]
    Status {
        status: StatusCode,
        message: Option<Message>,
    },
}

impl Signal {
    pub fn not_found(message: impl Into<Message>) -> Self {
        Signal::NotFound(Some(message.into()))
    }

    pub fn internal(message: impl Into<Message>) -> Self {
        Signal::InternalConfiguration(Some(message.into()))
    }

    pub fn not_acceptable(message: impl Into<Message>) -> Self {
        Signal::NotAcceptable(message.into())
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Signal::Unauthorized(None)
    }

    /// Bare status with no body.
    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Signal::Status {
            status,
            message: None,
        }
    }

    pub fn status_with(status: StatusCode, message: impl Into<Message>) -> Self {
        Signal::Status {
            status,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Signal::NotFound(_) => StatusCode::NOT_FOUND,
            Signal::InternalConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Signal::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Signal::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            Signal::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Signal::NotModified { .. } => StatusCode::NOT_MODIFIED,
            Signal::Created { status, .. } => *status,
            Signal::Status { status, .. } => *status,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Signal::NotFound(m) | Signal::InternalConfiguration(m) | Signal::Unauthorized(m) => {
                m.as_ref()
            }
            Signal::MethodNotAllowed { message, .. } => Some(message),
            Signal::NotAcceptable(message) => Some(message),
            Signal::Status { message, .. } => message.as_ref(),
            Signal::NotModified { .. } | Signal::Created { .. } => None,
        }
    }

    /// Headers the signal itself carries (`Allow`, `Location`, `ETag`).
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Signal::MethodNotAllowed { allow, .. } => vec![("Allow", allow.join(", "))],
            Signal::Created { location, .. } => vec![("Location", location.clone())],
            Signal::NotModified { etag } => vec![("ETag", etag.clone())],
            _ => Vec::new(),
        }
    }

    /// Whether the status forbids a body (1xx, 204, 304).
    #[must_use]
    pub fn is_bodiless(&self) -> bool {
        let s = self.status_code();
        s.is_informational() || s == StatusCode::NO_CONTENT || s == StatusCode::NOT_MODIFIED
    }

    /// Rendered message, empty when there is none.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.message().map(Message::render).unwrap_or_default()
    }
}

/// JSON error body, `{"name": ..., "msg": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub name: String,
    pub msg: String,
}

impl ErrorBody {
    #[must_use]
    pub fn from_signal(signal: &Signal) -> Self {
        let status = signal.status_code();
        Self {
            name: status
                .canonical_reason()
                .unwrap_or_else(|| status.as_str())
                .to_string(),
            msg: signal.body_text(),
        }
    }

    /// Serialized body; the struct has no fallible fields.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
