//! # Result Serializers
//!
//! Turn a resource's result (any `serde_json::Value`) into the negotiated
//! representation:
//!
//! | Content | Serializer |
//! |---|---|
//! | `json` | [`to_json`] |
//! | `xml`, `rdf`, `rss`, `atom` | [`to_xml`] |
//! | `csv` | [`to_csv`] |
//! | `html` | [`to_html`], a diagnostic dump |
//!
//! [`etag`] digests the JSON serialization for conditional GETs.

mod csv;
mod etag;
mod html;
pub mod inflect;
mod json;
mod xml;

pub use self::csv::to_csv;
pub use self::etag::etag;
pub use self::html::to_html;
pub use self::json::{from_json, to_json};
pub use self::xml::{from_xml, to_xml, XmlSerializer};

use serde_json::Value;
use thiserror::Error;

use crate::content::ContentType;
use crate::signal::{Message, Signal};

/// Failure while rendering a result or decoding a request body.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML serialization failed: {0}")]
    Xml(String),
    #[error("CSV serialization failed: {0}")]
    Csv(String),
    #[error("HTML rendering failed: {0}")]
    Html(#[from] minijinja::Error),
}

impl From<::csv::Error> for SerializeError {
    fn from(e: ::csv::Error) -> Self {
        SerializeError::Csv(e.to_string())
    }
}

impl From<SerializeError> for Signal {
    fn from(e: SerializeError) -> Self {
        Signal::InternalConfiguration(Some(
            Message::new("Unable to render result: :error").param(":error", e),
        ))
    }
}

/// Text of a scalar leaf: strings as-is, booleans as `true`/`false`, null as empty.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Render `value` as `content`. `name` is the XML root / CSV file stem.
pub fn render(content: ContentType, value: &Value, name: &str) -> Result<String, SerializeError> {
    match content {
        ContentType::Json => to_json(value),
        ContentType::Html => to_html(value),
        ContentType::Csv => to_csv(value),
        ContentType::Xml | ContentType::Rdf | ContentType::Rss | ContentType::Atom => {
            to_xml(value, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Value::Null), "");
        assert_eq!(scalar_text(&json!(false)), "false");
        assert_eq!(scalar_text(&json!(1.5)), "1.5");
        assert_eq!(scalar_text(&json!("x")), "x");
    }

    #[test]
    fn test_render_dispatches_by_content() {
        let v = json!({"id": 1});
        assert_eq!(render(ContentType::Json, &v, "test").unwrap(), r#"{"id":1}"#);
        assert_eq!(
            render(ContentType::Rss, &v, "test").unwrap(),
            "<test><id>1</id></test>"
        );
        assert_eq!(render(ContentType::Csv, &v, "test").unwrap(), "\"id\"\n\"1\"\n");
    }

    #[test]
    fn test_serialize_error_becomes_internal_signal() {
        let signal: Signal = SerializeError::Xml("boom".to_string()).into();
        assert_eq!(signal.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(signal.body_text().contains("boom"));
    }
}
