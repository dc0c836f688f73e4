//! XML rendering of results and XML request-body decoding.
//!
//! Rendering rules:
//!
//! - the root element is the singular of `name` for a mapping and `name`
//!   itself for a sequence;
//! - every nested value becomes a child element named by its key, positional
//!   keys take the current singular node name, and recursion continues with
//!   the singular of the child's name;
//! - scalars become text, with `& < > ' "` escaped.
//!
//! `{"id":1,"tags":["a","b"]}` under `item` renders as
//! `<item><id>1</id><tags><tag>a</tag><tag>b</tag></tags></item>`.

use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use super::inflect::singular;
use super::{scalar_text, SerializeError};

/// XML serializer with an optional `<?xml ...?>` declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer {
    pub declaration: bool,
}

impl XmlSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    pub fn serialize(&self, value: &Value, name: &str) -> Result<String, SerializeError> {
        let mut writer = Writer::new(Vec::new());
        if self.declaration {
            writer.get_mut().extend_from_slice(b"<?xml version=\"1.0\"?>\n");
        }

        let node = singular(name);
        let root = match value {
            Value::Array(_) => element_name(name),
            _ => element_name(&node),
        };

        start(&mut writer, &root)?;
        walk(&mut writer, value, &node)?;
        end(&mut writer, &root)?;

        String::from_utf8(writer.into_inner()).map_err(|e| SerializeError::Xml(e.to_string()))
    }
}

/// Render with the default serializer.
pub fn to_xml(value: &Value, name: &str) -> Result<String, SerializeError> {
    XmlSerializer::new().serialize(value, name)
}

fn walk(writer: &mut Writer<Vec<u8>>, value: &Value, node: &str) -> Result<(), SerializeError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                child_element(writer, key, child)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for child in items {
                child_element(writer, node, child)?;
            }
            Ok(())
        }
        scalar => text(writer, &scalar_text(scalar)),
    }
}

fn child_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
) -> Result<(), SerializeError> {
    let tag = element_name(name);
    start(writer, &tag)?;
    match value {
        Value::Object(_) | Value::Array(_) => walk(writer, value, &singular(name))?,
        scalar => text(writer, &scalar_text(scalar))?,
    }
    end(writer, &tag)
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), SerializeError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| SerializeError::Xml(e.to_string()))
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), SerializeError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| SerializeError::Xml(e.to_string()))
}

fn text(writer: &mut Writer<Vec<u8>>, content: &str) -> Result<(), SerializeError> {
    if content.is_empty() {
        return Ok(());
    }
    let escaped = escape(content);
    writer
        .write_event(Event::Text(BytesText::from_escaped(escaped)))
        .map_err(|e| SerializeError::Xml(e.to_string()))
}

/// Make a key usable as an element name: invalid characters become `_` and a
/// name that cannot start an element gets a leading `_`.
fn element_name(key: &str) -> String {
    let mut out: String = key
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match out.chars().next() {
        None => out.push('_'),
        Some(c) if !(c.is_alphabetic() || c == '_') => out.insert(0, '_'),
        _ => {}
    }
    out
}

/// Decode an XML document into a JSON value.
///
/// The root element's content is returned. Elements become objects, repeated
/// siblings become arrays and text-only elements become strings. Text mixed
/// with child elements is kept under `#text`.
pub fn from_xml(input: &str) -> Result<Value, SerializeError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<(String, Map<String, Value>, String)> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push((name, Map::new(), String::new()));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some((_, parent, _)) => add_to_parent(parent, &name, Value::String(String::new())),
                    None => return Ok(Value::String(String::new())),
                }
            }
            Ok(Event::Text(e)) => {
                let content = e.unescape().map_err(|e| SerializeError::Xml(e.to_string()))?;
                if let Some((_, _, buf)) = stack.last_mut() {
                    buf.push_str(content.trim());
                }
            }
            Ok(Event::CData(e)) => {
                let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some((_, _, buf)) = stack.last_mut() {
                    buf.push_str(&content);
                }
            }
            Ok(Event::End(_)) => {
                let Some((name, mut children, buf)) = stack.pop() else {
                    return Err(SerializeError::Xml("unbalanced end tag".to_string()));
                };
                let value = if children.is_empty() {
                    Value::String(buf)
                } else {
                    if !buf.is_empty() {
                        children.insert("#text".to_string(), Value::String(buf));
                    }
                    Value::Object(children)
                };
                match stack.last_mut() {
                    Some((_, parent, _)) => add_to_parent(parent, &name, value),
                    None => return Ok(value),
                }
            }
            Ok(Event::Eof) => {
                return Err(SerializeError::Xml("document has no root element".to_string()))
            }
            Ok(_) => {}
            Err(e) => return Err(SerializeError::Xml(e.to_string())),
        }
    }
}

fn add_to_parent(parent: &mut Map<String, Value>, name: &str, value: Value) {
    match parent.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sequence_uses_singular_names() {
        let xml = to_xml(&json!({"id": 1, "tags": ["a", "b"]}), "item").unwrap();
        assert_eq!(
            xml,
            "<item><id>1</id><tags><tag>a</tag><tag>b</tag></tags></item>"
        );
    }

    #[test]
    fn test_sequence_root_keeps_name() {
        let xml = to_xml(&json!([{"id": 1}, {"id": 2}]), "items").unwrap();
        assert_eq!(
            xml,
            "<items><item><id>1</id></item><item><id>2</id></item></items>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = to_xml(&json!({"q": "a<b & \"c\" 'd'"}), "test").unwrap();
        assert_eq!(
            xml,
            "<test><q>a&lt;b &amp; &quot;c&quot; &apos;d&apos;</q></test>"
        );
    }

    #[test]
    fn test_scalars_and_declaration() {
        let xml = XmlSerializer::new()
            .with_declaration()
            .serialize(&json!({"ok": true, "none": null}), "flags")
            .unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<flag><ok>true</ok><none></none></flag>"
        );
    }

    #[test]
    fn test_element_name_sanitizing() {
        assert_eq!(element_name("first name"), "first_name");
        assert_eq!(element_name("1st"), "_1st");
        assert_eq!(element_name(""), "_");
    }

    #[test]
    fn test_from_xml() {
        let value = from_xml(
            "<test><title>one</title><tag>a</tag><tag>b</tag><meta><n>1</n></meta><e/></test>",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"title": "one", "tag": ["a", "b"], "meta": {"n": "1"}, "e": ""})
        );
        assert!(from_xml("<a><b></a>").is_err());
        assert!(from_xml("").is_err());
    }
}
