//! Spreadsheet-friendly CSV: every field quoted, quotes doubled, `\n` rows.
//!
//! Nested values are flattened. Column titles name the path to each leaf: a
//! leaf under a keyed node is `node.key`, a positional child of `node` becomes
//! the node `node_<index>`.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use tracing::debug;

use super::{scalar_text, SerializeError};

/// Title used for sequences of bare scalars.
const SCALAR_TITLE: &str = "value";

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn titles(value: &Value, node: &str, out: &mut Vec<String>) {
    let leaf = |name: &str, out: &mut Vec<String>| {
        if node.is_empty() {
            out.push(name.to_string());
        } else {
            out.push(format!("{node}.{name}"));
        }
    };
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::Object(_) | Value::Array(_) => titles(child, key, out),
                    _ => leaf(key, out),
                }
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                match child {
                    Value::Object(_) | Value::Array(_) => {
                        titles(child, &format!("{node}_{idx}"), out)
                    }
                    _ => leaf(&idx.to_string(), out),
                }
            }
        }
        _ => out.push(SCALAR_TITLE.to_string()),
    }
}

fn fields(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| fields(v, out)),
        Value::Array(items) => items.iter().for_each(|v| fields(v, out)),
        scalar => out.push(scalar_text(scalar)),
    }
}

/// Render a result as CSV. An empty result renders as the empty string.
///
/// A mapping yields one title row and one data row; a sequence yields a title
/// row taken from its first record and one data row per record.
pub fn to_csv(value: &Value) -> Result<String, SerializeError> {
    if is_empty(value) {
        return Ok(String::new());
    }

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(vec![]);

    let records: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut header = Vec::new();
    titles(records[0], "", &mut header);
    wtr.write_record(&header)?;

    for record in &records {
        let mut row = Vec::new();
        fields(record, &mut row);
        wtr.write_record(&row)?;
    }

    debug!(columns = header.len(), rows = records.len(), "CSV rendered");

    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_of_records() {
        let csv = to_csv(&json!([{"id": 1, "name": "x"}, {"id": 2, "name": "y"}])).unwrap();
        assert_eq!(csv, "\"id\",\"name\"\n\"1\",\"x\"\n\"2\",\"y\"\n");
    }

    #[test]
    fn test_mapping_with_nested_titles() {
        let csv = to_csv(&json!({"id": 7, "author": {"name": "Tara"}, "tags": ["a", "b"]})).unwrap();
        assert_eq!(
            csv,
            "\"id\",\"author.name\",\"tags.0\",\"tags.1\"\n\"7\",\"Tara\",\"a\",\"b\"\n"
        );
    }

    #[test]
    fn test_positional_nested_titles() {
        let csv = to_csv(&json!({"rows": [[1, 2]]})).unwrap();
        assert_eq!(csv, "\"rows_0.0\",\"rows_0.1\"\n\"1\",\"2\"\n");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = to_csv(&json!([{"q": "say \"hi\""}])).unwrap();
        assert_eq!(csv, "\"q\"\n\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_empty_and_scalars() {
        assert_eq!(to_csv(&json!([])).unwrap(), "");
        assert_eq!(to_csv(&Value::Null).unwrap(), "");
        assert_eq!(to_csv(&json!(["a", "b"])).unwrap(), "\"value\"\n\"a\"\n\"b\"\n");
    }
}
