use minijinja::{context, Environment};
use serde_json::Value;

use super::SerializeError;

// The `.html` name turns on minijinja's HTML auto-escaping.
const TEMPLATE_NAME: &str = "rest.html";
const TEMPLATE: &str = "<pre>{{ dump }}</pre>";

/// Preformatted pretty dump of a result, for eyeballing in a browser.
pub fn to_html(value: &Value) -> Result<String, SerializeError> {
    let dump = serde_json::to_string_pretty(value)?;
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let rendered = env.get_template(TEMPLATE_NAME)?.render(context! { dump => dump })?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dump_is_preformatted_and_escaped() {
        let html = to_html(&json!({"title": "<b>bold</b>"})).unwrap();
        assert!(html.starts_with("<pre>{\n"));
        assert!(html.ends_with("}</pre>"));
        assert!(html.contains("&lt;b&gt;bold&lt;"));
        assert!(!html.contains("<b>"));
    }
}
