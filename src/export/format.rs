//! Field value to spreadsheet cell formatting.
//!
//! Every cell carries a short type prefix (`number:`, `bool:`, `link:`, ...)
//! so a cell can be read back without the content model at hand. Plain text
//! fields are the exception and are written verbatim.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::model::{FieldType, Node};
use crate::render;

/// How rich-text fields are written into cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RichTextFormat {
    /// Compact JSON of the document tree
    #[default]
    Json,
    /// Markdown profile output
    Markdown,
    /// HTML profile output
    Html,
}

impl RichTextFormat {
    /// Cell prefix for this format.
    pub fn prefix(&self) -> &'static str {
        match self {
            RichTextFormat::Json => "json:",
            RichTextFormat::Markdown => "markdown:",
            RichTextFormat::Html => "html:",
        }
    }
}

impl FromStr for RichTextFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(RichTextFormat::Json),
            "markdown" | "md" => Ok(RichTextFormat::Markdown),
            "html" => Ok(RichTextFormat::Html),
            other => Err(format!("unknown rich text format: {}", other)),
        }
    }
}

impl fmt::Display for RichTextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches(':'))
    }
}

/// Format one localized field value for a cell.
///
/// Returns `None` for null values and for values that format to an empty
/// string, so callers can leave the cell blank.
pub fn format_value(value: &Value, field_type: &FieldType, rich_text: RichTextFormat) -> Option<String> {
    if value.is_null() {
        return None;
    }

    let formatted = match field_type {
        FieldType::Text | FieldType::Symbol => plain(value),
        FieldType::Integer | FieldType::Number => format!("number:{}", plain(value)),
        FieldType::Boolean => format!("bool:{}", *value == Value::Bool(true)),
        FieldType::RichText => rich_text_cell(value, rich_text),
        FieldType::Array | FieldType::Object => list_cell(value),
        FieldType::Link => link_cell(value),
        _ => plain(value),
    };

    Some(formatted).filter(|s| !s.is_empty())
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json(value: &Value) -> String {
    format!("json:{}", value)
}

fn rich_text_cell(value: &Value, format: RichTextFormat) -> String {
    let render: fn(&Node) -> String = match format {
        RichTextFormat::Json => return json(value),
        RichTextFormat::Markdown => render::to_markdown,
        RichTextFormat::Html => render::to_html,
    };

    match Node::from_value(value.clone()) {
        Ok(doc) => format!("{}{}", format.prefix(), render(&doc)),
        Err(_) => json(value),
    }
}

fn sys_id(value: &Value) -> Option<&str> {
    value.get("sys")?.get("id")?.as_str()
}

fn list_cell(value: &Value) -> String {
    let items = match value.as_array() {
        Some(items) => items,
        None => return json(value),
    };

    match items.first() {
        Some(first) if sys_id(first).is_some() => {
            let prefix = match first["sys"]["linkType"].as_str() {
                Some("Asset") => "assets",
                _ => "links",
            };
            let ids: Vec<&str> = items.iter().filter_map(sys_id).collect();
            format!("{}:{}", prefix, ids.join(","))
        }
        Some(Value::String(_)) => {
            let parts: Vec<String> = items.iter().map(plain).collect();
            format!("array:{}", parts.join(","))
        }
        _ => json(value),
    }
}

fn link_cell(value: &Value) -> String {
    match (sys_id(value), value["sys"]["linkType"].as_str()) {
        (Some(id), Some("Asset")) => format!("asset:{}", id),
        (Some(id), _) => format!("link:{}", id),
        (None, _) => json(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(id: &str, link_type: &str) -> Value {
        json!({ "sys": { "id": id, "type": "Link", "linkType": link_type } })
    }

    #[test]
    fn test_null_and_empty() {
        assert_eq!(format_value(&Value::Null, &FieldType::Symbol, RichTextFormat::Json), None);
        assert_eq!(format_value(&json!(""), &FieldType::Text, RichTextFormat::Json), None);
    }

    #[test]
    fn test_scalars() {
        let f = |v: Value, t: FieldType| format_value(&v, &t, RichTextFormat::Json);

        assert_eq!(f(json!("Hello"), FieldType::Symbol), Some("Hello".into()));
        assert_eq!(f(json!(42), FieldType::Integer), Some("number:42".into()));
        assert_eq!(f(json!(1.5), FieldType::Number), Some("number:1.5".into()));
        assert_eq!(f(json!(true), FieldType::Boolean), Some("bool:true".into()));
        assert_eq!(f(json!("yes"), FieldType::Boolean), Some("bool:false".into()));
        assert_eq!(
            f(json!("2024-01-01"), FieldType::Date),
            Some("2024-01-01".into())
        );
        assert_eq!(
            f(json!({ "lat": 1, "lon": 2 }), FieldType::Location),
            Some(r#"{"lat":1,"lon":2}"#.into())
        );
    }

    #[test]
    fn test_links() {
        let f = |v: Value, t: FieldType| format_value(&v, &t, RichTextFormat::Json);

        assert_eq!(f(link("img", "Asset"), FieldType::Link), Some("asset:img".into()));
        assert_eq!(f(link("e1", "Entry"), FieldType::Link), Some("link:e1".into()));
        assert_eq!(
            f(json!([link("a", "Asset"), link("b", "Asset")]), FieldType::Array),
            Some("assets:a,b".into())
        );
        assert_eq!(
            f(json!([link("x", "Entry"), link("y", "Entry")]), FieldType::Array),
            Some("links:x,y".into())
        );
    }

    #[test]
    fn test_arrays() {
        let f = |v: Value| format_value(&v, &FieldType::Array, RichTextFormat::Json);

        assert_eq!(f(json!(["a", "b"])), Some("array:a,b".into()));
        assert_eq!(f(json!([1, 2])), Some("json:[1,2]".into()));
        assert_eq!(f(json!([])), Some("json:[]".into()));
        assert_eq!(
            format_value(&json!({ "k": "v" }), &FieldType::Object, RichTextFormat::Json),
            Some(r#"json:{"k":"v"}"#.into())
        );
    }

    #[test]
    fn test_rich_text_formats() {
        let doc = json!({
            "nodeType": "document",
            "data": {},
            "content": [{
                "nodeType": "paragraph",
                "data": {},
                "content": [{ "nodeType": "text", "value": "Hi", "marks": [], "data": {} }]
            }]
        });

        let as_json = format_value(&doc, &FieldType::RichText, RichTextFormat::Json).unwrap();
        assert!(as_json.starts_with("json:{"));

        assert_eq!(
            format_value(&doc, &FieldType::RichText, RichTextFormat::Html),
            Some("html:<p>Hi</p>".into())
        );
        assert_eq!(
            format_value(&doc, &FieldType::RichText, RichTextFormat::Markdown),
            Some("markdown:Hi\n\n\n".into())
        );
    }

    #[test]
    fn test_rich_text_fallback() {
        assert_eq!(
            format_value(&json!("plain"), &FieldType::RichText, RichTextFormat::Markdown),
            Some(r#"json:"plain""#.into())
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("HTML".parse::<RichTextFormat>(), Ok(RichTextFormat::Html));
        assert_eq!("md".parse::<RichTextFormat>(), Ok(RichTextFormat::Markdown));
        assert!("xml".parse::<RichTextFormat>().is_err());
        assert_eq!(RichTextFormat::Markdown.to_string(), "markdown");
    }
}
