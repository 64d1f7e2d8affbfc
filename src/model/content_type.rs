//! Content type (model) definitions.

use serde::{Deserialize, Serialize};

use super::EntrySys;

/// The value type of a content type field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Symbol,
    Text,
    RichText,
    Integer,
    Number,
    Date,
    Boolean,
    Location,
    Object,
    Array,
    Link,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Symbol => "Symbol",
            FieldType::Text => "Text",
            FieldType::RichText => "RichText",
            FieldType::Integer => "Integer",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Boolean => "Boolean",
            FieldType::Location => "Location",
            FieldType::Object => "Object",
            FieldType::Array => "Array",
            FieldType::Link => "Link",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Symbol" => FieldType::Symbol,
            "Text" => FieldType::Text,
            "RichText" => FieldType::RichText,
            "Integer" => FieldType::Integer,
            "Number" => FieldType::Number,
            "Date" => FieldType::Date,
            "Boolean" => FieldType::Boolean,
            "Location" => FieldType::Location,
            "Object" => FieldType::Object,
            "Array" => FieldType::Array,
            "Link" => FieldType::Link,
            _ => FieldType::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// Item definition of an `Array` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldItems {
    #[serde(rename = "type")]
    pub item_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

/// A field of a content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldItems>,
    #[serde(default)]
    pub localized: bool,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            field_type,
            link_type: None,
            items: None,
            localized: false,
        }
    }
}

/// A content type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub sys: EntrySys,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ContentType {
    /// Create a content type with the given fields.
    pub fn new(id: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        let id = id.into();
        Self {
            sys: EntrySys {
                id: id.clone(),
                sys_type: "ContentType".to_string(),
                content_type: None,
            },
            name: id,
            display_field: None,
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// Fields listed in `filter`, or every field when the filter is empty.
    pub fn filtered_fields(&self, filter: &[String]) -> Vec<&FieldDefinition> {
        self.fields
            .iter()
            .filter(|f| filter.is_empty() || filter.contains(&f.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_content_type() {
        let ct: ContentType = serde_json::from_value(json!({
            "sys": { "id": "page", "type": "ContentType" },
            "name": "Page",
            "displayField": "title",
            "fields": [
                { "id": "title", "name": "Title", "type": "Symbol", "localized": true },
                { "id": "body", "name": "Body", "type": "RichText" },
                { "id": "hero", "name": "Hero", "type": "Link", "linkType": "Asset" },
                { "id": "related", "name": "Related", "type": "Array",
                  "items": { "type": "Link", "linkType": "Entry" } },
                { "id": "when", "name": "When", "type": "DateRange" }
            ]
        }))
        .unwrap();

        assert_eq!(ct.id(), "page");
        assert_eq!(ct.fields[1].field_type, FieldType::RichText);
        assert_eq!(ct.fields[2].link_type.as_deref(), Some("Asset"));
        assert_eq!(ct.fields[3].items.as_ref().unwrap().item_type, FieldType::Link);
        assert_eq!(ct.fields[4].field_type, FieldType::Other("DateRange".into()));
    }

    #[test]
    fn test_filtered_fields() {
        let ct = ContentType::new(
            "page",
            vec![
                FieldDefinition::new("title", FieldType::Symbol),
                FieldDefinition::new("body", FieldType::RichText),
            ],
        );

        assert_eq!(ct.filtered_fields(&[]).len(), 2);
        let only_body = ct.filtered_fields(&["body".to_string()]);
        assert_eq!(only_body.len(), 1);
        assert_eq!(only_body[0].id, "body");
    }
}
