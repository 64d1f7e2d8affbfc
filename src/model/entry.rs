//! Entries, assets, and links as the CMS delivers them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field values keyed by field id, then by locale code.
pub type LocalizedFields = BTreeMap<String, BTreeMap<String, Value>>;

/// Fallback display name when no naming field is present.
pub const UNKNOWN_NAME: &str = "unknown name";

/// The `sys` block of a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    pub id: String,
    #[serde(rename = "type", default)]
    pub sys_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

/// A reference to another entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

impl Link {
    /// Create a link of the given type (`Entry`, `Asset`, `ContentType`, `Tag`).
    pub fn new(link_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                id: id.into(),
                sys_type: "Link".to_string(),
                link_type: Some(link_type.into()),
            },
        }
    }

    /// Target id.
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// The `sys` block of an entry or asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySys {
    pub id: String,
    #[serde(rename = "type", default)]
    pub sys_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
}

/// Entry metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub tags: Vec<Link>,
}

/// A content entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: LocalizedFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Entry {
    /// Create an entry of the given content type with no fields.
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            sys: EntrySys {
                id: id.into(),
                sys_type: "Entry".to_string(),
                content_type: Some(Link::new("ContentType", content_type)),
            },
            fields: LocalizedFields::new(),
            metadata: None,
        }
    }

    /// Set a localized field value.
    pub fn with_field(mut self, field: impl Into<String>, locale: impl Into<String>, value: Value) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(locale.into(), value);
        self
    }

    /// Attach tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata = Some(Metadata {
            tags: tags.into_iter().map(|t| Link::new("Tag", t)).collect(),
        });
        self
    }

    /// Entry id.
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// Content type id, empty when the entry carries none.
    pub fn content_type_id(&self) -> &str {
        self.sys
            .content_type
            .as_ref()
            .map(|ct| ct.id())
            .unwrap_or_default()
    }

    /// Value of a field in one locale.
    pub fn field(&self, field: &str, locale: &str) -> Option<&Value> {
        self.fields.get(field)?.get(locale)
    }

    /// Tag ids from the entry metadata.
    pub fn tag_ids(&self) -> Vec<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.tags.iter().map(|t| t.id()).collect())
            .unwrap_or_default()
    }

    /// Display name: `internalName`, then `title`, then `id`.
    pub fn name(&self, locale: &str) -> String {
        ["internalName", "title", "id"]
            .iter()
            .find_map(|field| display_value(self.field(field, locale)?))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }
}

/// A media asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Asset {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: LocalizedFields,
}

impl Asset {
    /// Display name from the `title` field.
    pub fn name(&self, locale: &str) -> String {
        self.fields
            .get("title")
            .and_then(|f| f.get(locale))
            .and_then(display_value)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Read `sys.id` and `sys.linkType` from a JSON value if it is a link.
pub fn as_link(value: &Value) -> Option<(&str, Option<&str>)> {
    let sys: &Map<String, Value> = value.get("sys")?.as_object()?;
    if sys.get("type")?.as_str()? != "Link" {
        return None;
    }
    let id = sys.get("id")?.as_str().filter(|id| !id.is_empty())?;
    Some((id, sys.get("linkType").and_then(Value::as_str)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_entry() {
        let entry: Entry = serde_json::from_value(json!({
            "sys": {
                "id": "abc",
                "type": "Entry",
                "contentType": { "sys": { "id": "page", "type": "Link", "linkType": "ContentType" } }
            },
            "fields": { "title": { "en-US": "Home", "de-DE": "Startseite" } },
            "metadata": { "tags": [{ "sys": { "id": "featured", "type": "Link", "linkType": "Tag" } }] }
        }))
        .unwrap();

        assert_eq!(entry.id(), "abc");
        assert_eq!(entry.content_type_id(), "page");
        assert_eq!(entry.field("title", "de-DE"), Some(&json!("Startseite")));
        assert_eq!(entry.tag_ids(), vec!["featured"]);
    }

    #[test]
    fn test_entry_name_precedence() {
        let entry = Entry::new("e1", "page")
            .with_field("title", "en-US", json!("Title"))
            .with_field("internalName", "en-US", json!("Internal"));
        assert_eq!(entry.name("en-US"), "Internal");

        let entry = Entry::new("e1", "page").with_field("id", "en-US", json!("slug"));
        assert_eq!(entry.name("en-US"), "slug");

        let entry = Entry::new("e1", "page");
        assert_eq!(entry.name("en-US"), UNKNOWN_NAME);
    }

    #[test]
    fn test_asset_name() {
        let asset: Asset = serde_json::from_value(json!({
            "sys": { "id": "img", "type": "Asset" },
            "fields": { "title": { "en-US": "Logo" } }
        }))
        .unwrap();
        assert_eq!(asset.name("en-US"), "Logo");
        assert_eq!(asset.name("fr-FR"), UNKNOWN_NAME);
    }

    #[test]
    fn test_as_link() {
        let link = json!({ "sys": { "id": "x", "type": "Link", "linkType": "Asset" } });
        assert_eq!(as_link(&link), Some(("x", Some("Asset"))));

        let not_link = json!({ "sys": { "id": "x", "type": "Entry" } });
        assert_eq!(as_link(&not_link), None);

        assert_eq!(as_link(&json!("plain")), None);
        assert_eq!(as_link(&json!({ "sys": { "id": "", "type": "Link" } })), None);
    }
}
