//! Rich-text document tree.
//!
//! A rich-text field value is a tree of container nodes ending in text
//! leaves. The JSON shape is the one the CMS delivers:
//!
//! ```json
//! { "nodeType": "paragraph", "data": {}, "content": [
//!     { "nodeType": "text", "value": "Hello", "marks": [{ "type": "bold" }], "data": {} }
//! ] }
//! ```
//!
//! Kinds this crate does not know about are kept as `Other(..)` so that a
//! newer document still parses; the renderer then drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Auxiliary data attached to a node (`data` in the wire format).
pub type NodeData = Map<String, Value>;

/// The kind of a rich-text node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Document,
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    OrderedList,
    UnorderedList,
    ListItem,
    HorizontalRule,
    Blockquote,
    Table,
    TableRow,
    TableCell,
    TableHeaderCell,
    EmbeddedEntryBlock,
    EmbeddedAssetBlock,
    Hyperlink,
    EntryHyperlink,
    AssetHyperlink,
    EmbeddedEntryInline,
    Text,
    /// A kind this crate has not been taught yet
    Other(String),
}

impl NodeType {
    /// Wire name of this node kind.
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "document",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading1 => "heading-1",
            NodeType::Heading2 => "heading-2",
            NodeType::Heading3 => "heading-3",
            NodeType::Heading4 => "heading-4",
            NodeType::Heading5 => "heading-5",
            NodeType::Heading6 => "heading-6",
            NodeType::OrderedList => "ordered-list",
            NodeType::UnorderedList => "unordered-list",
            NodeType::ListItem => "list-item",
            NodeType::HorizontalRule => "hr",
            NodeType::Blockquote => "blockquote",
            NodeType::Table => "table",
            NodeType::TableRow => "table-row",
            NodeType::TableCell => "table-cell",
            NodeType::TableHeaderCell => "table-header-cell",
            NodeType::EmbeddedEntryBlock => "embedded-entry-block",
            NodeType::EmbeddedAssetBlock => "embedded-asset-block",
            NodeType::Hyperlink => "hyperlink",
            NodeType::EntryHyperlink => "entry-hyperlink",
            NodeType::AssetHyperlink => "asset-hyperlink",
            NodeType::EmbeddedEntryInline => "embedded-entry-inline",
            NodeType::Text => "text",
            NodeType::Other(name) => name,
        }
    }

    /// Heading kind for a level (1-6).
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(NodeType::Heading1),
            2 => Some(NodeType::Heading2),
            3 => Some(NodeType::Heading3),
            4 => Some(NodeType::Heading4),
            5 => Some(NodeType::Heading5),
            6 => Some(NodeType::Heading6),
            _ => None,
        }
    }

    /// Heading level (1-6), or `None` for non-heading kinds.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            NodeType::Heading1 => Some(1),
            NodeType::Heading2 => Some(2),
            NodeType::Heading3 => Some(3),
            NodeType::Heading4 => Some(4),
            NodeType::Heading5 => Some(5),
            NodeType::Heading6 => Some(6),
            _ => None,
        }
    }
}

impl From<&str> for NodeType {
    fn from(name: &str) -> Self {
        match name {
            "document" => NodeType::Document,
            "paragraph" => NodeType::Paragraph,
            "heading-1" => NodeType::Heading1,
            "heading-2" => NodeType::Heading2,
            "heading-3" => NodeType::Heading3,
            "heading-4" => NodeType::Heading4,
            "heading-5" => NodeType::Heading5,
            "heading-6" => NodeType::Heading6,
            "ordered-list" => NodeType::OrderedList,
            "unordered-list" => NodeType::UnorderedList,
            "list-item" => NodeType::ListItem,
            "hr" => NodeType::HorizontalRule,
            "blockquote" => NodeType::Blockquote,
            "table" => NodeType::Table,
            "table-row" => NodeType::TableRow,
            "table-cell" => NodeType::TableCell,
            "table-header-cell" => NodeType::TableHeaderCell,
            "embedded-entry-block" => NodeType::EmbeddedEntryBlock,
            "embedded-asset-block" => NodeType::EmbeddedAssetBlock,
            "hyperlink" => NodeType::Hyperlink,
            "entry-hyperlink" => NodeType::EntryHyperlink,
            "asset-hyperlink" => NodeType::AssetHyperlink,
            "embedded-entry-inline" => NodeType::EmbeddedEntryInline,
            "text" => NodeType::Text,
            other => NodeType::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        NodeType::from(name.as_str())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

/// Inline formatting kind applied to a text node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkType {
    Bold,
    Italic,
    Underline,
    Code,
    Superscript,
    Subscript,
    /// A mark this crate has not been taught yet
    Other(String),
}

impl MarkType {
    /// Wire name of this mark.
    pub fn as_str(&self) -> &str {
        match self {
            MarkType::Bold => "bold",
            MarkType::Italic => "italic",
            MarkType::Underline => "underline",
            MarkType::Code => "code",
            MarkType::Superscript => "superscript",
            MarkType::Subscript => "subscript",
            MarkType::Other(name) => name,
        }
    }
}

impl From<&str> for MarkType {
    fn from(name: &str) -> Self {
        match name {
            "bold" => MarkType::Bold,
            "italic" => MarkType::Italic,
            "underline" => MarkType::Underline,
            "code" => MarkType::Code,
            "superscript" => MarkType::Superscript,
            "subscript" => MarkType::Subscript,
            other => MarkType::Other(other.to_string()),
        }
    }
}

impl From<String> for MarkType {
    fn from(name: String) -> Self {
        MarkType::from(name.as_str())
    }
}

impl From<MarkType> for String {
    fn from(mark: MarkType) -> Self {
        mark.as_str().to_string()
    }
}

/// A mark reference on a text node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: MarkType,
}

impl From<MarkType> for Mark {
    fn from(mark_type: MarkType) -> Self {
        Self { mark_type }
    }
}

/// A text leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    /// Raw text, never escaped
    pub value: String,
    /// Marks, applied in order
    pub marks: Vec<Mark>,
    pub data: NodeData,
}

impl Text {
    /// Create an unmarked text leaf.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// Create a text leaf carrying the given marks.
    pub fn with_marks(value: impl Into<String>, marks: impl IntoIterator<Item = MarkType>) -> Self {
        Self {
            value: value.into(),
            marks: marks.into_iter().map(Mark::from).collect(),
            data: NodeData::new(),
        }
    }
}

/// A container node. Every kind except `text` is a container, even with
/// no children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub node_type: NodeType,
    pub data: NodeData,
    /// Children in reading order
    pub content: Vec<Node>,
}

impl Element {
    /// Create a container with the given children and empty data.
    pub fn new(node_type: NodeType, content: Vec<Node>) -> Self {
        Self {
            node_type,
            data: NodeData::new(),
            content,
        }
    }

    /// Attach a data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Attach a link target (`data.target.sys.id`).
    pub fn with_target(self, id: impl Into<String>) -> Self {
        let id: String = id.into();
        self.with_data(
            "target",
            serde_json::json!({ "sys": { "id": id, "type": "Link" } }),
        )
    }

    /// Identifier of the referenced entity, if any.
    pub fn target_id(&self) -> Option<&str> {
        self.data
            .get("target")?
            .get("sys")?
            .get("id")?
            .as_str()
    }

    /// Hyperlink URI, only when it is a string.
    pub fn uri(&self) -> Option<&str> {
        self.data.get("uri")?.as_str()
    }
}

/// A node of the rich-text tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum Node {
    Text(Text),
    Element(Element),
}

impl Node {
    /// Create an unmarked text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text::new(value))
    }

    /// Create a text node with marks.
    pub fn marked(value: impl Into<String>, marks: impl IntoIterator<Item = MarkType>) -> Self {
        Node::Text(Text::with_marks(value, marks))
    }

    /// Create a container node.
    pub fn element(node_type: NodeType, content: Vec<Node>) -> Self {
        Node::Element(Element::new(node_type, content))
    }

    /// Create a `document` root.
    pub fn document(content: Vec<Node>) -> Self {
        Self::element(NodeType::Document, content)
    }

    /// Parse a rich-text document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a rich-text document from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Kind of this node.
    pub fn node_type(&self) -> &NodeType {
        match self {
            Node::Text(_) => &NodeType::Text,
            Node::Element(element) => &element.node_type,
        }
    }

    /// Children of a container; empty for text.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Text(_) => &[],
            Node::Element(element) => &element.content,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// Wire shape shared by text and container nodes.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    node_type: NodeType,
    #[serde(default)]
    data: NodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marks: Option<Vec<Mark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Vec<Node>>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        match raw.node_type {
            NodeType::Text => Node::Text(Text {
                value: raw.value.unwrap_or_default(),
                marks: raw.marks.unwrap_or_default(),
                data: raw.data,
            }),
            node_type => Node::Element(Element {
                node_type,
                data: raw.data,
                content: raw.content.unwrap_or_default(),
            }),
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Text(text) => RawNode {
                node_type: NodeType::Text,
                data: text.data,
                value: Some(text.value),
                marks: Some(text.marks),
                content: None,
            },
            Node::Element(element) => RawNode {
                node_type: element.node_type,
                data: element.data,
                value: None,
                marks: None,
                content: Some(element.content),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_document() {
        let doc = Node::from_value(json!({
            "nodeType": "document",
            "data": {},
            "content": [{
                "nodeType": "paragraph",
                "data": {},
                "content": [{
                    "nodeType": "text",
                    "value": "Hello",
                    "marks": [{ "type": "bold" }, { "type": "italic" }],
                    "data": {}
                }]
            }]
        }))
        .unwrap();

        assert_eq!(doc.node_type(), &NodeType::Document);
        let paragraph = &doc.children()[0];
        assert_eq!(paragraph.node_type(), &NodeType::Paragraph);
        match &paragraph.children()[0] {
            Node::Text(text) => {
                assert_eq!(text.value, "Hello");
                assert_eq!(text.marks[0].mark_type, MarkType::Bold);
                assert_eq!(text.marks[1].mark_type, MarkType::Italic);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kinds_are_preserved() {
        let node = Node::from_value(json!({
            "nodeType": "embedded-resource-block",
            "data": {},
            "content": [{ "nodeType": "text", "value": "x", "marks": [{ "type": "strikethrough" }] }]
        }))
        .unwrap();

        assert_eq!(
            node.node_type(),
            &NodeType::Other("embedded-resource-block".to_string())
        );
        match &node.children()[0] {
            Node::Text(text) => {
                assert_eq!(text.marks[0].mark_type, MarkType::Other("strikethrough".into()))
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let node = Node::from_json(r#"{"nodeType":"hr"}"#).unwrap();
        assert!(node.children().is_empty());

        let node = Node::from_json(r#"{"nodeType":"text"}"#).unwrap();
        assert_eq!(node, Node::text(""));
    }

    #[test]
    fn test_target_and_uri() {
        let embed = Element::new(NodeType::EmbeddedEntryBlock, vec![]).with_target("entry-1");
        assert_eq!(embed.target_id(), Some("entry-1"));

        let link = Element::new(NodeType::Hyperlink, vec![]).with_data("uri", json!(42));
        assert_eq!(link.uri(), None);

        let link = Element::new(NodeType::Hyperlink, vec![])
            .with_data("uri", json!("https://example.com"));
        assert_eq!(link.uri(), Some("https://example.com"));
    }

    #[test]
    fn test_serialize_wire_shape() {
        let doc = Node::document(vec![Node::element(
            NodeType::Heading2,
            vec![Node::marked("Title", [MarkType::Code])],
        )]);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["nodeType"], "document");
        assert_eq!(value["content"][0]["nodeType"], "heading-2");
        assert_eq!(value["content"][0]["content"][0]["value"], "Title");
        assert_eq!(value["content"][0]["content"][0]["marks"][0]["type"], "code");
        assert!(value["content"][0]["content"][0].get("content").is_none());
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=6 {
            let kind = NodeType::heading(level).unwrap();
            assert_eq!(kind.heading_level(), Some(level));
            assert_eq!(kind.as_str(), format!("heading-{}", level));
        }
        assert_eq!(NodeType::heading(7), None);
        assert_eq!(NodeType::Paragraph.heading_level(), None);
    }
}
