//! HTML profile: the default node and mark tables.
//!
//! Text is emitted without HTML escaping. Rich-text content comes from a
//! trusted CMS and is exported for round-trip editing, so the raw value is
//! kept exactly as authored. Only the `href` attribute quotes are escaped so
//! the tag itself stays well-formed.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::walker::{MarkTable, NodeTable, Profile, Renderer};
use crate::model::{Element, MarkType, NodeType};

/// Characters `encodeURIComponent` leaves alone: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Block kinds rendered as a single wrapping tag.
fn wrapping_tags() -> [(NodeType, &'static str); 16] {
    [
        (NodeType::Paragraph, "p"),
        (NodeType::Heading1, "h1"),
        (NodeType::Heading2, "h2"),
        (NodeType::Heading3, "h3"),
        (NodeType::Heading4, "h4"),
        (NodeType::Heading5, "h5"),
        (NodeType::Heading6, "h6"),
        (NodeType::EmbeddedEntryBlock, "div"),
        (NodeType::UnorderedList, "ul"),
        (NodeType::OrderedList, "ol"),
        (NodeType::ListItem, "li"),
        (NodeType::Blockquote, "blockquote"),
        (NodeType::Table, "table"),
        (NodeType::TableRow, "tr"),
        (NodeType::TableHeaderCell, "th"),
        (NodeType::TableCell, "td"),
    ]
}

fn mark_tags() -> [(MarkType, &'static str); 6] {
    [
        (MarkType::Bold, "b"),
        (MarkType::Italic, "i"),
        (MarkType::Underline, "u"),
        (MarkType::Code, "code"),
        (MarkType::Superscript, "sup"),
        (MarkType::Subscript, "sub"),
    ]
}

/// Default node table, usable with any context type.
pub fn node_table<C: 'static>() -> NodeTable<C> {
    let mut table = NodeTable::new();

    table.insert(NodeType::Document, |node: &Element, r: &mut Renderer<'_, C>| {
        r.next(&node.content)
    });

    for (kind, tag) in wrapping_tags() {
        table.insert(kind, move |node: &Element, r: &mut Renderer<'_, C>| {
            format!("<{tag}>{}</{tag}>", r.next(&node.content))
        });
    }

    table.insert(NodeType::HorizontalRule, |_: &Element, _: &mut Renderer<'_, C>| {
        "<hr/>".to_string()
    });

    table.insert(NodeType::Hyperlink, |node: &Element, r: &mut Renderer<'_, C>| {
        let href = node.uri().unwrap_or_default();
        format!("<a href={}>{}</a>", attribute_value(href), r.next(&node.content))
    });

    for kind in [
        NodeType::AssetHyperlink,
        NodeType::EntryHyperlink,
        NodeType::EmbeddedEntryInline,
    ] {
        table.insert(kind, |node: &Element, _: &mut Renderer<'_, C>| {
            reference_placeholder(node)
        });
    }

    table
}

/// Default mark table.
pub fn mark_table() -> MarkTable {
    let mut table = MarkTable::new();
    for (kind, tag) in mark_tags() {
        table.insert(kind, move |text: &str| format!("<{tag}>{text}</{tag}>"));
    }
    table
}

/// The HTML profile.
pub fn profile<C: 'static>() -> Profile<C> {
    Profile::new(node_table(), mark_table())
}

/// Quote an attribute value, escaping only `"`.
pub fn attribute_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "&quot;"))
}

/// Inline marker for a reference this profile cannot resolve.
pub fn reference_placeholder(node: &Element) -> String {
    format!(
        "<span>type: {} id: {}</span>",
        encode_uri_component(node.node_type.as_str()),
        encode_uri_component(node.target_id().unwrap_or_default())
    )
}

fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}
