//! Markdown profile.
//!
//! Built from the HTML profile by overriding block handlers and the
//! bold/italic/code marks. Kinds it does not override (hyperlinks,
//! reference placeholders, underline/superscript/subscript) keep their HTML
//! rendering, so the output is Markdown with inline HTML.
//!
//! List numbering and table layout depend on ancestors. That state lives in
//! [`MarkdownContext`], which is created fresh for every top-level render.

use super::html;
use super::walker::{MarkTable, NodeTable, Profile, Renderer};
use crate::model::{Element, MarkType, NodeType};

/// Literal emitted for a horizontal rule.
pub const RULE: &str = "----------\n";

/// Line break used where a newline would end a table row.
const INLINE_BREAK: &str = "<br/>";

/// Render-local state for the Markdown profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownContext {
    /// Items are numbered; unordered lists leave this untouched
    pub in_ordered_list: bool,
    /// Number of the next item of the innermost ordered list
    pub counter: u32,
    /// Inside a table
    pub in_table: bool,
    /// Rendering the first row of the innermost table
    pub in_table_header: bool,
    /// Column count of the innermost table, from its first row
    pub table_columns: usize,
}

type Md<'p> = Renderer<'p, MarkdownContext>;

/// Node handlers that replace the HTML defaults.
pub fn node_overrides() -> NodeTable<MarkdownContext> {
    let mut table = NodeTable::new();

    table.insert(NodeType::Document, document);
    table.insert(NodeType::Paragraph, paragraph);
    for level in 1..=6u8 {
        if let Some(kind) = NodeType::heading(level) {
            table.insert(kind, move |node: &Element, r: &mut Md<'_>| {
                format!("{} {}\n", "#".repeat(level as usize), r.next(&node.content))
            });
        }
    }
    table.insert(NodeType::OrderedList, ordered_list);
    table.insert(NodeType::UnorderedList, unordered_list);
    table.insert(NodeType::ListItem, list_item);
    table.insert(NodeType::HorizontalRule, |_: &Element, _: &mut Md<'_>| {
        RULE.to_string()
    });
    table.insert(NodeType::Blockquote, blockquote);
    table.insert(NodeType::EmbeddedEntryBlock, |node: &Element, _: &mut Md<'_>| {
        embed_placeholder(node)
    });
    table.insert(NodeType::EmbeddedAssetBlock, |node: &Element, _: &mut Md<'_>| {
        embed_placeholder(node)
    });
    table.insert(NodeType::Table, table_block);
    table.insert(NodeType::TableRow, |node: &Element, r: &mut Md<'_>| {
        format!("| {}\n", r.next(&node.content))
    });
    table.insert(NodeType::TableCell, table_cell);
    table.insert(NodeType::TableHeaderCell, table_cell);

    table
}

/// Mark renderers that replace the HTML defaults.
pub fn mark_overrides() -> MarkTable {
    let mut table = MarkTable::new();
    table.insert(MarkType::Bold, |text: &str| wrap_trimmed(text, "**"));
    table.insert(MarkType::Italic, |text: &str| wrap_trimmed(text, "_"));
    table.insert(MarkType::Code, |text: &str| format!("`{}`", text));
    table
}

/// The Markdown profile: HTML defaults with the Markdown overrides merged in.
pub fn profile() -> Profile<MarkdownContext> {
    html::profile().merge(Profile::new(node_overrides(), mark_overrides()))
}

/// One trailing newline after the children, also for an empty document.
fn document(node: &Element, r: &mut Md<'_>) -> String {
    format!("{}\n", r.next(&node.content))
}

fn paragraph(node: &Element, r: &mut Md<'_>) -> String {
    let text = r.next(&node.content);
    if r.context.in_table {
        format!("{}{}", text, INLINE_BREAK)
    } else {
        format!("{}\n\n", text)
    }
}

fn ordered_list(node: &Element, r: &mut Md<'_>) -> String {
    let outer = (r.context.in_ordered_list, r.context.counter);
    r.context.in_ordered_list = true;
    r.context.counter = 1;

    let output = format!("{}\n", r.next(&node.content));

    (r.context.in_ordered_list, r.context.counter) = outer;
    output
}

/// Carries no list state: items nested in an ordered item keep numbering.
fn unordered_list(node: &Element, r: &mut Md<'_>) -> String {
    format!("{}\n", r.next(&node.content))
}

fn list_item(node: &Element, r: &mut Md<'_>) -> String {
    let ordered = r.context.in_ordered_list;
    let marker = if ordered {
        format!("{}.", r.context.counter)
    } else {
        " *".to_string()
    };

    let body = r.next(&node.content);
    if ordered {
        r.context.counter += 1;
    }
    format!("{} {}", marker, body)
}

fn blockquote(node: &Element, r: &mut Md<'_>) -> String {
    let inner = r.next(&node.content);
    let quoted = inner
        .split('\n')
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n", quoted)
}

fn embed_placeholder(node: &Element) -> String {
    format!(
        "![{}]({})",
        node.node_type.as_str(),
        node.target_id().unwrap_or_default()
    )
}

/// The first row is always the header row, whatever its cells are.
fn table_block(node: &Element, r: &mut Md<'_>) -> String {
    let Some((header_row, body_rows)) = node.content.split_first() else {
        return String::new();
    };

    let outer = (
        r.context.in_table,
        r.context.in_table_header,
        r.context.table_columns,
    );
    let columns = header_row.children().len();
    r.context.in_table = true;
    r.context.table_columns = columns;

    r.context.in_table_header = true;
    let header = r.next(std::slice::from_ref(header_row));
    r.context.in_table_header = false;

    let separator = format!("|{}\n", "--|".repeat(columns));
    let body = r.next(body_rows);

    (
        r.context.in_table,
        r.context.in_table_header,
        r.context.table_columns,
    ) = outer;

    format!("{}{}{}\n", header, separator, body)
}

/// Header cells stay on one line so the separator row lines up.
fn table_cell(node: &Element, r: &mut Md<'_>) -> String {
    let text = r.next(&node.content);
    let line_break = if r.context.in_table_header {
        ""
    } else {
        INLINE_BREAK
    };
    format!(" {} |", text.replace('\n', line_break))
}

/// Wrap trimmed text in `delimiter`; whitespace-only text renders to nothing.
fn wrap_trimmed(text: &str, delimiter: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{delimiter}{trimmed}{delimiter}")
}
