//! Rich-text rendering.
//!
//! A rich-text tree is rendered by a table-driven walker (see [`walker`])
//! parameterised with a [`Profile`]. Two profiles ship with the crate:
//!
//! - [`html`]: one tag per block and mark, text emitted unescaped.
//! - [`markdown`]: a Markdown-like dialect built on top of the HTML tables,
//!   with list numbering and table layout driven by a per-render
//!   [`MarkdownContext`].
//!
//! # Example
//!
//! ```
//! use ctfexport::model::{MarkType, Node, NodeType};
//! use ctfexport::render;
//!
//! let doc = Node::document(vec![Node::element(
//!     NodeType::Paragraph,
//!     vec![Node::marked("Hello", [MarkType::Bold])],
//! )]);
//!
//! assert_eq!(render::to_html(&doc), "<p><b>Hello</b></p>");
//! assert_eq!(render::to_markdown(&doc), "**Hello**\n\n\n");
//! ```
//!
//! Either profile can be partially overridden without touching the walker:
//!
//! ```
//! use ctfexport::model::{Node, NodeType};
//! use ctfexport::render::{self, Profile};
//!
//! let profile = render::markdown::profile().merge(
//!     Profile::empty().with_node(NodeType::HorizontalRule, |_, _| "***\n".to_string()),
//! );
//! let doc = Node::document(vec![Node::element(NodeType::HorizontalRule, vec![])]);
//! assert_eq!(render::to_markdown_with(&doc, &profile), "***\n\n");
//! ```

pub mod html;
pub mod markdown;
pub mod walker;

pub use markdown::MarkdownContext;
pub use walker::{MarkRenderer, MarkTable, NodeRenderer, NodeTable, Profile, Renderer};

use crate::model::Node;

/// Render a rich-text tree to HTML.
pub fn to_html(doc: &Node) -> String {
    to_html_with(doc, &html::profile())
}

/// Render a rich-text tree to HTML with a custom profile.
pub fn to_html_with(doc: &Node, profile: &Profile<()>) -> String {
    profile.render_node(doc, ())
}

/// Render a rich-text tree to the Markdown dialect.
pub fn to_markdown(doc: &Node) -> String {
    to_markdown_with(doc, &markdown::profile())
}

/// Render a rich-text tree to Markdown with a custom profile. Each call gets
/// its own [`MarkdownContext`].
pub fn to_markdown_with(doc: &Node, profile: &Profile<MarkdownContext>) -> String {
    profile.render_node(doc, MarkdownContext::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarkType, NodeType};
    use std::sync::Arc;

    #[test]
    fn test_plain_text_identical_in_both_profiles() {
        let text = Node::text("  <i>raw</i> & \"quoted\"\n");
        assert_eq!(to_html(&text), "  <i>raw</i> & \"quoted\"\n");
        assert_eq!(to_markdown(&text), "  <i>raw</i> & \"quoted\"\n");
    }

    #[test]
    fn test_document_html() {
        let doc = Node::document(vec![Node::element(
            NodeType::Paragraph,
            vec![Node::text("a "), Node::marked("b", [MarkType::Italic])],
        )]);
        assert_eq!(to_html(&doc), "<p>a <i>b</i></p>");
    }

    #[test]
    fn test_concurrent_renders_do_not_share_state() {
        let list = |n: usize| {
            Node::document(vec![Node::element(
                NodeType::OrderedList,
                (0..n)
                    .map(|i| {
                        Node::element(
                            NodeType::ListItem,
                            vec![Node::element(
                                NodeType::Paragraph,
                                vec![Node::text(format!("item {}", i))],
                            )],
                        )
                    })
                    .collect(),
            )])
        };
        let profile = Arc::new(markdown::profile());
        let docs: Vec<Node> = (1..=8).map(list).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = docs
                .iter()
                .map(|doc| {
                    let profile = Arc::clone(&profile);
                    scope.spawn(move || to_markdown_with(doc, &profile))
                })
                .collect();

            for (n, handle) in (1..=8).zip(handles) {
                let out = handle.join().unwrap();
                assert!(out.starts_with("1. item 0"));
                assert!(out.contains(&format!("{}. item {}", n, n - 1)));
                assert!(!out.contains(&format!("{}.", n + 1)));
            }
        });
    }
}
