//! # ctfexport
//!
//! Export CMS entries to Excel workbooks, and render rich-text fields to
//! HTML or Markdown.
//!
//! ## Quick Start
//!
//! ```
//! use ctfexport::{rich_text_to_html, rich_text_to_markdown};
//!
//! let json = r#"{
//!     "nodeType": "document", "data": {},
//!     "content": [{
//!         "nodeType": "heading-2", "data": {},
//!         "content": [{ "nodeType": "text", "value": "Title", "marks": [], "data": {} }]
//!     }]
//! }"#;
//!
//! assert_eq!(rich_text_to_html(json)?, "<h2>Title</h2>");
//! assert_eq!(rich_text_to_markdown(json)?, "## Title\n\n");
//! # Ok::<(), ctfexport::Error>(())
//! ```
//!
//! ## Exporting entries
//!
//! ```no_run
//! use ctfexport::export::{export_entries, ExportOptions, RichTextFormat};
//! use ctfexport::source::ContentfulClient;
//! use ctfexport::Config;
//!
//! let config = Config::load(Config::default_path())?.apply_env();
//! let client = ContentfulClient::from_config(&config)?;
//!
//! let options = ExportOptions::new()
//!     .with_recursive(true)
//!     .with_rich_text(RichTextFormat::Markdown);
//! let export = export_entries(&client, &["6x2aVZ1J8nLsmhw0Q3VYmb".to_string()], &options)?;
//! export.to_workbook()?.save("export.xlsx")?;
//! # Ok::<(), ctfexport::Error>(())
//! ```
//!
//! ## Features
//!
//! - `client` (default): blocking Content Management API client

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod source;
pub mod xlsx;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use export::{export_entries, Export, ExportOptions, RichTextFormat, Row};
pub use model::{Element, Entry, MarkType, Node, NodeType, Text};
pub use render::{to_html, to_markdown, MarkdownContext, Profile, Renderer};
pub use source::{CachedSource, EntrySource, ExportFile};
pub use xlsx::{Workbook, Worksheet};

/// Parse a rich-text JSON document and render it to HTML.
///
/// # Example
///
/// ```
/// let html = ctfexport::rich_text_to_html(
///     r#"{"nodeType":"document","data":{},"content":[{"nodeType":"hr","data":{},"content":[]}]}"#,
/// )?;
/// assert_eq!(html, "<hr/>");
/// # Ok::<(), ctfexport::Error>(())
/// ```
pub fn rich_text_to_html(json: &str) -> Result<String> {
    let doc = Node::from_json(json)?;
    Ok(render::to_html(&doc))
}

/// Parse a rich-text JSON document and render it to Markdown.
pub fn rich_text_to_markdown(json: &str) -> Result<String> {
    let doc = Node::from_json(json)?;
    Ok(render::to_markdown(&doc))
}
