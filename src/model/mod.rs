//! Data model for CMS content.
//!
//! Entries, assets and content types mirror the JSON the CMS delivers.
//! Rich-text field values are parsed into the [`Node`] tree that the
//! renderers in [`crate::render`] walk.

mod content_type;
mod entry;
mod rich_text;

pub use content_type::*;
pub use entry::*;
pub use rich_text::*;
