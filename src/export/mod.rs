//! Entry export: from entry ids to spreadsheet rows.
//!
//! An export fetches the requested entries (and, when recursive, everything
//! they link to), then writes one row per non-empty field with one column per
//! locale:
//!
//! | id   | model | field | en-US      | de-DE        |
//! |------|-------|-------|------------|--------------|
//! | home | page  | title | Home       | Startseite   |
//! |      | page  | body  | json:{...} | json:{...}   |
//!
//! # Example
//!
//! ```
//! use ctfexport::export::{export_entries, ExportOptions};
//! use ctfexport::model::{ContentType, Entry, FieldDefinition, FieldType};
//! use ctfexport::source::ExportFile;
//! use serde_json::json;
//!
//! let source = ExportFile::from_parts(
//!     vec![ContentType::new("page", vec![FieldDefinition::new("title", FieldType::Symbol)])],
//!     vec![Entry::new("home", "page").with_field("title", "en-US", json!("Home"))],
//!     vec!["en-US".to_string()],
//! );
//!
//! let export = export_entries(&source, &["home".to_string()], &ExportOptions::new())?;
//! assert_eq!(export.rows.len(), 1);
//! assert_eq!(export.rows[0].field, "title");
//! # Ok::<(), ctfexport::Error>(())
//! ```

mod format;
mod references;

pub use format::{format_value, RichTextFormat};
pub use references::{
    find_all_linked_references, find_all_linked_references_in, find_references_in_entry,
    LinkedReferences, References, Visit, VisitOutcome,
};

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::model::{ContentType, Entry};
use crate::source::{CachedSource, EntrySource};
use crate::xlsx::{Workbook, Worksheet};

/// Locale whose value decides whether a field gets a row.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Worksheet name used when none is given.
pub const DEFAULT_SHEET_NAME: &str = "entries";

/// Field name of the extra tags row.
pub const METADATA_FIELD: &str = "metadata";

/// Options for an export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Locale columns; empty means every locale of the source
    pub locales: Vec<String>,

    /// Locale that must hold a value for a field to be exported
    pub default_locale: String,

    /// How rich-text fields are written
    pub rich_text: RichTextFormat,

    /// Follow entry links and export linked entries too
    pub recursive: bool,

    /// Content types the recursive walk does not enter
    pub exclude_content_types: Vec<String>,

    /// Field ids to export; empty means all fields
    pub field_filter: Vec<String>,

    /// Worksheet name
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            locales: Vec::new(),
            default_locale: DEFAULT_LOCALE.to_string(),
            rich_text: RichTextFormat::Json,
            recursive: false,
            exclude_content_types: Vec::new(),
            field_filter: Vec::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl ExportOptions {
    /// Create default export options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the export to these locales.
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        self
    }

    /// Set the locale that decides which fields are exported.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Set the rich-text cell format.
    pub fn with_rich_text(mut self, format: RichTextFormat) -> Self {
        self.rich_text = format;
        self
    }

    /// Enable or disable recursive export.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Skip these content types while walking references.
    pub fn with_excluded_types(mut self, content_types: Vec<String>) -> Self {
        self.exclude_content_types = content_types;
        self
    }

    /// Export only these fields.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.field_filter = fields;
        self
    }

    /// Set the worksheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }
}

/// One spreadsheet row: a single field of a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Entry id; only set on the first row of an entry
    pub id: String,
    pub model: String,
    pub field: String,
    /// Formatted value per locale, in locale order
    pub values: Vec<(String, String)>,
}

impl Row {
    /// Cell values keyed by column: `id`, `model`, `field`, then locales.
    pub fn record(&self) -> Vec<(String, String)> {
        let mut record = vec![
            ("id".to_string(), self.id.clone()),
            ("model".to_string(), self.model.clone()),
            ("field".to_string(), self.field.clone()),
        ];
        record.extend(self.values.iter().cloned());
        record
    }
}

/// The result of an export.
#[derive(Debug, Clone, Default)]
pub struct Export {
    pub rows: Vec<Row>,
    /// Entry ids exported, in output order
    pub entries: Vec<String>,
    /// Requested or linked ids the source did not return
    pub missing: Vec<String>,
    /// Asset ids seen during a recursive walk
    pub assets: Vec<String>,
    /// Walk log of a recursive export
    pub visits: Vec<Visit>,
    /// Locale columns used
    pub locales: Vec<String>,
    pub sheet_name: String,
}

impl Export {
    /// True when no rows were produced.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lay the rows out on a single worksheet.
    pub fn to_worksheet(&self) -> Result<Worksheet> {
        Worksheet::from_records(&self.sheet_name, self.rows.iter().map(Row::record))
    }

    /// Build a one-sheet workbook.
    pub fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        workbook.add_sheet(self.to_worksheet()?)?;
        Ok(workbook)
    }
}

/// Split a comma-separated id list, trimming blanks and dropping repeats.
pub fn parse_entry_ids(input: &str) -> Vec<String> {
    unique(input.split(',').map(str::trim).filter(|id| !id.is_empty()))
}

fn unique<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.as_ref().to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Export entries into rows.
///
/// Ids are de-duplicated keeping the first occurrence. Entries appear in the
/// order they were requested (for recursive exports: in walk order).
pub fn export_entries<S: EntrySource>(
    source: &S,
    entry_ids: &[String],
    options: &ExportOptions,
) -> Result<Export> {
    let source = CachedSource::new(source);
    let mut export = Export {
        sheet_name: options.sheet_name.clone(),
        ..Default::default()
    };

    let mut ids = unique(entry_ids);
    if options.recursive {
        let mut linked = Vec::new();
        let mut assets = Vec::new();
        for id in &ids {
            let found = find_all_linked_references_in(
                &source,
                id,
                &options.exclude_content_types,
                &options.default_locale,
            );
            linked.extend(found.entries);
            assets.extend(found.assets);
            export.visits.extend(found.visits);
        }
        ids = unique(linked);
        export.assets = unique(assets);
    }

    if ids.is_empty() {
        return Ok(export);
    }

    export.locales = if options.locales.is_empty() {
        source.locales()?
    } else {
        options.locales.clone()
    };
    if export.locales.is_empty() {
        export.locales.push(options.default_locale.clone());
    }

    let content_types: HashMap<String, ContentType> = source
        .content_types()?
        .into_iter()
        .map(|ct| (ct.id().to_string(), ct))
        .collect();

    let mut fetched: HashMap<String, Entry> = source
        .entries(&ids)?
        .into_iter()
        .map(|e| (e.id().to_string(), e))
        .collect();

    for id in ids {
        match fetched.remove(&id) {
            Some(entry) => {
                let content_type = content_types.get(entry.content_type_id());
                export
                    .rows
                    .extend(entry_rows(&entry, content_type, &export.locales, options));
                export.entries.push(id);
            }
            None => export.missing.push(id),
        }
    }

    Ok(export)
}

/// Rows for one entry.
fn entry_rows(
    entry: &Entry,
    content_type: Option<&ContentType>,
    locales: &[String],
    options: &ExportOptions,
) -> Vec<Row> {
    let mut rows = Vec::new();
    let model = content_type.map(|ct| ct.id()).unwrap_or_default();
    let mut id = entry.id().to_string();

    let fields = content_type
        .map(|ct| ct.filtered_fields(&options.field_filter))
        .unwrap_or_default();

    for field in fields {
        let has_default = entry
            .field(&field.id, &options.default_locale)
            .is_some_and(|v| !v.is_null());
        if !has_default {
            continue;
        }

        let values = locales
            .iter()
            .filter_map(|locale| {
                let value = entry.field(&field.id, locale)?;
                let cell = format_value(value, &field.field_type, options.rich_text)?;
                Some((locale.clone(), cell))
            })
            .collect();

        rows.push(Row {
            id: std::mem::take(&mut id),
            model: model.to_string(),
            field: field.id.clone(),
            values,
        });
    }

    let tags = entry.tag_ids();
    if !tags.is_empty() {
        rows.push(Row {
            id,
            model: entry.content_type_id().to_string(),
            field: METADATA_FIELD.to_string(),
            values: vec![(
                options.default_locale.clone(),
                format!("tags:{}", tags.join(",")),
            )],
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDefinition, FieldType};
    use crate::source::tests::MemorySource;
    use serde_json::{json, Value};

    fn link(id: &str) -> Value {
        json!({ "sys": { "id": id, "type": "Link", "linkType": "Entry" } })
    }

    fn page_type() -> ContentType {
        ContentType::new(
            "page",
            vec![
                FieldDefinition::new("title", FieldType::Symbol),
                FieldDefinition::new("views", FieldType::Integer),
                FieldDefinition::new("next", FieldType::Link),
            ],
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_entry_ids() {
        assert_eq!(parse_entry_ids(" a, b,,a ,c "), ids(&["a", "b", "c"]));
        assert!(parse_entry_ids(" , ").is_empty());
    }

    #[test]
    fn test_rows_for_entry() {
        let source = MemorySource {
            entries: vec![Entry::new("home", "page")
                .with_field("title", "en-US", json!("Home"))
                .with_field("title", "de-DE", json!("Startseite"))
                .with_field("views", "en-US", json!(3))
                .with_field("next", "de-DE", link("x"))],
            content_types: vec![page_type()],
            ..Default::default()
        };
        let options = ExportOptions::new().with_locales(ids(&["en-US", "de-DE"]));

        let export = export_entries(&source, &ids(&["home"]), &options).unwrap();
        assert_eq!(
            export.rows,
            vec![
                Row {
                    id: "home".into(),
                    model: "page".into(),
                    field: "title".into(),
                    values: vec![
                        ("en-US".into(), "Home".into()),
                        ("de-DE".into(), "Startseite".into())
                    ],
                },
                Row {
                    id: String::new(),
                    model: "page".into(),
                    field: "views".into(),
                    values: vec![("en-US".into(), "number:3".into())],
                },
            ]
        );
        assert_eq!(export.entries, ids(&["home"]));
    }

    #[test]
    fn test_metadata_row() {
        let source = MemorySource {
            entries: vec![Entry::new("e", "page").with_tags(["news", "featured"])],
            content_types: vec![page_type()],
            ..Default::default()
        };

        let export = export_entries(&source, &ids(&["e"]), &ExportOptions::new()).unwrap();
        assert_eq!(export.rows.len(), 1);
        let row = &export.rows[0];
        assert_eq!(row.id, "e");
        assert_eq!(row.field, METADATA_FIELD);
        assert_eq!(row.values, vec![("en-US".into(), "tags:news,featured".into())]);
    }

    #[test]
    fn test_request_order_and_missing() {
        let source = MemorySource {
            entries: vec![
                Entry::new("a", "page").with_field("title", "en-US", json!("A")),
                Entry::new("b", "page").with_field("title", "en-US", json!("B")),
            ],
            content_types: vec![page_type()],
            ..Default::default()
        };

        let export = export_entries(&source, &ids(&["b", "zzz", "a", "b"]), &ExportOptions::new()).unwrap();
        assert_eq!(export.entries, ids(&["b", "a"]));
        assert_eq!(export.missing, ids(&["zzz"]));
        assert_eq!(export.locales, ids(&["en-US"]));
    }

    #[test]
    fn test_recursive_export() {
        let source = MemorySource {
            entries: vec![
                Entry::new("a", "page")
                    .with_field("title", "en-US", json!("A"))
                    .with_field("next", "en-US", link("b")),
                Entry::new("b", "page").with_field("title", "en-US", json!("B")),
            ],
            content_types: vec![page_type()],
            ..Default::default()
        };
        let options = ExportOptions::new().with_recursive(true);

        let export = export_entries(&source, &ids(&["a"]), &options).unwrap();
        assert_eq!(export.entries, ids(&["a", "b"]));
        assert_eq!(export.visits.len(), 2);

        let fields: Vec<&str> = export.rows.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "next", "title"]);
        assert_eq!(export.rows[1].values, vec![("en-US".into(), "link:b".into())]);

        // the walk already fetched both entries
        assert_eq!(source.lookups.get(), 2);
    }

    #[test]
    fn test_field_filter() {
        let source = MemorySource {
            entries: vec![Entry::new("a", "page")
                .with_field("title", "en-US", json!("A"))
                .with_field("views", "en-US", json!(1))],
            content_types: vec![page_type()],
            ..Default::default()
        };
        let options = ExportOptions::new().with_fields(ids(&["views"]));

        let export = export_entries(&source, &ids(&["a"]), &options).unwrap();
        assert_eq!(export.rows.len(), 1);
        assert_eq!(export.rows[0].field, "views");
        assert_eq!(export.rows[0].id, "a");
    }

    #[test]
    fn test_unknown_content_type() {
        let source = MemorySource {
            entries: vec![Entry::new("a", "ghost").with_field("title", "en-US", json!("A"))],
            ..Default::default()
        };
        let export = export_entries(&source, &ids(&["a"]), &ExportOptions::new()).unwrap();
        assert!(export.is_empty());
        assert_eq!(export.entries, ids(&["a"]));
    }

    #[test]
    fn test_to_workbook() {
        let source = MemorySource {
            entries: vec![Entry::new("a", "page").with_field("title", "en-US", json!("A"))],
            content_types: vec![page_type()],
            ..Default::default()
        };
        let export = export_entries(&source, &ids(&["a"]), &ExportOptions::new()).unwrap();
        let sheet = export.to_worksheet().unwrap();

        let keys: Vec<&str> = sheet.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "model", "field", "en-US"]);
        assert_eq!(sheet.rows, vec![ids(&["a", "page", "title", "A"])]);

        let workbook = export.to_workbook().unwrap();
        assert_eq!(workbook.sheets()[0].name(), DEFAULT_SHEET_NAME);
    }
}
