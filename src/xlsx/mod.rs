//! XLSX (Excel) workbook writer.
//!
//! Builds the small subset of SpreadsheetML an export needs: string cells,
//! a bold header row, and column widths fitted to the content.
//!
//! # Example
//!
//! ```no_run
//! use ctfexport::xlsx::{Workbook, Worksheet};
//!
//! let records = vec![
//!     vec![("id".to_string(), "home".to_string()), ("en-US".to_string(), "Home".to_string())],
//!     vec![("id".to_string(), "about".to_string()), ("de-DE".to_string(), "Über".to_string())],
//! ];
//!
//! let mut workbook = Workbook::new();
//! workbook.add_sheet(Worksheet::from_records("entries", records)?)?;
//! workbook.save("entries.xlsx")?;
//! # Ok::<(), ctfexport::Error>(())
//! ```

mod writer;

pub use writer::column_name;

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

/// Widest column the width fitting will produce.
pub const MAX_COLUMN_WIDTH: usize = 200;

/// Extra room given to a header beyond its own text.
const HEADER_PADDING: usize = 6;

/// Longest sheet name the format accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// A worksheet column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Record key the column is filled from
    pub key: String,
    /// Header row text
    pub header: String,
    /// Width in characters
    pub width: f64,
}

/// One sheet of string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    name: String,
    pub columns: Vec<Column>,
    /// Data rows, one cell per column; empty strings are left blank
    pub rows: Vec<Vec<String>>,
}

impl Worksheet {
    /// Create an empty worksheet.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_sheet_name(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            rows: Vec::new(),
        })
    }

    /// Lay out keyed records as rows.
    ///
    /// Columns are the union of all record keys in first-seen order; each
    /// key is its own header. Widths are fitted afterwards.
    pub fn from_records<I, R>(name: impl Into<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (String, String)>,
    {
        let mut sheet = Self::new(name)?;
        let records: Vec<Vec<(String, String)>> =
            records.into_iter().map(|r| r.into_iter().collect()).collect();

        let mut index: HashMap<String, usize> = HashMap::new();
        for (key, _) in records.iter().flatten() {
            if !index.contains_key(key) {
                index.insert(key.clone(), sheet.columns.len());
                sheet.columns.push(Column {
                    key: key.clone(),
                    header: key.clone(),
                    width: 0.0,
                });
            }
        }

        for record in records {
            let mut row = vec![String::new(); sheet.columns.len()];
            for (key, value) in record {
                if let Some(&i) = index.get(&key) {
                    row[i] = value;
                }
            }
            sheet.rows.push(row);
        }

        sheet.adjust_column_widths(MAX_COLUMN_WIDTH);
        Ok(sheet)
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fit every column to its widest cell, but at least header + 6 and at
    /// most `max_width`. Multi-line cells count their longest line.
    pub fn adjust_column_widths(&mut self, max_width: usize) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            let widest = self
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| display_width(cell))
                .max()
                .unwrap_or(0);
            let floor = display_width(&column.header) + HEADER_PADDING;
            column.width = widest.max(floor).min(max_width) as f64;
        }
    }
}

fn display_width(text: &str) -> usize {
    text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0)
}

/// Check a sheet name: 1 to 31 characters, none of `[ ] : * ? / \`.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_LEN || name.contains(INVALID_SHEET_CHARS) {
        return Err(Error::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

/// A workbook of one or more worksheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. Sheet names are unique regardless of case.
    pub fn add_sheet(&mut self, sheet: Worksheet) -> Result<()> {
        let lower = sheet.name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == lower) {
            return Err(Error::InvalidSheetName(sheet.name));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Write the workbook package to a seekable writer and hand it back.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        writer::write_package(self, writer)
    }

    /// Serialize the workbook into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_to(std::io::Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the workbook to a file, replacing it if present.
    ///
    /// An existing file that cannot be opened for writing (typically held
    /// open by a spreadsheet application) fails before anything is written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_writable(path)?;
        let file = File::create(path)?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}

fn check_writable(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    match OpenOptions::new().write(true).open(path) {
        Ok(_) => Ok(()),
        Err(err) => Err(Error::Io(io::Error::new(
            err.kind(),
            format!(
                "{} is locked or not writable, close it and try again: {}",
                path.display(),
                err
            ),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_columns_first_seen_order() {
        let sheet = Worksheet::from_records(
            "entries",
            vec![
                record(&[("id", "a"), ("en-US", "A")]),
                record(&[("id", "b"), ("de-DE", "B"), ("en-US", "BB")]),
            ],
        )
        .unwrap();

        let keys: Vec<&str> = sheet.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "en-US", "de-DE"]);
        assert_eq!(sheet.rows[0], vec!["a", "A", ""]);
        assert_eq!(sheet.rows[1], vec!["b", "BB", "B"]);
    }

    #[test]
    fn test_column_widths() {
        let long = "x".repeat(300);
        let sheet = Worksheet::from_records(
            "s",
            vec![
                record(&[("id", "abc"), ("text", "short"), ("body", &long)]),
                record(&[("id", "a-much-longer-id")]),
                record(&[("text", "line one\nsecond line is longer")]),
            ],
        )
        .unwrap();

        let widths: Vec<f64> = sheet.columns.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![16.0, 21.0, 200.0]);
    }

    #[test]
    fn test_wide_characters() {
        let sheet = Worksheet::from_records("s", vec![record(&[("k", "日本語テキスト")])]).unwrap();
        assert_eq!(sheet.columns[0].width, 14.0);
    }

    #[test]
    fn test_header_floor() {
        let sheet = Worksheet::from_records("s", vec![record(&[("model", "")])]).unwrap();
        assert_eq!(sheet.columns[0].width, 11.0);
    }

    #[test]
    fn test_sheet_name_rules() {
        assert!(validate_sheet_name("entries").is_ok());
        assert!(validate_sheet_name(&"a".repeat(31)).is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name(&"a".repeat(32)).is_err());
        for bad in ["a[b", "a]b", "a:b", "a*b", "a?b", "a/b", "a\\b"] {
            assert!(
                matches!(validate_sheet_name(bad), Err(Error::InvalidSheetName(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_sheet_names() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(Worksheet::new("Entries").unwrap()).unwrap();
        assert!(workbook.add_sheet(Worksheet::new("entries").unwrap()).is_err());
        assert_eq!(workbook.sheets().len(), 1);
    }

    #[test]
    fn test_empty_records() {
        let sheet = Worksheet::from_records("s", Vec::<Vec<(String, String)>>::new()).unwrap();
        assert!(sheet.columns.is_empty());
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_save_to_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("export.xlsx");
        std::fs::create_dir(&target).unwrap();

        let mut workbook = Workbook::new();
        workbook
            .add_sheet(Worksheet::from_records("entries", vec![record(&[("id", "a")])]).unwrap())
            .unwrap();

        let err = workbook.save(&target).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("locked or not writable"), "{}", err);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("export.xlsx");
        std::fs::write(&target, b"old").unwrap();

        let mut workbook = Workbook::new();
        workbook
            .add_sheet(Worksheet::from_records("entries", vec![record(&[("id", "a")])]).unwrap())
            .unwrap();
        workbook.save(&target).unwrap();

        let bytes = std::fs::read(&target).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
