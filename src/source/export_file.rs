//! Offline source backed by a space export file.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::EntrySource;
use crate::error::Result;
use crate::model::{ContentType, Entry};

#[derive(Debug, Deserialize)]
struct LocaleInfo {
    code: String,
    #[serde(default)]
    default: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceExport {
    #[serde(default)]
    content_types: Vec<ContentType>,
    #[serde(default)]
    entries: Vec<Entry>,
    #[serde(default)]
    locales: Vec<LocaleInfo>,
}

/// A space export (`contentTypes`, `entries`, `locales`) held in memory.
#[derive(Debug, Clone, Default)]
pub struct ExportFile {
    content_types: Vec<ContentType>,
    entries: HashMap<String, Entry>,
    locales: Vec<String>,
}

impl ExportFile {
    /// Load an export file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Parse an export from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let export: SpaceExport = serde_json::from_str(json)?;

        let mut locales = export.locales;
        // default locale first
        locales.sort_by_key(|l| !l.default);

        Ok(Self {
            content_types: export.content_types,
            entries: export
                .entries
                .into_iter()
                .map(|e| (e.id().to_string(), e))
                .collect(),
            locales: locales.into_iter().map(|l| l.code).collect(),
        })
    }

    /// Build an export from values already in memory.
    pub fn from_parts(
        content_types: Vec<ContentType>,
        entries: Vec<Entry>,
        locales: Vec<String>,
    ) -> Self {
        Self {
            content_types,
            entries: entries
                .into_iter()
                .map(|e| (e.id().to_string(), e))
                .collect(),
            locales,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntrySource for ExportFile {
    fn entry(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.entries.get(id).cloned())
    }

    fn entries(&self, ids: &[String]) -> Result<Vec<Entry>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect())
    }

    fn content_types(&self) -> Result<Vec<ContentType>> {
        Ok(self.content_types.clone())
    }

    fn locales(&self) -> Result<Vec<String>> {
        Ok(self.locales.clone())
    }
}
