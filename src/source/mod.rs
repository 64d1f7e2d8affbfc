//! Where entries and content types come from.
//!
//! [`EntrySource`] is the seam between the exporter and the CMS. The live
//! implementation is [`ContentfulClient`] (feature `client`); [`ExportFile`]
//! reads a space export from disk. [`CachedSource`] memoises single-entry
//! lookups for reference traversal.

#[cfg(feature = "client")]
mod client;
mod export_file;

#[cfg(feature = "client")]
pub use client::{ContentfulClient, DEFAULT_BASE_URL, ENTRY_CHUNK_SIZE};
pub use export_file::ExportFile;

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::model::{ContentType, Entry};

/// A paginated collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub limit: usize,
}

/// Read access to a CMS environment.
pub trait EntrySource {
    /// Fetch one entry. A missing entry is `Ok(None)`, not an error.
    fn entry(&self, id: &str) -> Result<Option<Entry>>;

    /// Fetch several entries. Missing ids are left out; order is unspecified.
    fn entries(&self, ids: &[String]) -> Result<Vec<Entry>>;

    /// All content types of the environment.
    fn content_types(&self) -> Result<Vec<ContentType>>;

    /// Locale codes of the environment, default locale first.
    fn locales(&self) -> Result<Vec<String>>;
}

impl<S: EntrySource + ?Sized> EntrySource for &S {
    fn entry(&self, id: &str) -> Result<Option<Entry>> {
        (**self).entry(id)
    }

    fn entries(&self, ids: &[String]) -> Result<Vec<Entry>> {
        (**self).entries(ids)
    }

    fn content_types(&self) -> Result<Vec<ContentType>> {
        (**self).content_types()
    }

    fn locales(&self) -> Result<Vec<String>> {
        (**self).locales()
    }
}

/// Flat memo cache over [`EntrySource::entry`].
///
/// Only hits are cached, so a missing entry is asked for again. There is no
/// eviction; the cache lives as long as one export.
pub struct CachedSource<S> {
    inner: S,
    cache: RefCell<HashMap<String, Entry>>,
}

impl<S: EntrySource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of cached entries.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EntrySource> EntrySource for CachedSource<S> {
    fn entry(&self, id: &str) -> Result<Option<Entry>> {
        if let Some(entry) = self.cache.borrow().get(id) {
            return Ok(Some(entry.clone()));
        }

        let entry = self.inner.entry(id)?;
        if let Some(ref found) = entry {
            self.cache
                .borrow_mut()
                .insert(id.to_string(), found.clone());
        }
        Ok(entry)
    }

    /// Only ids not already cached reach the inner source.
    fn entries(&self, ids: &[String]) -> Result<Vec<Entry>> {
        let (mut entries, uncached): (Vec<Entry>, Vec<String>) = {
            let cache = self.cache.borrow();
            let hits = ids.iter().filter_map(|id| cache.get(id).cloned()).collect();
            let misses = ids.iter().filter(|id| !cache.contains_key(*id)).cloned().collect();
            (hits, misses)
        };
        if uncached.is_empty() {
            return Ok(entries);
        }

        let fetched = self.inner.entries(&uncached)?;
        let mut cache = self.cache.borrow_mut();
        for entry in &fetched {
            cache.insert(entry.id().to_string(), entry.clone());
        }
        entries.extend(fetched);
        Ok(entries)
    }

    fn content_types(&self) -> Result<Vec<ContentType>> {
        self.inner.content_types()
    }

    fn locales(&self) -> Result<Vec<String>> {
        self.inner.locales()
    }
}
