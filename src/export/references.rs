//! Reference-graph traversal.
//!
//! Entries link to other entries and assets through link fields. A recursive
//! export walks those links depth-first so that everything an entry pulls in
//! ends up in the same workbook.

use std::collections::HashSet;

use super::DEFAULT_LOCALE;
use crate::model::{as_link, Entry};
use crate::source::EntrySource;

/// Entry and asset ids linked from one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub entries: Vec<String>,
    pub assets: Vec<String>,
}

impl References {
    fn push(&mut self, id: &str, link_type: Option<&str>) {
        match link_type {
            Some("Entry") => self.entries.push(id.to_string()),
            Some("Asset") => self.assets.push(id.to_string()),
            _ => {}
        }
    }
}

/// Collect the links of an entry in one locale.
///
/// Only single link values and arrays of links count; links nested deeper
/// (inside objects or rich text) are not followed.
pub fn find_references_in_entry(entry: &Entry, locale: &str) -> References {
    let mut refs = References::default();

    for value in entry.fields.values().filter_map(|f| f.get(locale)) {
        if let Some((id, link_type)) = as_link(value) {
            refs.push(id, link_type);
        } else if let Some(items) = value.as_array() {
            for (id, link_type) in items.iter().filter_map(as_link) {
                refs.push(id, link_type);
            }
        }
    }

    refs
}

/// What happened when the walk reached an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Entry found and expanded.
    Found { content_type: String, name: String },
    /// Entry found but its content type is excluded.
    Skipped { content_type: String, name: String },
    /// Entry could not be fetched; `reason` is set when the lookup failed
    /// rather than coming back empty.
    Missing { reason: Option<String> },
}

/// One step of the walk, in visit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub id: String,
    pub depth: usize,
    pub outcome: VisitOutcome,
}

/// Result of a recursive reference walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedReferences {
    /// Entry ids in visit order, root first
    pub entries: Vec<String>,
    /// Asset ids in discovery order, without duplicates
    pub assets: Vec<String>,
    /// Visit log for display
    pub visits: Vec<Visit>,
}

/// Walk all entries reachable from `entry_id`, reading links in the default
/// locale.
pub fn find_all_linked_references<S: EntrySource>(
    source: &S,
    entry_id: &str,
    exclude_content_types: &[String],
) -> LinkedReferences {
    find_all_linked_references_in(source, entry_id, exclude_content_types, DEFAULT_LOCALE)
}

/// Like [`find_all_linked_references`], reading links in `locale`.
///
/// Lookups that fail are logged as [`VisitOutcome::Missing`] and the walk
/// goes on; one bad reference never aborts the traversal.
pub fn find_all_linked_references_in<S: EntrySource>(
    source: &S,
    entry_id: &str,
    exclude_content_types: &[String],
    locale: &str,
) -> LinkedReferences {
    let mut walk = Walk {
        source,
        exclude: exclude_content_types,
        locale,
        visited: HashSet::new(),
        visits: Vec::new(),
    };
    let found = walk.visit(entry_id, 0);

    let mut seen = HashSet::new();
    let assets = found
        .assets
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    LinkedReferences {
        entries: found.entries,
        assets,
        visits: walk.visits,
    }
}

struct Walk<'a, S> {
    source: &'a S,
    exclude: &'a [String],
    locale: &'a str,
    visited: HashSet<String>,
    visits: Vec<Visit>,
}

impl<S: EntrySource> Walk<'_, S> {
    fn log(&mut self, id: &str, depth: usize, outcome: VisitOutcome) {
        self.visits.push(Visit {
            id: id.to_string(),
            depth,
            outcome,
        });
    }

    fn visit(&mut self, id: &str, depth: usize) -> References {
        let entry = match self.source.entry(id) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.log(id, depth, VisitOutcome::Missing { reason: None });
                return References::default();
            }
            Err(err) => {
                let reason = Some(err.to_string());
                self.log(id, depth, VisitOutcome::Missing { reason });
                return References::default();
            }
        };

        let content_type = entry.content_type_id().to_string();
        let name = entry.name(self.locale);

        // excluded entries stay unmarked so another path may still reach them
        if self.exclude.contains(&content_type) {
            self.log(id, depth, VisitOutcome::Skipped { content_type, name });
            return References::default();
        }

        self.log(id, depth, VisitOutcome::Found { content_type, name });
        self.visited.insert(id.to_string());

        let links = find_references_in_entry(&entry, self.locale);
        let mut result = References {
            entries: vec![id.to_string()],
            assets: links.assets,
        };

        for child in &links.entries {
            if self.visited.contains(child) {
                continue;
            }
            let found = self.visit(child, depth + 1);
            result.entries.extend(found.entries);
            result.assets.extend(found.assets);
        }

        result
    }
}
