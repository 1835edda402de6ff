//! Exports the [`build_index`] and [`build_pages`] functions which stitch
//! together the high-level steps of a build: loading the global catalog and
//! the new items ([`crate::store`]), merging and partitioning them
//! ([`crate::catalog`]), deriving the category tree ([`crate::tree`]), and
//! rendering category landing pages ([`crate::pages`]).

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::config::Config;
use crate::pages::{Error as PagesError, PageWriter};
use crate::record::{is_valid_category, CatalogRecord};
use crate::store::{self, Error as StoreError};
use crate::tree::build_tree;

/// Counts reported at the end of an index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// New items merged into the catalog.
    pub imported: usize,

    /// New-item files that couldn't be read, parsed, or normalized.
    pub skipped: usize,

    /// Records in the global catalog after the merge.
    pub total: usize,

    /// Per-category catalogs written with at least one record.
    pub categories: usize,
}

/// Folds every new item into the global catalog and rewrites the global
/// catalog, every per-category catalog, and the category tree.
///
/// A new item that can't be read or doesn't normalize into a
/// [`CatalogRecord`] is logged and skipped; only failures to write output
/// are returned as errors. Outputs are written one at a time, so a failure
/// partway through can leave the global catalog updated and some category
/// catalogs stale; re-running the build repairs them.
pub fn build_index(config: &Config) -> Result<Summary> {
    let existing = store::load_catalog(&config.global_index_path);
    let files = store::list_json_files(&config.new_items_directory);
    if files.is_empty() {
        info!(
            dir = %config.new_items_directory.display(),
            "no new items found"
        );
    }

    let (incoming, skipped) = ingest(&files);
    let imported = incoming.len();
    let previous_categories: BTreeSet<String> =
        existing.iter().map(|r| r.category.clone()).collect();
    let merged = catalog::merge(existing, incoming);

    store::write_json(&config.global_index_path, &merged)?;
    info!(path = %config.global_index_path.display(), "updated global index");

    // A category that fails validation would resolve to a path outside its
    // own directory (possibly the global catalog itself), so it's never
    // written. Its records stay in the global catalog.
    let partitions: Vec<_> = catalog::partition(&merged)
        .into_iter()
        .filter(|partition| {
            let valid = is_valid_category(partition.category);
            if !valid {
                warn!(
                    category = %partition.category,
                    records = partition.records.len(),
                    "not writing category index for invalid category"
                );
            }
            valid
        })
        .collect();
    for partition in &partitions {
        let path = config.category_index_path(partition.category);
        store::write_json(&path, &partition.records)?;
        info!(
            path = %path.display(),
            records = partition.records.len(),
            "updated category index"
        );
    }

    // Categories whose last record moved elsewhere get an empty catalog so
    // they stop listing it.
    let emptied = previous_categories
        .iter()
        .filter(|category| is_valid_category(category))
        .filter(|category| !partitions.iter().any(|p| p.category == category.as_str()));
    for category in emptied {
        let path = config.category_index_path(category);
        store::write_json(&path, &[] as &[CatalogRecord])?;
        info!(path = %path.display(), "emptied category index");
    }

    store::write_json(&config.tree_path, &build_tree(&merged, &config.taxonomy))?;
    debug!(path = %config.tree_path.display(), "updated category tree");

    let summary = Summary {
        imported,
        skipped,
        total: merged.len(),
        categories: partitions.len(),
    };
    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        total = summary.total,
        "index build complete"
    );
    Ok(summary)
}

// Reads and normalizes each new-item file, returning the records in file
// order along with the number of files skipped.
fn ingest(files: &[PathBuf]) -> (Vec<CatalogRecord>, usize) {
    let mut records = Vec::with_capacity(files.len());
    let mut skipped = 0;

    for path in files {
        let item = match store::read_json(path) {
            Ok(Some(item)) => item,
            Ok(None) => {
                warn!(path = %path.display(), "skipping empty new item");
                skipped += 1;
                continue;
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable new item");
                skipped += 1;
                continue;
            }
        };
        match CatalogRecord::from_new_item(&item) {
            Ok(record) => {
                debug!(path = %path.display(), id = %record.id, "read new item");
                records.push(record);
            }
            Err(rejection) => {
                warn!(
                    path = %path.display(),
                    reason = %rejection,
                    "skipping invalid new item"
                );
                skipped += 1;
            }
        }
    }

    (records, skipped)
}

/// Writes a landing page for every category of the persisted global catalog
/// using the gtmpl `template` source. Returns the number of pages written;
/// a missing or empty global catalog writes nothing.
pub fn build_pages(config: &Config, template: &str) -> Result<usize> {
    let records = store::load_catalog(&config.global_index_path);
    if records.is_empty() {
        info!(
            path = %config.global_index_path.display(),
            "global index is empty; skipping category pages"
        );
        return Ok(0);
    }

    let writer = PageWriter {
        template,
        site_title: &config.site_title,
        docs_directory: &config.docs_directory,
    };
    let written = writer.write_category_pages(&records)?;
    for path in &written {
        debug!(path = %path.display(), "wrote category page");
    }
    info!(pages = written.len(), "generated category pages");
    Ok(written.len())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for a build. Errors come from persisting catalogs or from
/// templating and writing pages.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors persisting catalog files.
    Store(StoreError),

    /// Returned for errors rendering or writing category pages.
    Pages(PagesError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Store(err) => err.fmt(f),
            Error::Pages(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Pages(err) => Some(err),
        }
    }
}

impl From<StoreError> for Error {
    /// Converts [`StoreError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: StoreError) -> Error {
        Error::Store(err)
    }
}

impl From<PagesError> for Error {
    /// Converts [`PagesError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PagesError) -> Error {
        Error::Pages(err)
    }
}
