//! Renders one landing page per category (`{docs}/{category}/index.html`).
//! The page is a shell: it names the category and points the client-side
//! renderer at the category's catalog, which the renderer fetches itself.

use gtmpl::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::record::{is_valid_category, CatalogRecord};
use crate::store::{self, write_file};

/// The template used when the configuration doesn't name one. Values are
/// HTML-escaped before templating.
pub const DEFAULT_CATEGORY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{ .site_title }} - {{ .category }}</title>
  <meta name="description" content="Category: {{ .category }}">
  <link rel="stylesheet" href="{{ .root_prefix }}assets/styles.css">
</head>
<body data-category="{{ .category }}" data-root-prefix="{{ .root_prefix }}">
  <div class="container">
    <header class="site-header">
      <a href="{{ .root_prefix }}index.html" class="site-title">{{ .site_title }}</a>
    </header>
    <main>
      <h1 class="category-title">{{ .category }} <span class="category-count">{{ .count }}</span></h1>
      <div id="categoryTree"></div>
      <ul class="post-list" id="postList"></ul>
    </main>
  </div>
  <script src="{{ .root_prefix }}assets/app.js"></script>
</body>
</html>
"#;

/// Category pages live one directory below the docs root.
const ROOT_PREFIX: &str = "../";

const PAGE_FILE_NAME: &str = "index.html";

/// Templates and writes category landing pages.
pub struct PageWriter<'a> {
    /// The gtmpl template source for a category page.
    pub template: &'a str,

    /// The site title, made available to the template as `site_title`.
    pub site_title: &'a str,

    /// The docs directory. Pages are written to
    /// `{docs_directory}/{category}/index.html`.
    pub docs_directory: &'a Path,
}

impl PageWriter<'_> {
    /// Writes a landing page for every distinct non-empty category in
    /// `records`, in category-name order, and returns the paths written.
    pub fn write_category_pages(&self, records: &[CatalogRecord]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (category, count) in count_categories(records) {
            let path = self.docs_directory.join(category).join(PAGE_FILE_NAME);
            let html = self.render(category, count)?;
            write_file(&path, html.as_bytes())?;
            written.push(path);
        }
        Ok(written)
    }

    /// Renders the page for a single category.
    pub fn render(&self, category: &str, count: usize) -> Result<String> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("category".to_owned(), Value::String(escape(category)?));
        m.insert("site_title".to_owned(), Value::String(escape(self.site_title)?));
        m.insert("root_prefix".to_owned(), Value::String(ROOT_PREFIX.to_owned()));
        m.insert("count".to_owned(), Value::String(count.to_string()));
        gtmpl::template(self.template, Value::Object(m)).map_err(|err| Error::Template {
            category: category.to_owned(),
            message: err.to_string(),
        })
    }
}

fn count_categories(records: &[CatalogRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let category = record.category.trim();
        if is_valid_category(category) {
            *counts.entry(category).or_insert(0) += 1;
        } else {
            warn!(id = %record.id, category, "not writing page for invalid category");
        }
    }
    counts
}

fn escape(s: &str) -> io::Result<String> {
    let mut out = String::with_capacity(s.len());
    escape_html(&mut out, s)?;
    Ok(out)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template { category: String, message: String },

    /// An error escaping template values.
    Escape(io::Error),

    /// An error writing the output files.
    Store(store::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator when escaping values.
    fn from(err: io::Error) -> Error {
        Error::Escape(err)
    }
}

impl From<store::Error> for Error {
    /// Converts a [`store::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible writes.
    fn from(err: store::Error) -> Error {
        Error::Store(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template { category, message } => {
                write!(f, "Templating page for category '{}': {}", category, message)
            }
            Error::Escape(err) => err.fmt(f),
            Error::Store(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template { .. } => None,
            Error::Escape(err) => Some(err),
            Error::Store(err) => Some(err),
        }
    }
}
