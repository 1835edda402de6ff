//! Defines [`CatalogRecord`], the shape of every entry in the global and
//! per-category catalogs, along with the decoding rules that turn loosely
//! typed JSON (new items and previously persisted catalog entries) into
//! records.
//!
//! New items are shaped like this:
//!
//! ```json
//! {
//!   "id": "p1",
//!   "category": "tech",
//!   "timestamp": "2024-05-01",
//!   "post_path": "tech/posts/p1/",
//!   "meta": { "title": "...", "summary": "...", "tags": ["..."],
//!             "taxonomy": ["lv1", "lv2"], "status": "public", "dr": 3 }
//! }
//! ```
//!
//! Decoding is strict about the mandatory fields (`id`, `category`,
//! `timestamp`, `post_path`) and lenient about everything else: scalars are
//! coerced to strings, whitespace is trimmed, and empty array entries are
//! dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::taxonomy::{FALLBACK_LV1, FALLBACK_LV2};

/// The status assigned to records whose source doesn't name one.
pub const DEFAULT_STATUS: &str = "public";

/// One entry in a catalog. Field order here is the field order on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Unique key; the identity used for upserts.
    #[serde(default)]
    pub id: String,

    /// Top-level partition key. Each distinct value gets its own catalog.
    #[serde(default)]
    pub category: String,

    /// Sort key (most recent first). See [`crate::timestamp::parse`] for
    /// the accepted formats.
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Classification path: index 0 is the lv1 name, index 1 the lv2 name.
    #[serde(default)]
    pub taxonomy: Vec<String>,

    /// Opaque authoring reference, carried through untouched.
    #[serde(default)]
    pub dr: Value,

    #[serde(default = "default_status")]
    pub status: String,

    /// Path of the rendered article relative to the docs directory, e.g.
    /// `tech/posts/p1/`.
    #[serde(default)]
    pub post_path: String,

    /// Fields found on persisted records that this builder doesn't know
    /// about. They survive upserts that don't mention them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CatalogRecord {
    fn default() -> Self {
        CatalogRecord {
            id: String::new(),
            category: String::new(),
            timestamp: String::new(),
            title: String::new(),
            summary: String::new(),
            tags: Vec::new(),
            taxonomy: Vec::new(),
            dr: Value::Null,
            status: default_status(),
            post_path: String::new(),
            extra: Map::new(),
        }
    }
}

fn default_status() -> String {
    DEFAULT_STATUS.to_owned()
}

const KNOWN_FIELDS: [&str; 10] = [
    "id",
    "category",
    "timestamp",
    "title",
    "summary",
    "tags",
    "taxonomy",
    "dr",
    "status",
    "post_path",
];

impl CatalogRecord {
    /// Decodes a new item (see the module docs for its shape). Returns a
    /// [`Rejection`] if the value isn't an object, if any mandatory field is
    /// empty after trimming, or if the category can't be used as a directory
    /// name.
    pub fn from_new_item(item: &Value) -> Result<CatalogRecord, Rejection> {
        let obj = item.as_object().ok_or(Rejection::NotAnObject)?;
        let empty = Map::new();
        let meta = obj.get("meta").and_then(Value::as_object).unwrap_or(&empty);

        let record = CatalogRecord {
            id: coerce_string(obj.get("id")),
            category: coerce_string(obj.get("category")),
            timestamp: coerce_string(obj.get("timestamp")),
            title: coerce_string(meta.get("title")),
            summary: coerce_string(meta.get("summary")),
            tags: coerce_strings(meta.get("tags")),
            taxonomy: coerce_strings(meta.get("taxonomy")),
            dr: meta.get("dr").cloned().unwrap_or(Value::Null),
            status: coerce_status(meta.get("status")),
            post_path: coerce_string(obj.get("post_path")),
            extra: Map::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Decodes an entry of a previously persisted catalog. Unlike
    /// [`CatalogRecord::from_new_item`], the known fields live at the top
    /// level and only the `id` is required; unknown fields are kept in
    /// [`CatalogRecord::extra`].
    pub fn from_catalog_entry(entry: Value) -> Option<CatalogRecord> {
        let mut obj = match entry {
            Value::Object(obj) => obj,
            _ => return None,
        };
        let id = coerce_string(obj.get("id"));
        if id.is_empty() {
            return None;
        }

        let record = CatalogRecord {
            id,
            category: coerce_string(obj.get("category")),
            timestamp: coerce_string(obj.get("timestamp")),
            title: coerce_string(obj.get("title")),
            summary: coerce_string(obj.get("summary")),
            tags: coerce_strings(obj.get("tags")),
            taxonomy: coerce_strings(obj.get("taxonomy")),
            dr: obj.get("dr").cloned().unwrap_or(Value::Null),
            status: coerce_status(obj.get("status")),
            post_path: coerce_string(obj.get("post_path")),
            extra: Map::new(),
        };
        for field in KNOWN_FIELDS.iter() {
            obj.remove(*field);
        }
        Some(CatalogRecord { extra: obj, ..record })
    }

    /// Shallow-merges `newer` over `self`: every field `newer` defines wins,
    /// and unknown fields only `self` carries are preserved.
    pub fn upsert(self, newer: CatalogRecord) -> CatalogRecord {
        let mut extra = self.extra;
        extra.extend(newer.extra);
        CatalogRecord { extra, ..newer }
    }

    /// The lv1 taxonomy name, or `uncategorized` if the record has none.
    pub fn lv1(&self) -> &str {
        self.taxonomy
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_LV1)
    }

    /// The lv2 taxonomy name, or `misc` if the record has none.
    pub fn lv2(&self) -> &str {
        self.taxonomy
            .get(1)
            .map(String::as_str)
            .unwrap_or(FALLBACK_LV2)
    }

    fn validate(&self) -> Result<(), Rejection> {
        let mandatory = [
            ("id", &self.id),
            ("category", &self.category),
            ("timestamp", &self.timestamp),
            ("post_path", &self.post_path),
        ];
        for (name, value) in mandatory.iter() {
            if value.is_empty() {
                return Err(Rejection::MissingField(*name));
            }
        }
        if !is_valid_category(&self.category) {
            return Err(Rejection::InvalidCategory(self.category.clone()));
        }
        Ok(())
    }
}

/// Reports whether `category` can name a per-category catalog. Categories
/// become directories under the docs directory, so they must be a single,
/// ordinary, non-empty path component.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category != "."
        && category != ".."
        && !category.contains('/')
        && !category.contains('\\')
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_owned(),
        // Zero and `false` count as blank, as they do for the authoring side.
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_owned(),
        _ => String::new(),
    }
}

fn coerce_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| coerce_string(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn coerce_status(value: Option<&Value>) -> String {
    match coerce_string(value) {
        s if s.is_empty() => default_status(),
        s => s.to_lowercase(),
    }
}

/// The reason a new item was not merged into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The new item's JSON is not an object.
    NotAnObject,

    /// A mandatory field is absent or blank.
    MissingField(&'static str),

    /// The category can't be used as a directory name.
    InvalidCategory(String),
}

impl fmt::Display for Rejection {
    /// Displays a [`Rejection`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::NotAnObject => write!(f, "new item is not a JSON object"),
            Rejection::MissingField(field) => {
                write!(f, "missing mandatory field `{}`", field)
            }
            Rejection::InvalidCategory(category) => {
                write!(f, "category `{}` is not a valid directory name", category)
            }
        }
    }
}

impl std::error::Error for Rejection {}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_new_item_normalizes_fields() -> Result<(), Rejection> {
        let record = CatalogRecord::from_new_item(&json!({
            "id": "  p1 ",
            "category": "tech",
            "timestamp": "2024-05-01",
            "post_path": "tech/posts/p1/",
            "meta": {
                "title": " Hello ",
                "tags": ["rust", "", "  ", 42],
                "taxonomy": ["テクノロジ系", null, "ネットワーク"],
                "status": "Draft",
                "dr": 7
            }
        }))?;

        assert_eq!("p1", record.id);
        assert_eq!("Hello", record.title);
        assert_eq!("", record.summary);
        assert_eq!(vec!["rust", "42"], record.tags);
        assert_eq!(vec!["テクノロジ系", "ネットワーク"], record.taxonomy);
        assert_eq!("draft", record.status);
        assert_eq!(json!(7), record.dr);
        Ok(())
    }

    #[test]
    fn test_from_new_item_defaults() -> Result<(), Rejection> {
        let record = CatalogRecord::from_new_item(&json!({
            "id": 12,
            "category": "life",
            "timestamp": "2024-05-02",
            "post_path": "life/posts/p2/"
        }))?;

        assert_eq!("12", record.id);
        assert_eq!(DEFAULT_STATUS, record.status);
        assert_eq!(Value::Null, record.dr);
        assert!(record.tags.is_empty());
        assert_eq!("uncategorized", record.lv1());
        assert_eq!("misc", record.lv2());
        Ok(())
    }

    #[test]
    fn test_from_new_item_treats_zero_and_false_as_blank() {
        let rejection = CatalogRecord::from_new_item(&json!({
            "id": 0,
            "category": "life",
            "timestamp": "2024-05-02",
            "post_path": "life/posts/p2/"
        }));
        assert_eq!(Err(Rejection::MissingField("id")), rejection);

        let record = CatalogRecord::from_new_item(&json!({
            "id": "p2",
            "category": "life",
            "timestamp": "2024-05-02",
            "post_path": "life/posts/p2/",
            "meta": { "tags": [false, true, 0, 1.5], "status": false }
        }))
        .unwrap();
        assert_eq!(vec!["true", "1.5"], record.tags);
        assert_eq!(DEFAULT_STATUS, record.status);
    }

    #[test]
    fn test_is_valid_category() {
        assert!(is_valid_category("tech"));
        assert!(is_valid_category("日記"));
        assert!(!is_valid_category(""));
        assert!(!is_valid_category("."));
        assert!(!is_valid_category(".."));
        assert!(!is_valid_category("a/b"));
        assert!(!is_valid_category("a\\b"));
    }

    #[test]
    fn test_from_catalog_entry_trims_category() {
        let record = CatalogRecord::from_catalog_entry(json!({
            "id": "a",
            "category": " tech ",
        }))
        .unwrap();
        assert_eq!("tech", record.category);
    }

    #[test]
    fn test_from_new_item_rejects_missing_post_path() {
        let rejection = CatalogRecord::from_new_item(&json!({
            "id": "p1",
            "category": "tech",
            "timestamp": "2024-05-01",
            "post_path": "   "
        }));
        assert_eq!(Err(Rejection::MissingField("post_path")), rejection);
    }

    #[test]
    fn test_from_new_item_rejects_non_object() {
        assert_eq!(
            Err(Rejection::NotAnObject),
            CatalogRecord::from_new_item(&json!(["p1"]))
        );
    }

    #[test]
    fn test_from_new_item_rejects_path_like_category() {
        let rejection = CatalogRecord::from_new_item(&json!({
            "id": "p1",
            "category": "../etc",
            "timestamp": "2024-05-01",
            "post_path": "x/"
        }));
        assert_eq!(
            Err(Rejection::InvalidCategory("../etc".to_owned())),
            rejection
        );
    }

    #[test]
    fn test_from_catalog_entry_keeps_unknown_fields() {
        let record = CatalogRecord::from_catalog_entry(json!({
            "id": "a",
            "category": "x",
            "timestamp": "2024-01-01",
            "post_path": "x/posts/a/",
            "pinned": true
        }))
        .unwrap();
        assert_eq!(Some(&json!(true)), record.extra.get("pinned"));
        assert_eq!(DEFAULT_STATUS, record.status);
        assert!(!record.extra.contains_key("id"));
    }

    #[test]
    fn test_from_catalog_entry_requires_id() {
        assert_eq!(None, CatalogRecord::from_catalog_entry(json!({"id": ""})));
        assert_eq!(None, CatalogRecord::from_catalog_entry(json!("a")));
    }

    #[test]
    fn test_upsert_overwrites_and_preserves() {
        let old = CatalogRecord::from_catalog_entry(json!({
            "id": "a",
            "category": "x",
            "timestamp": "2024-01-01",
            "title": "Old",
            "post_path": "x/posts/a/",
            "pinned": true
        }))
        .unwrap();
        let new = CatalogRecord::from_new_item(&json!({
            "id": "a",
            "category": "x",
            "timestamp": "2024-01-01",
            "post_path": "x/posts/a/",
            "meta": { "title": "New" }
        }))
        .unwrap();

        let merged = old.upsert(new);
        assert_eq!("New", merged.title);
        assert_eq!("x", merged.category);
        assert_eq!(Some(&json!(true)), merged.extra.get("pinned"));
    }

    #[test]
    fn test_serialized_field_order() -> serde_json::Result<()> {
        let record = CatalogRecord::from_catalog_entry(json!({
            "post_path": "x/posts/a/",
            "zz": 1,
            "id": "a"
        }))
        .unwrap();
        let text = serde_json::to_string(&record)?;
        assert!(text.starts_with("{\"id\":\"a\",\"category\":\"\""));
        assert!(text.ends_with("\"post_path\":\"x/posts/a/\",\"zz\":1}"));
        Ok(())
    }
}
