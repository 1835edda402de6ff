//! The pure half of the index pipeline: merging new records into an existing
//! catalog and partitioning the result by category. Nothing here touches the
//! file system; see [`crate::store`] for loading and persisting catalogs.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::record::CatalogRecord;
use crate::timestamp;

/// Upserts `incoming` into `existing` by `id` and returns the merged catalog
/// sorted by timestamp, most recent first.
///
/// Records keep the position their `id` was first seen at until the sort,
/// and the sort is stable, so records with equal timestamps keep that
/// order. Records with unparsable timestamps sort last. If `existing`
/// contains the same `id` twice, the later entry replaces the earlier one.
pub fn merge<I>(existing: Vec<CatalogRecord>, incoming: I) -> Vec<CatalogRecord>
where
    I: IntoIterator<Item = CatalogRecord>,
{
    let mut records: Vec<CatalogRecord> = Vec::with_capacity(existing.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in existing {
        match positions.get(&record.id) {
            Some(&i) => records[i] = record,
            None => {
                positions.insert(record.id.clone(), records.len());
                records.push(record);
            }
        }
    }

    for record in incoming {
        match positions.get(&record.id) {
            Some(&i) => {
                let previous = std::mem::take(&mut records[i]);
                records[i] = previous.upsert(record);
            }
            None => {
                positions.insert(record.id.clone(), records.len());
                records.push(record);
            }
        }
    }

    sort(&mut records);
    records
}

/// Sorts records by timestamp, most recent first. Stable; unparsable
/// timestamps sort after every parsable one.
pub fn sort(records: &mut [CatalogRecord]) {
    records.sort_by_cached_key(|r| Reverse(timestamp::parse(&r.timestamp)));
}

/// The records of a single category, in global catalog order.
#[derive(Debug, PartialEq)]
pub struct CategoryCatalog<'a> {
    pub category: &'a str,
    pub records: Vec<&'a CatalogRecord>,
}

/// Splits a catalog into one [`CategoryCatalog`] per distinct category, in
/// the order each category first appears. Each record lands in exactly one
/// partition and the relative order of records is preserved.
pub fn partition(records: &[CatalogRecord]) -> Vec<CategoryCatalog> {
    let mut partitions: Vec<CategoryCatalog> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let category = record.category.as_str();
        match positions.get(category) {
            Some(&i) => partitions[i].records.push(record),
            None => {
                positions.insert(category, partitions.len());
                partitions.push(CategoryCatalog {
                    category,
                    records: vec![record],
                });
            }
        }
    }

    partitions
}
