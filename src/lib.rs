//! The library code for the `trajectory` catalog index builder. A build can
//! be generally broken down into two distinct steps:
//!
//! 1. Building the catalogs ([`crate::build::build_index`])
//! 2. Rendering category landing pages ([`crate::build::build_pages`])
//!
//! Of the two, the first is the more involved. It is itself composed of
//! several sub-steps:
//!
//! 1. Loading the persisted global catalog, treating a missing or corrupt
//!    file as an empty catalog ([`crate::store`])
//! 2. Normalizing each new-item file into a [`record::CatalogRecord`],
//!    skipping the ones that don't normalize ([`crate::record`])
//! 3. Upserting the new records by `id` and sorting the result by timestamp,
//!    most recent first ([`crate::catalog`])
//! 4. Writing the global catalog, one catalog per category, and the category
//!    tree ([`crate::tree`])
//!
//! The merge and partition steps are pure functions over records, so they
//! can be exercised without touching the file system.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod catalog;
pub mod config;
pub mod pages;
pub mod record;
pub mod store;
pub mod taxonomy;
pub mod timestamp;
pub mod tree;
pub mod util;
