//! Record extraction module
//!
//! Turns a decoded response payload into records. The record collection is
//! located by a path:
//!
//! - empty path: the whole body is the collection
//! - dot path with optional indexing: `data.items`, `pages[0].rows`
//! - JSONPath with wildcards or filters: `$.data[*].items[*]`
//!
//! Each record additionally carries its primary key and cursor value,
//! read out of the item by field path.

mod extractor;
mod path;

pub use extractor::{Record, RecordExtractor};
pub use path::{lookup, lookup_scalar};

#[cfg(test)]
mod tests;
