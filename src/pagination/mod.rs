//! Pagination module
//!
//! Supports: None, Offset, Cursor, Link Header
//!
//! # Overview
//!
//! Every strategy implements [`Paginator`]: it inspects a response and
//! returns either the [`PageToken`] for the next request of the same window
//! or [`NextPage::Done`]. The stream reader applies tokens without knowing
//! which strategy produced them.

mod strategies;
mod types;

pub use strategies::{CursorPaginator, LinkHeaderPaginator, NoPaginator, OffsetPaginator};
pub use types::{NextPage, PageToken, PaginationState, Paginator, StopCondition};

#[cfg(test)]
mod tests;
