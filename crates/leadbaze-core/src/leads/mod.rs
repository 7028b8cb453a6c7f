//! Filter, sort, paginate and dedupe over in-memory lead collections.
//!
//! Every function here is pure and synchronous. [`LeadTable`] bundles them
//! into the selector state an interactive screen keeps: it owns the leads and
//! the active criteria and derives the visible page on demand.

mod dedup;
mod filter;
mod page;
mod sort;
mod table;

pub use dedup::{dedupe_against, partition_by_phone, DedupOutcome};
pub use filter::{filter_leads, parse_threshold, LeadCriteria, PhoneFilter, WebsiteFilter};
pub use page::{page_count, paginate, LeadPage};
pub use sort::{compare_leads, sort_leads, LeadSort, SortBy, SortOrder};
pub use table::LeadTable;

#[cfg(test)]
mod pipeline_test;
