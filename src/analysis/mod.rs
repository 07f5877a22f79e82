//! Analysis modules.
//!
//! Pure computations over records already fetched from the store.

pub mod aggregator;
pub mod helpdesk;
pub mod timeline;

pub use aggregator::compute_analytics;
pub use helpdesk::{IssueStats, RequestStats};
