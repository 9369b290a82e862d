//! Local cache of the last fetched task list.
//!
//! Tasks are stored as JSON with the time they were cached and are
//! considered stale after 15 minutes. The cache is cleared on logout.

pub mod manager;

pub use manager::{CachedData, TaskCache};
