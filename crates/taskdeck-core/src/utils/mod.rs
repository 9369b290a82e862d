//! Formatting helpers for displaying tasks and sessions.

pub mod format;

pub use format::{mask_token, task_line, truncate};
